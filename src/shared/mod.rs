/// 共有モジュール
///
/// 複数の機能モジュールから使用される設定・エラー・APIクライアント・ユーティリティ
pub mod api_client;
pub mod config;
pub mod errors;
pub mod utils;
