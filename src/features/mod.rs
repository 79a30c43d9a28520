/// 機能別モジュール
///
/// 各機能モジュールは、その機能に関連するモデル・API呼び出し・ロジックを含む。
pub mod auth;
pub mod categories;
pub mod reports;
pub mod session_gate;
pub mod store;
pub mod subscriptions;
