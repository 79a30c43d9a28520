pub mod cli;
pub mod features;
pub mod shared;

use clap::Parser;
use cli::Cli;
use features::auth::{AuthService, SecureStorage, SessionContext};
use features::session_gate::SessionGate;
use features::store::ClientStore;
use log::info;
use shared::api_client::ApiClient;
use shared::config::environment::{
    initialize_logging_system, load_environment_variables, ApiConfig, DisplayConfig,
    StorageConfig,
};
use shared::errors::AppResult;
use std::process::ExitCode;

/// アプリケーション状態
///
/// セッション・APIクライアント・ストアは同じSessionContextを共有する
pub struct AppState {
    pub auth_service: AuthService,
    pub gate: SessionGate<ApiClient>,
    pub display: DisplayConfig,
}

impl AppState {
    /// 環境変数から設定を読み込んで初期化する
    pub fn initialize() -> AppResult<Self> {
        let api_config = ApiConfig::from_env()?;
        let storage_config = StorageConfig::from_env()?;
        info!(
            "認証情報の保存先: {}",
            storage_config.session_store_path.display()
        );

        let session = SessionContext::new(SecureStorage::new(storage_config.session_store_path));
        let api_client = ApiClient::new(api_config, session.clone())?;
        let store = ClientStore::new(api_client.clone(), session);

        Ok(Self {
            auth_service: AuthService::new(api_client),
            gate: SessionGate::new(store),
            display: DisplayConfig::from_env(),
        })
    }
}

pub fn run() -> ExitCode {
    // 環境に応じた.envファイルを読み込み（ログシステム初期化前に実行）
    load_environment_variables();
    initialize_logging_system();

    let cli = Cli::parse();

    let mut state = match AppState::initialize() {
        Ok(state) => state,
        Err(e) => {
            log::error!("アプリケーション初期化失敗: {}", e.details());
            eprintln!("エラー: {}", e.details());
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("非同期ランタイムの初期化に失敗しました: {e}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(cli::commands::execute(
        cli.command,
        &mut state.gate,
        &state.auth_service,
        &state.display,
    ))
}
