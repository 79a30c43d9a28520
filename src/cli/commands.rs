/// CLIコマンドの実行
use crate::cli::render::{render_categories, render_detail, render_list, render_summary};
use crate::cli::{AddArgs, Commands};
use crate::features::auth::AuthService;
use crate::features::categories::{suggested_category_names, CategoryResolution};
use crate::features::session_gate::{Screen, SessionGate};
use crate::features::store::RemoteStore;
use crate::shared::config::DisplayConfig;
use crate::shared::errors::{AppError, AppResult};
use log::log;
use std::process::ExitCode;

/// コマンドが失敗した場合の終了コード
pub const EXIT_FAILURE: u8 = 1;
/// ログインが必要な場合の終了コード
pub const EXIT_LOGIN_REQUIRED: u8 = 2;

/// コマンドを実行し、結果を表示して終了コードを返す
pub async fn execute<R: RemoteStore>(
    command: Commands,
    gate: &mut SessionGate<R>,
    auth_service: &AuthService,
    display: &DisplayConfig,
) -> ExitCode {
    let is_login = matches!(command, Commands::Login { .. });

    let result = match command {
        Commands::Login { user_id } => login(gate, auth_service, &user_id, display).await,
        other => run_session_command(other, gate, display).await,
    };

    match result {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => ExitCode::from(report_failure(&e, gate, is_login)),
    }
}

/// エラーを表示して終了コードを決める
fn report_failure<R: RemoteStore>(
    error: &AppError,
    gate: &mut SessionGate<R>,
    is_login: bool,
) -> u8 {
    log!(
        error.severity().log_level(),
        "コマンド実行エラー: {}",
        error.details()
    );
    eprintln!("エラー: {}", error.user_message());

    let login_required = error.is_auth_fault() || (!is_login && !gate.screen().is_authenticated());
    if !login_required {
        return EXIT_FAILURE;
    }

    if let Screen::Unauthenticated {
        notice: Some(notice),
    } = gate.screen()
    {
        eprintln!("{notice}");
    }
    eprintln!("`subscription-memo login <USER_ID>` でログインしてください");
    EXIT_LOGIN_REQUIRED
}

async fn login<R: RemoteStore>(
    gate: &mut SessionGate<R>,
    auth_service: &AuthService,
    user_id: &str,
    display: &DisplayConfig,
) -> AppResult<String> {
    // ログイン済みの場合は新しいトークンが保存されるまで現在のセッションを残す
    let response = if gate.screen().is_authenticated() {
        gate.switch_account(auth_service.dev_login(user_id)).await?
    } else {
        gate.sign_in(auth_service.dev_login(user_id)).await?
    };

    let store = gate.store();
    Ok(format!(
        "ログインしました: user_id={}\n\n{}",
        response.user_id,
        render_list(&store.resolved_rows(), &store.monthly_overview(), display)
    ))
}

/// セッションが必要なコマンドを実行する
pub async fn run_session_command<R: RemoteStore>(
    command: Commands,
    gate: &mut SessionGate<R>,
    display: &DisplayConfig,
) -> AppResult<String> {
    if let Commands::Logout = command {
        if !gate.screen().is_authenticated() {
            return Ok("ログインしていません\n".to_string());
        }
        gate.logout()?;
        return Ok("ログアウトしました\n".to_string());
    }

    open_list(gate).await?;

    match command {
        Commands::List => {
            let store = gate.store();
            Ok(render_list(
                &store.resolved_rows(),
                &store.monthly_overview(),
                display,
            ))
        }
        Commands::Show { id } => {
            gate.open_detail(id)?;
            match gate.screen() {
                Screen::Detail(snapshot) => Ok(render_detail(snapshot, display)),
                other => Err(AppError::invalid_transition(format!(
                    "詳細画面を開けませんでした: {}",
                    other.name()
                ))),
            }
        }
        Commands::Add(args) => add(gate, &args).await,
        Commands::Delete { id } => {
            gate.open_detail(id)?;
            gate.delete_current().await?;
            Ok(format!("削除しました: #{id}\n"))
        }
        Commands::Categories => {
            let categories = gate.store().categories();
            let suggestions = suggested_category_names(&categories);
            Ok(render_categories(&categories, &suggestions))
        }
        Commands::Summary => {
            let store = gate.store();
            Ok(render_summary(
                &store.portfolio_stats(),
                store.summary().as_ref(),
                display,
            ))
        }
        Commands::Login { .. } | Commands::Logout => Err(AppError::invalid_transition(
            "このコマンドはセッション操作として実行できません",
        )),
    }
}

async fn open_list<R: RemoteStore>(gate: &mut SessionGate<R>) -> AppResult<()> {
    if !gate.screen().is_authenticated() {
        return Err(AppError::Unauthorized);
    }
    gate.start().await?;
    Ok(())
}

async fn add<R: RemoteStore>(gate: &mut SessionGate<R>, args: &AddArgs) -> AppResult<String> {
    gate.open_add()?;
    let outcome = gate.submit_add(&args.to_draft()).await?;

    let mut output = String::new();
    if let Some(CategoryResolution::Created(category)) = &outcome.category {
        output.push_str(&format!("カテゴリー「{}」を作成しました\n", category.name));
    }
    output.push_str(&format!(
        "追加しました: #{} {}\n",
        outcome.subscription.id, outcome.subscription.name
    ));
    Ok(output)
}
