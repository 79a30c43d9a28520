/// セッションゲート
///
/// 認証状態から表示可能な画面を決め、画面遷移を検証する。
/// 401や再読み込み失敗によるログアウトは認証イベントとして受け取り、
/// どの画面からでもログイン画面へ戻す。
use crate::features::auth::models::{AuthEvent, LoginResponse, LogoutReason};
use crate::features::session_gate::screen::Screen;
use crate::features::store::{ClientStore, CreateOutcome, ReloadOutcome, RemoteStore};
use crate::features::subscriptions::SubscriptionDraft;
use crate::shared::errors::{AppError, AppResult};
use log::{debug, info, warn};
use std::future::Future;
use tokio::sync::broadcast::{self, error::TryRecvError};

pub struct SessionGate<R> {
    store: ClientStore<R>,
    events: broadcast::Receiver<AuthEvent>,
    screen: Screen,
}

impl<R: RemoteStore> SessionGate<R> {
    /// 保存済みのセッションがあれば一覧画面、なければログイン画面から始める
    pub fn new(store: ClientStore<R>) -> Self {
        let events = store.session().subscribe();
        let screen = if store.session().has_session() {
            Screen::List
        } else {
            Screen::Unauthenticated { notice: None }
        };
        Self {
            store,
            events,
            screen,
        }
    }

    pub fn store(&self) -> &ClientStore<R> {
        &self.store
    }

    /// 受信済みの認証イベントを反映してから現在の画面を返す
    pub fn screen(&mut self) -> &Screen {
        self.process_auth_events();
        &self.screen
    }

    /// 受信済みの認証イベントを反映する
    pub fn process_auth_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(AuthEvent::LoggedOut { reason }) => self.enter_unauthenticated(reason),
                Ok(AuthEvent::LoggedIn { user_id }) => {
                    debug!("ログインイベントを受信しました: user_id={user_id}");
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("認証イベントを取りこぼしました: skipped={skipped}");
                    if !self.store.session().has_session() {
                        self.enter_unauthenticated(LogoutReason::Unauthorized);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    fn enter_unauthenticated(&mut self, reason: LogoutReason) {
        if self.screen.is_authenticated() {
            info!("ログイン画面に戻ります: reason={reason:?}");
        }
        self.screen = Screen::Unauthenticated {
            notice: reason.notice().map(str::to_string),
        };
    }

    fn require(&mut self, allowed: fn(&Screen) -> bool, action: &str) -> AppResult<()> {
        self.process_auth_events();
        if allowed(&self.screen) {
            Ok(())
        } else {
            Err(AppError::invalid_transition(format!(
                "{}画面では「{action}」を実行できません",
                self.screen.name()
            )))
        }
    }

    /// 一覧画面の初回読み込み
    pub async fn start(&mut self) -> AppResult<ReloadOutcome> {
        self.require(|screen| matches!(screen, Screen::List), "読み込み")?;
        let outcome = self.store.reload().await;
        self.process_auth_events();
        outcome
    }

    /// ログインして一覧画面へ遷移する
    ///
    /// `login` はトークンを永続化してから完了する必要がある
    pub async fn sign_in<F>(&mut self, login: F) -> AppResult<LoginResponse>
    where
        F: Future<Output = AppResult<LoginResponse>>,
    {
        self.require(
            |screen| matches!(screen, Screen::Unauthenticated { .. }),
            "ログイン",
        )?;
        self.complete_sign_in(login).await
    }

    /// ログイン中に別のユーザーIDでログインし直す
    ///
    /// 新しいトークンが保存されるまで現在のセッションは維持され、
    /// 失敗した場合は画面も変わらない
    pub async fn switch_account<F>(&mut self, login: F) -> AppResult<LoginResponse>
    where
        F: Future<Output = AppResult<LoginResponse>>,
    {
        self.require(Screen::is_authenticated, "再ログイン")?;
        self.complete_sign_in(login).await
    }

    async fn complete_sign_in<F>(&mut self, login: F) -> AppResult<LoginResponse>
    where
        F: Future<Output = AppResult<LoginResponse>>,
    {
        let response = login.await?;
        if !self.store.session().has_session() {
            return Err(AppError::storage("ログイン後にセッションが保存されていません"));
        }

        // ログイン前に配信されたイベントは破棄する
        self.events = self.events.resubscribe();
        self.screen = Screen::List;
        self.store.reload().await?;
        self.process_auth_events();
        Ok(response)
    }

    /// 明示的にログアウトする
    pub fn logout(&mut self) -> AppResult<()> {
        self.require(Screen::is_authenticated, "ログアウト")?;
        self.store.session().invalidate(LogoutReason::UserRequested);
        self.process_auth_events();
        Ok(())
    }

    pub fn open_add(&mut self) -> AppResult<()> {
        self.require(|screen| matches!(screen, Screen::List), "追加")?;
        self.screen = Screen::Add;
        Ok(())
    }

    /// 追加フォームを送信し、再読み込み後に一覧画面へ戻る
    ///
    /// 入力エラーなどで失敗した場合は追加画面に留まる
    pub async fn submit_add(&mut self, draft: &SubscriptionDraft) -> AppResult<CreateOutcome> {
        self.require(|screen| matches!(screen, Screen::Add), "登録")?;
        let outcome = self.store.create_subscription(draft).await;
        self.process_auth_events();

        let outcome = outcome?;
        if self.screen.is_authenticated() {
            self.screen = Screen::List;
        }
        Ok(outcome)
    }

    pub fn open_detail(&mut self, id: i64) -> AppResult<()> {
        self.require(|screen| matches!(screen, Screen::List), "詳細表示")?;
        let snapshot = self.store.snapshot_of(id)?;
        self.screen = Screen::Detail(snapshot);
        Ok(())
    }

    /// 追加画面・詳細画面から一覧画面へ戻る
    pub fn back_to_list(&mut self) -> AppResult<()> {
        self.require(
            |screen| matches!(screen, Screen::Add | Screen::Detail(_)),
            "戻る",
        )?;
        self.screen = Screen::List;
        Ok(())
    }

    /// 詳細画面のサブスクリプションを削除して一覧画面へ戻る
    ///
    /// 削除に失敗しても一覧画面へ戻り、エラーを返す
    pub async fn delete_current(&mut self) -> AppResult<ReloadOutcome> {
        self.require(|screen| matches!(screen, Screen::Detail(_)), "削除")?;
        let id = match &self.screen {
            Screen::Detail(snapshot) => snapshot.subscription.id,
            _ => return Err(AppError::invalid_transition("詳細画面ではありません")),
        };

        self.screen = Screen::List;
        let outcome = self.store.delete_subscription(id).await;
        self.process_auth_events();
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::secure_storage::SecureStorage;
    use crate::features::auth::session::SessionContext;
    use crate::features::store::testing::{MockFailure, MockRemote, USER_ID};
    use crate::features::subscriptions::{BillingPeriod, CategoryInput, Subscription};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    fn session_in(temp_dir: &TempDir) -> SessionContext {
        SessionContext::new(SecureStorage::new(temp_dir.path().join("secure.json")))
    }

    fn gate_with(session: SessionContext) -> SessionGate<MockRemote> {
        let remote = MockRemote::new().with_session(session.clone());
        remote.seed_subscription(Subscription {
            id: 1,
            user_id: USER_ID,
            category_id: None,
            name: "Netflix".to_string(),
            price: Decimal::new(1500, 2),
            period: BillingPeriod::Monthly,
            next_payment: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            created_at: "2026-10-01T00:00:00".to_string(),
        });
        SessionGate::new(ClientStore::new(remote, session))
    }

    fn login_response() -> LoginResponse {
        LoginResponse {
            access_token: "token".to_string(),
            user_id: USER_ID,
        }
    }

    #[test]
    fn test_initial_screen_depends_on_persisted_session() {
        let temp_dir = TempDir::new().unwrap();
        let session = session_in(&temp_dir);
        let mut gate = gate_with(session.clone());
        assert_eq!(gate.screen(), &Screen::Unauthenticated { notice: None });

        session.establish("token", USER_ID).unwrap();
        let mut gate = gate_with(session);
        assert_eq!(gate.screen(), &Screen::List);
    }

    #[tokio::test]
    async fn test_sign_in_moves_to_list_and_loads() {
        let temp_dir = TempDir::new().unwrap();
        let session = session_in(&temp_dir);
        let mut gate = gate_with(session.clone());

        let login_session = session.clone();
        gate.sign_in(async move {
            login_session.establish("token", USER_ID)?;
            Ok::<_, AppError>(login_response())
        })
        .await
        .unwrap();

        assert_eq!(gate.screen(), &Screen::List);
        assert_eq!(gate.store().subscriptions().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_login_stays_unauthenticated() {
        let temp_dir = TempDir::new().unwrap();
        let mut gate = gate_with(session_in(&temp_dir));

        let result = gate
            .sign_in(async {
                Err::<LoginResponse, _>(AppError::validation("ユーザーIDは整数で入力してください"))
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(!gate.screen().is_authenticated());
        assert!(gate.store().remote().calls().is_empty());
    }

    #[tokio::test]
    async fn test_switch_account_keeps_session_until_new_login_succeeds() {
        let temp_dir = TempDir::new().unwrap();
        let session = session_in(&temp_dir);
        session.establish("old-token", USER_ID).unwrap();
        let mut gate = gate_with(session.clone());
        gate.start().await.unwrap();

        assert!(matches!(
            gate.sign_in(async { Ok::<_, AppError>(login_response()) }).await,
            Err(AppError::InvalidTransition(_))
        ));

        let result = gate
            .switch_account(async {
                Err::<LoginResponse, _>(AppError::Remote {
                    status: 500,
                    message: "down".to_string(),
                })
            })
            .await;
        assert!(matches!(result, Err(AppError::Remote { status: 500, .. })));
        assert_eq!(session.token().unwrap().as_deref(), Some("old-token"));
        assert_eq!(gate.screen(), &Screen::List);

        let login_session = session.clone();
        gate.switch_account(async move {
            login_session.establish("token", USER_ID)?;
            Ok::<_, AppError>(login_response())
        })
        .await
        .unwrap();
        assert_eq!(session.token().unwrap().as_deref(), Some("token"));
        assert_eq!(gate.screen(), &Screen::List);
    }

    #[tokio::test]
    async fn test_navigation_between_screens() {
        let temp_dir = TempDir::new().unwrap();
        let session = session_in(&temp_dir);
        session.establish("token", USER_ID).unwrap();
        let mut gate = gate_with(session);
        gate.start().await.unwrap();

        gate.open_detail(1).unwrap();
        match gate.screen() {
            Screen::Detail(snapshot) => assert_eq!(snapshot.subscription.name, "Netflix"),
            other => panic!("予期しない画面: {other:?}"),
        }
        assert!(matches!(gate.open_add(), Err(AppError::InvalidTransition(_))));

        gate.back_to_list().unwrap();
        gate.open_add().unwrap();
        assert!(matches!(gate.open_detail(1), Err(AppError::InvalidTransition(_))));
        gate.back_to_list().unwrap();
        assert!(matches!(gate.back_to_list(), Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_submit_add_returns_to_list_after_reload() {
        let temp_dir = TempDir::new().unwrap();
        let session = session_in(&temp_dir);
        session.establish("token", USER_ID).unwrap();
        let mut gate = gate_with(session);
        gate.start().await.unwrap();
        gate.open_add().unwrap();

        let mut draft = SubscriptionDraft {
            name: "Notion".to_string(),
            price: "96.00".to_string(),
            period: BillingPeriod::Yearly,
            next_payment: "2026-02-01".to_string(),
            category: CategoryInput::None,
        };
        draft.price = "ninety".to_string();
        assert!(gate.submit_add(&draft).await.is_err());
        assert_eq!(gate.screen(), &Screen::Add);

        draft.price = "96.00".to_string();
        gate.submit_add(&draft).await.unwrap();
        assert_eq!(gate.screen(), &Screen::List);
        assert_eq!(gate.store().monthly_overview().monthly_total, Decimal::new(23, 0));
    }

    #[tokio::test]
    async fn test_unauthorized_from_any_screen_returns_to_login() {
        let temp_dir = TempDir::new().unwrap();
        let session = session_in(&temp_dir);
        session.establish("token", USER_ID).unwrap();
        let mut gate = gate_with(session.clone());
        gate.start().await.unwrap();
        gate.open_detail(1).unwrap();

        gate.store()
            .remote()
            .fail("delete_subscription", MockFailure::Unauthorized);
        let result = gate.delete_current().await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
        assert!(!session.has_session());
        match gate.screen() {
            Screen::Unauthenticated { notice } => assert!(notice.is_some()),
            other => panic!("予期しない画面: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_logout_event_from_other_clone_is_observed() {
        let temp_dir = TempDir::new().unwrap();
        let session = session_in(&temp_dir);
        session.establish("token", USER_ID).unwrap();
        let mut gate = gate_with(session.clone());
        gate.start().await.unwrap();
        gate.open_add().unwrap();

        session.clone().invalidate(LogoutReason::Unauthorized);

        assert!(!gate.screen().is_authenticated());
        assert!(matches!(gate.open_add(), Err(AppError::InvalidTransition(_))));
    }

    #[tokio::test]
    async fn test_explicit_logout_has_no_notice() {
        let temp_dir = TempDir::new().unwrap();
        let session = session_in(&temp_dir);
        session.establish("token", USER_ID).unwrap();
        let mut gate = gate_with(session.clone());

        gate.logout().unwrap();

        assert_eq!(gate.screen(), &Screen::Unauthenticated { notice: None });
        assert!(!session.has_session());
        assert!(gate.logout().is_err());
    }
}
