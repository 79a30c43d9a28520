use crate::features::auth::models::{AuthEvent, LogoutReason};
use crate::features::auth::secure_storage::{SecureStorage, StoredAuthInfo};
use crate::shared::errors::AppResult;
use chrono::Utc;
use tokio::sync::broadcast;

/// 認証イベントチャネルの容量
const AUTH_EVENT_CAPACITY: usize = 16;

/// セッション管理を行う構造体
///
/// 保存済みトークンの読み書きと、認証イベントの配信を担当する。
/// APIクライアントやストアはこれのクローンを保持し、
/// 401受信時などに `invalidate` を呼び出す。
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// セキュアストレージ
    storage: SecureStorage,
    /// 認証イベントの送信側
    events: broadcast::Sender<AuthEvent>,
}

impl SessionContext {
    /// 新しいSessionContextを作成する
    pub fn new(storage: SecureStorage) -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self { storage, events }
    }

    /// 認証イベントを購読する
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    /// 現在のセッショントークンを取得する
    pub fn token(&self) -> AppResult<Option<String>> {
        self.storage.get_session_token()
    }

    /// 保存済みのセッションがあるかどうか
    pub fn has_session(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }

    /// ログイン成功時にセッションを確立する
    ///
    /// トークンは画面遷移より先に永続化される
    pub fn establish(&self, token: &str, user_id: i64) -> AppResult<()> {
        let auth_info = StoredAuthInfo {
            session_token: token.to_string(),
            user_id,
            last_login: Utc::now().to_rfc3339(),
        };
        self.storage.save_auth_info(&auth_info)?;
        self.publish(AuthEvent::LoggedIn { user_id });
        Ok(())
    }

    /// セッションを破棄し、ログアウトを配信する
    ///
    /// ストレージの削除に失敗してもイベントは必ず配信する
    pub fn invalidate(&self, reason: LogoutReason) {
        if let Err(e) = self.storage.clear_auth_info() {
            log::error!("認証情報の削除に失敗しました: {e}");
        }

        match reason {
            LogoutReason::UserRequested => log::info!("ログアウトしました"),
            _ => log::warn!("セッションを破棄しました: reason={reason:?}"),
        }

        self.publish(AuthEvent::LoggedOut { reason });
    }

    fn publish(&self, event: AuthEvent) {
        // 購読者がいない場合は送信エラーになるが問題ない
        if self.events.send(event).is_err() {
            log::debug!("認証イベントの購読者がいません");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context_in(temp_dir: &TempDir) -> SessionContext {
        SessionContext::new(SecureStorage::new(temp_dir.path().join("secure.json")))
    }

    #[test]
    fn test_establish_persists_token_and_publishes() {
        let temp_dir = TempDir::new().unwrap();
        let context = context_in(&temp_dir);
        let mut receiver = context.subscribe();

        context.establish("tok", 5).unwrap();

        assert_eq!(context.token().unwrap().as_deref(), Some("tok"));
        assert!(context.has_session());
        assert_eq!(receiver.try_recv().unwrap(), AuthEvent::LoggedIn { user_id: 5 });
    }

    #[test]
    fn test_invalidate_clears_token_and_broadcasts_to_all_clones() {
        let temp_dir = TempDir::new().unwrap();
        let context = context_in(&temp_dir);
        context.establish("tok", 5).unwrap();

        let mut receiver = context.subscribe();
        let clone = context.clone();
        clone.invalidate(LogoutReason::Unauthorized);

        assert_eq!(context.token().unwrap(), None);
        assert_eq!(
            receiver.try_recv().unwrap(),
            AuthEvent::LoggedOut {
                reason: LogoutReason::Unauthorized
            }
        );
    }

    #[test]
    fn test_invalidate_without_subscribers_does_not_fail() {
        let temp_dir = TempDir::new().unwrap();
        let context = context_in(&temp_dir);
        context.invalidate(LogoutReason::UserRequested);
        assert!(!context.has_session());
    }
}
