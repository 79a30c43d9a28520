use crate::features::auth::models::{LoginRequest, LoginResponse, LogoutReason};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::{AppError, AppResult};
use log::{info, warn};

/// 開発用ログインのエンドポイント
const DEV_LOGIN_ENDPOINT: &str = "/auth/dev-login";

/// 認証サービス
///
/// ユーザーIDとアクセストークンの交換と、ログアウトを担当する
#[derive(Debug, Clone)]
pub struct AuthService {
    api_client: ApiClient,
}

impl AuthService {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// 入力されたユーザーIDを検証する
    ///
    /// 整数として解釈できない場合はバリデーションエラーを返す
    pub fn parse_user_id(input: &str) -> AppResult<i64> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AppError::validation("ユーザーIDを入力してください"));
        }
        trimmed
            .parse::<i64>()
            .map_err(|_| AppError::validation("ユーザーIDは整数で入力してください"))
    }

    /// ユーザーIDでログインし、セッションを確立する
    ///
    /// # 引数
    /// * `input` - 入力されたユーザーID（文字列）
    ///
    /// # 戻り値
    /// ログインレスポンス。トークンは戻る前に永続化される
    pub async fn dev_login(&self, input: &str) -> AppResult<LoginResponse> {
        let user_id = Self::parse_user_id(input)?;

        if !self.api_client.is_localhost() {
            warn!(
                "開発用ログインはlocalhostのAPIサーバーでのみ有効です: base_url={}",
                self.api_client.config().base_url
            );
        }

        let response: LoginResponse = self
            .api_client
            .post_anonymous(DEV_LOGIN_ENDPOINT, &LoginRequest { user_id })
            .await?;

        self.api_client
            .session()
            .establish(&response.access_token, response.user_id)?;
        info!("ログイン成功: user_id={}", response.user_id);

        Ok(response)
    }

    /// ログアウトする（保存済みの認証情報を削除する）
    pub fn logout(&self) {
        self.api_client.session().invalidate(LogoutReason::UserRequested);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::models::AuthEvent;
    use crate::features::auth::secure_storage::SecureStorage;
    use crate::features::auth::session::SessionContext;
    use crate::shared::api_client::test_server::serve_once;
    use crate::shared::config::ApiConfig;
    use tempfile::TempDir;

    fn service_for(base_url: &str, temp_dir: &TempDir) -> AuthService {
        let session = SessionContext::new(SecureStorage::new(temp_dir.path().join("secure.json")));
        let config = ApiConfig {
            base_url: base_url.to_string(),
            path_prefix: "/api".to_string(),
            timeout_seconds: 5,
        };
        AuthService::new(ApiClient::new(config, session).unwrap())
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(AuthService::parse_user_id(" 42 ").unwrap(), 42);
        assert!(matches!(
            AuthService::parse_user_id("abc"),
            Err(AppError::Validation(_))
        ));
        assert!(AuthService::parse_user_id("").is_err());
        assert!(AuthService::parse_user_id("4.2").is_err());
    }

    #[tokio::test]
    async fn test_non_numeric_id_makes_no_network_call() {
        let temp_dir = TempDir::new().unwrap();
        // 接続できないポートを指定しても、検証エラーが先に返る
        let service = service_for("http://127.0.0.1:9", &temp_dir);

        let result = service.dev_login("not-a-number").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(!service.api_client.session().has_session());
    }

    #[tokio::test]
    async fn test_dev_login_persists_token_before_returning() {
        let temp_dir = TempDir::new().unwrap();
        let (base_url, server) =
            serve_once("200 OK", r#"{"access_token":"jwt-token","user_id":42}"#).await;
        let service = service_for(&base_url, &temp_dir);
        let mut events = service.api_client.session().subscribe();

        let response = service.dev_login("42").await.unwrap();

        assert_eq!(response.user_id, 42);
        assert_eq!(
            service.api_client.session().token().unwrap().as_deref(),
            Some("jwt-token")
        );
        assert_eq!(events.try_recv().unwrap(), AuthEvent::LoggedIn { user_id: 42 });

        let request = server.await.unwrap().to_lowercase();
        assert!(request.starts_with("post /api/auth/dev-login"));
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test]
    async fn test_rejected_login_keeps_logged_out() {
        let temp_dir = TempDir::new().unwrap();
        let (base_url, _server) = serve_once("404 Not Found", r#"{"detail":"Not Found"}"#).await;
        let service = service_for(&base_url, &temp_dir);

        let result = service.dev_login("7").await;

        assert!(matches!(result, Err(AppError::Remote { status: 404, .. })));
        assert!(!service.api_client.session().has_session());
    }

    #[test]
    fn test_logout_clears_session() {
        let temp_dir = TempDir::new().unwrap();
        let service = service_for("http://localhost:8000", &temp_dir);
        service.api_client.session().establish("tok", 1).unwrap();

        service.logout();

        assert!(!service.api_client.session().has_session());
    }
}
