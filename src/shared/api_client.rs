/// 汎用APIクライアント
///
/// APIサーバーとの通信を行う汎用的なクライアント。
/// サブスクリプション、カテゴリー、レポート、認証の各エンドポイントで使用する。
/// 401の検出とセッション破棄はここで一元的に行う。
use crate::features::auth::models::LogoutReason;
use crate::features::auth::session::SessionContext;
use crate::shared::config::ApiConfig;
use crate::shared::errors::{AppError, AppResult};
use log::{debug, error, info};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// リクエストに認証ヘッダーを付与するかどうか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestAuth {
    /// セッションがあればBearerトークンを付与し、401でセッションを破棄する
    Session,
    /// 認証なし（ログイン交換のみ）
    Anonymous,
}

/// APIサーバーからのエラーレスポンス（FastAPI形式）
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// 汎用APIクライアント
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
    session: SessionContext,
}

impl ApiClient {
    /// 設定を指定してAPIクライアントを作成
    pub fn new(config: ApiConfig, session: SessionContext) -> AppResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::configuration(format!("HTTPクライアント初期化失敗: {e}")))?;

        Ok(Self {
            client,
            config,
            session,
        })
    }

    /// API設定を取得
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// セッションを取得
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// APIサーバーがlocalhostかどうかを判定
    pub fn is_localhost(&self) -> bool {
        self.config.is_localhost()
    }

    /// GETリクエストを送信
    pub async fn get<T>(&self, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        debug!("GETリクエスト送信: endpoint={endpoint}");
        let request = self.client.get(self.config.endpoint_url(endpoint));
        self.send(request, "GET", endpoint, RequestAuth::Session)
            .await
    }

    /// POSTリクエストを送信
    pub async fn post<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        debug!("POSTリクエスト送信: endpoint={endpoint}");
        let request = self.client.post(self.config.endpoint_url(endpoint)).json(body);
        self.send(request, "POST", endpoint, RequestAuth::Session)
            .await
    }

    /// DELETEリクエストを送信
    pub async fn delete<T>(&self, endpoint: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        debug!("DELETEリクエスト送信: endpoint={endpoint}");
        let request = self.client.delete(self.config.endpoint_url(endpoint));
        self.send(request, "DELETE", endpoint, RequestAuth::Session)
            .await
    }

    /// 認証なしでPOSTリクエストを送信（ログイン交換用）
    ///
    /// 401を受け取ってもセッションは破棄しない
    pub async fn post_anonymous<B, T>(&self, endpoint: &str, body: &B) -> AppResult<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        debug!("認証なしPOSTリクエスト送信: endpoint={endpoint}");
        let request = self.client.post(self.config.endpoint_url(endpoint)).json(body);
        self.send(request, "POST", endpoint, RequestAuth::Anonymous)
            .await
    }

    /// リクエストを送信してレスポンスを処理する
    ///
    /// 自動リトライは行わない
    async fn send<T>(
        &self,
        mut request: RequestBuilder,
        method: &str,
        endpoint: &str,
        auth: RequestAuth,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        if auth == RequestAuth::Session {
            if let Some(token) = self.session.token()? {
                request = request.bearer_auth(token);
            }
        }

        let response = request.send().await.map_err(|e| {
            AppError::ExternalService(format!("APIサーバーへの接続に失敗しました: {e}"))
        })?;

        self.handle_response(response, method, endpoint, auth).await
    }

    /// レスポンスのステータスに応じて結果を返す
    async fn handle_response<T>(
        &self,
        response: Response,
        method: &str,
        endpoint: &str,
        auth: RequestAuth,
    ) -> AppResult<T>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED && auth == RequestAuth::Session {
            error!("{method}リクエストが401を返しました。セッションを破棄します: endpoint={endpoint}");
            self.session.invalidate(LogoutReason::Unauthorized);
            return Err(AppError::Unauthorized);
        }

        if status.is_success() {
            let result: T = response.json().await.map_err(|e| {
                AppError::ExternalService(format!("レスポンス解析エラー: {e}"))
            })?;
            info!("{method}リクエスト成功: endpoint={endpoint}");
            return Ok(result);
        }

        let body = response.text().await.ok();
        let message = error_message(status, body.as_deref());
        log::warn!(
            "{method}リクエスト失敗: endpoint={endpoint}, status={}, message={message}",
            status.as_u16()
        );

        Err(AppError::Remote {
            status: status.as_u16(),
            message,
        })
    }
}

/// エラーレスポンスからユーザー向けメッセージを取り出す
///
/// `{"detail": "..."}` 形式ならdetailを、それ以外は本文をそのまま使う。
/// 本文が空の場合はステータスの説明文にフォールバックする。
pub fn error_message(status: StatusCode, body: Option<&str>) -> String {
    let body = body.map(str::trim).filter(|b| !b.is_empty());

    match body {
        Some(text) => match serde_json::from_str::<ErrorResponse>(text) {
            Ok(parsed) => parsed.detail,
            Err(_) => text.to_string(),
        },
        None => status
            .canonical_reason()
            .unwrap_or("不明なエラーが発生しました")
            .to_string(),
    }
}
