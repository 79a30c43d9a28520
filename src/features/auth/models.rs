use serde::{Deserialize, Serialize};

/// ログインAPIへのリクエスト
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    /// ユーザーID
    pub user_id: i64,
}

/// ログインAPIからのレスポンス
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    /// アクセストークン
    pub access_token: String,
    /// ユーザーID
    pub user_id: i64,
}

/// ログアウトの理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// ユーザーによる明示的なログアウト
    UserRequested,
    /// APIサーバーが401を返した
    Unauthorized,
    /// 一括再読み込みに失敗した（セッション無効とみなす）
    ReloadFailed,
}

impl LogoutReason {
    /// 画面に表示する通知文言
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            LogoutReason::UserRequested => None,
            LogoutReason::Unauthorized => Some("セッションの有効期限が切れました。再度ログインしてください"),
            LogoutReason::ReloadFailed => Some("データを読み込めませんでした。再度ログインしてください"),
        }
    }
}

/// 認証イベント（セッションゲートが購読する）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// ログインに成功した
    LoggedIn { user_id: i64 },
    /// セッションが破棄された
    LoggedOut { reason: LogoutReason },
}
