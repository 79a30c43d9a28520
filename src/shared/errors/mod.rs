use thiserror::Error;

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// バリデーション関連のエラー（APIサーバーへは送信されない）
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 認証エラー（HTTP 401）。セッションは常に破棄される
    #[error("認証エラー: 再度ログインしてください")]
    Unauthorized,

    /// APIサーバーが2xx以外を返した場合のエラー
    #[error("APIサーバーエラー: status={status}, message={message}")]
    Remote { status: u16, message: String },

    /// 外部サービス連携（通信・レスポンス解析）でのエラー
    #[error("外部サービスエラー: {0}")]
    ExternalService(String),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 画面遷移が許可されていない場合のエラー
    #[error("無効な画面遷移: {0}")]
    InvalidTransition(String),

    /// セキュアストレージ関連のエラー
    #[error("ストレージエラー: {0}")]
    Storage(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),

    /// JSON解析エラー
    #[error("JSON解析エラー: {0}")]
    Json(#[from] serde_json::Error),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（外部サービス一時的エラーなど）
    Medium,
    /// 高重要度（設定エラーなど）
    High,
    /// 最重要（セッション喪失など）
    Critical,
}

impl ErrorSeverity {
    /// 重要度に応じたログレベル
    pub fn log_level(self) -> log::Level {
        match self {
            ErrorSeverity::Low => log::Level::Info,
            ErrorSeverity::Medium => log::Level::Warn,
            ErrorSeverity::High | ErrorSeverity::Critical => log::Level::Error,
        }
    }
}

impl AppError {
    /// ユーザーに表示するためのフレンドリーなメッセージを取得
    ///
    /// APIサーバーのエラーはレスポンス本文をそのまま表示する
    pub fn user_message(&self) -> &str {
        match self {
            AppError::Validation(msg) => msg,
            AppError::Unauthorized => "ログインが必要です",
            AppError::Remote { message, .. } => message,
            AppError::ExternalService(_) => "APIサーバーとの通信でエラーが発生しました",
            AppError::NotFound(msg) => msg,
            AppError::InvalidTransition(_) => "この画面からは実行できない操作です",
            AppError::Storage(_) => "認証情報の保存でエラーが発生しました",
            AppError::Configuration(_) => "設定エラーが発生しました",
            AppError::Io(_) => "ファイル操作でエラーが発生しました",
            AppError::Json(_) => "データ形式の解析でエラーが発生しました",
        }
    }

    /// エラーの詳細情報を取得（ログ出力用）
    pub fn details(&self) -> String {
        format!("{self}")
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::InvalidTransition(_) => ErrorSeverity::Low,
            AppError::Remote { .. } => ErrorSeverity::Medium,
            AppError::ExternalService(_) => ErrorSeverity::Medium,
            AppError::Io(_) => ErrorSeverity::Medium,
            AppError::Json(_) => ErrorSeverity::Medium,
            AppError::Storage(_) => ErrorSeverity::High,
            AppError::Configuration(_) => ErrorSeverity::High,
            AppError::Unauthorized => ErrorSeverity::Critical,
        }
    }

    /// 認証エラー（セッション破棄の対象）かどうか
    pub fn is_auth_fault(&self) -> bool {
        matches!(self, AppError::Unauthorized)
    }

    /// バリデーションエラーを作成するヘルパー関数
    pub fn validation<S: Into<String>>(message: S) -> Self {
        AppError::Validation(message.into())
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 外部サービスエラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `service` - サービス名
    /// * `message` - エラーメッセージ
    pub fn external_service<S: Into<String>>(service: S, message: S) -> Self {
        AppError::ExternalService(format!("{}: {}", service.into(), message.into()))
    }

    /// 画面遷移エラーを作成するヘルパー関数
    pub fn invalid_transition<S: Into<String>>(message: S) -> Self {
        AppError::InvalidTransition(message.into())
    }

    /// ストレージエラーを作成するヘルパー関数
    pub fn storage<S: Into<String>>(message: S) -> Self {
        AppError::Storage(message.into())
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }
}

/// AppErrorからStringへの変換（画面表示用）
impl From<AppError> for String {
    fn from(error: AppError) -> Self {
        error.user_message().to_string()
    }
}

/// reqwest::ErrorからAppErrorへの変換
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        AppError::ExternalService(error.to_string())
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
