/// セキュアストレージモジュール
///
/// セッショントークンやユーザーIDをJSONファイルに保存・取得します。
/// 再起動後もセッションを維持するために使用されます。
use crate::shared::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// セキュアストレージのキー定義
pub struct SecureStorageKeys;

impl SecureStorageKeys {
    /// セッショントークンのキー
    pub const SESSION_TOKEN: &'static str = "session_token";
    /// ユーザーIDのキー
    pub const USER_ID: &'static str = "user_id";
    /// 最終ログイン日時のキー
    pub const LAST_LOGIN: &'static str = "last_login";
}

/// セキュアストレージに保存する認証情報
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAuthInfo {
    /// セッショントークン
    pub session_token: String,
    /// ユーザーID
    pub user_id: i64,
    /// 最終ログイン日時（RFC3339形式）
    pub last_login: String,
}

/// セキュアストレージサービス
#[derive(Debug, Clone)]
pub struct SecureStorage {
    /// ストアファイルのパス
    store_path: PathBuf,
}

impl SecureStorage {
    /// 新しいSecureStorageを作成する
    ///
    /// # 引数
    /// * `store_path` - ストアファイルのパス（存在しなくてもよい）
    pub fn new(store_path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: store_path.into(),
        }
    }

    /// ストアファイルのパスを取得する
    pub fn path(&self) -> &Path {
        &self.store_path
    }

    /// セッショントークンを保存する
    pub fn save_session_token(&self, token: &str) -> AppResult<()> {
        let mut store = self.load()?;
        store.insert(
            SecureStorageKeys::SESSION_TOKEN.to_string(),
            Value::String(token.to_string()),
        );
        self.save(&store)?;

        log::info!("セッショントークンを保存しました");
        Ok(())
    }

    /// セッショントークンを取得する
    ///
    /// # 戻り値
    /// セッショントークン（存在しない場合はNone）
    pub fn get_session_token(&self) -> AppResult<Option<String>> {
        let store = self.load()?;
        let token = store
            .get(SecureStorageKeys::SESSION_TOKEN)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        Ok(token)
    }

    /// 認証情報をまとめて保存する
    pub fn save_auth_info(&self, auth_info: &StoredAuthInfo) -> AppResult<()> {
        let mut store = self.load()?;
        store.insert(
            SecureStorageKeys::SESSION_TOKEN.to_string(),
            Value::String(auth_info.session_token.clone()),
        );
        store.insert(
            SecureStorageKeys::USER_ID.to_string(),
            Value::from(auth_info.user_id),
        );
        store.insert(
            SecureStorageKeys::LAST_LOGIN.to_string(),
            Value::String(auth_info.last_login.clone()),
        );
        self.save(&store)?;

        log::info!("認証情報を保存しました: user_id={}", auth_info.user_id);
        Ok(())
    }

    /// 認証情報をまとめて取得する
    ///
    /// # 戻り値
    /// 認証情報（いずれかが欠けている場合はNone）
    pub fn get_auth_info(&self) -> AppResult<Option<StoredAuthInfo>> {
        let store = self.load()?;

        let session_token = store
            .get(SecureStorageKeys::SESSION_TOKEN)
            .and_then(|v| v.as_str());
        let user_id = store
            .get(SecureStorageKeys::USER_ID)
            .and_then(|v| v.as_i64());
        let last_login = store
            .get(SecureStorageKeys::LAST_LOGIN)
            .and_then(|v| v.as_str());

        match (session_token, user_id, last_login) {
            (Some(session_token), Some(user_id), Some(last_login)) => Ok(Some(StoredAuthInfo {
                session_token: session_token.to_string(),
                user_id,
                last_login: last_login.to_string(),
            })),
            _ => Ok(None),
        }
    }

    /// すべての認証情報を削除する（ログアウト時）
    pub fn clear_auth_info(&self) -> AppResult<()> {
        let mut store = self.load()?;

        store.remove(SecureStorageKeys::SESSION_TOKEN);
        store.remove(SecureStorageKeys::USER_ID);
        store.remove(SecureStorageKeys::LAST_LOGIN);

        self.save(&store)?;

        log::info!("認証情報を削除しました");
        Ok(())
    }

    fn load(&self) -> AppResult<Map<String, Value>> {
        if !self.store_path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.store_path).map_err(|e| {
            AppError::storage(format!(
                "ストアの読み込みに失敗しました: {} ({e})",
                self.store_path.display()
            ))
        })?;

        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            _ => Err(AppError::storage("ストアの形式が不正です")),
        }
    }

    fn save(&self, store: &Map<String, Value>) -> AppResult<()> {
        if let Some(parent) = self.store_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    AppError::storage(format!("ストアディレクトリの作成に失敗しました: {e}"))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(store)?;
        fs::write(&self.store_path, content)
            .map_err(|e| AppError::storage(format!("ストアの保存に失敗しました: {e}")))?;

        Ok(())
    }
}
