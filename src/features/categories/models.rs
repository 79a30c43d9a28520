use serde::{Deserialize, Serialize};

/// カテゴリーデータモデル
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
}

/// カテゴリー作成リクエスト
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateCategoryRequest {
    pub name: String,
}
