/// API Server経由でのカテゴリー操作
///
/// エンドポイント: /categories
use crate::features::categories::models::*;
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use log::info;

/// カテゴリー一覧を取得する
pub async fn fetch_categories(api_client: &ApiClient) -> AppResult<Vec<Category>> {
    let categories: Vec<Category> = api_client.get("/categories").await?;

    info!("カテゴリー一覧取得成功: count={}", categories.len());
    Ok(categories)
}

/// カテゴリーを作成する
pub async fn create_category(api_client: &ApiClient, name: &str) -> AppResult<Category> {
    let request = CreateCategoryRequest {
        name: name.to_string(),
    };
    let category: Category = api_client.post("/categories", &request).await?;

    info!(
        "カテゴリー作成成功: category_id={}, name={}",
        category.id, category.name
    );
    Ok(category)
}
