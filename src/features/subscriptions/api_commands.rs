/// API Server経由でのサブスクリプション操作
///
/// エンドポイント: /subscriptions
use crate::features::subscriptions::models::*;
use crate::shared::api_client::ApiClient;
use crate::shared::errors::{AppError, AppResult};
use log::info;

/// サブスクリプション一覧を取得する
pub async fn fetch_subscriptions(api_client: &ApiClient) -> AppResult<Vec<Subscription>> {
    let subscriptions: Vec<Subscription> = api_client.get("/subscriptions").await?;

    info!("サブスクリプション一覧取得成功: count={}", subscriptions.len());
    Ok(subscriptions)
}

/// サブスクリプションを作成する
///
/// # 引数
/// * `api_client` - APIクライアント
/// * `dto` - 検証済みのサブスクリプション作成用DTO
pub async fn create_subscription(
    api_client: &ApiClient,
    dto: &CreateSubscriptionDto,
) -> AppResult<Subscription> {
    let subscription: Subscription = api_client.post("/subscriptions", dto).await?;

    info!(
        "サブスクリプション作成成功: subscription_id={}, category_id={:?}",
        subscription.id, subscription.category_id
    );
    Ok(subscription)
}

/// サブスクリプションを削除する
///
/// `{"ok": false}` が返された場合も失敗として扱う
pub async fn delete_subscription(api_client: &ApiClient, id: i64) -> AppResult<()> {
    let endpoint = format!("/subscriptions/{id}");
    let response: DeleteSubscriptionResponse = api_client.delete(&endpoint).await?;

    if !response.ok {
        return Err(AppError::external_service(
            "サブスクリプション削除".to_string(),
            format!("APIサーバーが削除を拒否しました: subscription_id={id}"),
        ));
    }

    info!("サブスクリプション削除成功: subscription_id={id}");
    Ok(())
}
