/// リモートストアの抽象化
///
/// クライアントストアが依存するAPIサーバーの操作をトレイトとして定義する。
/// 本番ではApiClientが実装し、テストではモックに差し替える。
use crate::features::categories::{api_commands as category_api, Category};
use crate::features::reports::{api_commands as report_api, ReportSummary};
use crate::features::subscriptions::{
    api_commands as subscription_api, CreateSubscriptionDto, Subscription,
};
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;

/// APIサーバーが提供するデータ操作
#[allow(async_fn_in_trait)]
pub trait RemoteStore {
    /// サブスクリプション一覧を取得する
    async fn list_subscriptions(&self) -> AppResult<Vec<Subscription>>;

    /// サブスクリプションを作成する
    async fn create_subscription(&self, dto: &CreateSubscriptionDto) -> AppResult<Subscription>;

    /// サブスクリプションを削除する
    async fn delete_subscription(&self, id: i64) -> AppResult<()>;

    /// カテゴリー一覧を取得する
    async fn list_categories(&self) -> AppResult<Vec<Category>>;

    /// カテゴリーを作成する
    async fn create_category(&self, name: &str) -> AppResult<Category>;

    /// 集計サマリーを取得する
    async fn fetch_summary(&self) -> AppResult<ReportSummary>;
}

impl RemoteStore for ApiClient {
    async fn list_subscriptions(&self) -> AppResult<Vec<Subscription>> {
        subscription_api::fetch_subscriptions(self).await
    }

    async fn create_subscription(&self, dto: &CreateSubscriptionDto) -> AppResult<Subscription> {
        subscription_api::create_subscription(self, dto).await
    }

    async fn delete_subscription(&self, id: i64) -> AppResult<()> {
        subscription_api::delete_subscription(self, id).await
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        category_api::fetch_categories(self).await
    }

    async fn create_category(&self, name: &str) -> AppResult<Category> {
        category_api::create_category(self, name).await
    }

    async fn fetch_summary(&self) -> AppResult<ReportSummary> {
        report_api::fetch_summary(self).await
    }
}
