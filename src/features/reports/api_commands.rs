/// API Server経由での集計サマリー取得
use crate::features::reports::models::ReportSummary;
use crate::shared::api_client::ApiClient;
use crate::shared::errors::AppResult;
use log::info;

/// 集計サマリーを取得する
pub async fn fetch_summary(api_client: &ApiClient) -> AppResult<ReportSummary> {
    let summary: ReportSummary = api_client.get("/reports/summary").await?;

    info!(
        "集計サマリー取得成功: total_monthly={}, categories={}",
        summary.total_monthly,
        summary.by_category.len()
    );
    Ok(summary)
}
