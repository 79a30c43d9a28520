use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 未分類サブスクリプションの集計名
///
/// APIサーバーのサマリーと同じ名前を使い、両者を比較できるようにする
pub const UNCATEGORIZED_LABEL: &str = "Без категории";

/// APIサーバーの集計サマリー
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ReportSummary {
    /// 月額換算の合計
    pub total_monthly: f64,
    /// カテゴリー名ごとの月額換算の小計
    pub by_category: BTreeMap<String, f64>,
}
