/// ポートフォリオ集計
///
/// 月額換算の合計・件数・カテゴリー別小計をクライアント側で計算する。
/// 年額は表示用に「月額合計 × 12」で再計算する（各サブスクリプションの
/// 年額換算の合計とは一致しない場合がある）。
/// 合計が `Decimal` の範囲を超える場合は `Decimal::MAX` に丸める。
use crate::features::categories::{resolve_name, Category};
use crate::features::reports::models::{ReportSummary, UNCATEGORIZED_LABEL};
use crate::features::subscriptions::{Subscription, MONTHS_PER_YEAR};
use log::warn;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// サーバー集計との許容誤差（1セント）
pub const SUMMARY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// クライアント側で計算した集計結果
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioStats {
    pub total_monthly: Decimal,
    pub active_count: usize,
    pub by_category: BTreeMap<String, Decimal>,
}

impl PortfolioStats {
    /// 年額合計（月額合計 × 12）
    pub fn yearly_total(&self) -> Decimal {
        self.total_monthly
            .checked_mul(MONTHS_PER_YEAR)
            .unwrap_or(Decimal::MAX)
    }
}

fn saturating_add(total: Decimal, amount: Decimal) -> (Decimal, bool) {
    match total.checked_add(amount) {
        Some(sum) => (sum, false),
        None => (Decimal::MAX, true),
    }
}

/// サブスクリプション一覧を集計する
pub fn summarize(subscriptions: &[Subscription], categories: &[Category]) -> PortfolioStats {
    let mut stats = PortfolioStats {
        active_count: subscriptions.len(),
        ..PortfolioStats::default()
    };

    let mut overflowed = false;
    for subscription in subscriptions {
        let monthly = subscription.monthly_equivalent();
        let (total, total_overflowed) = saturating_add(stats.total_monthly, monthly);
        stats.total_monthly = total;

        let bucket = resolve_name(subscription.category_id, categories)
            .unwrap_or(UNCATEGORIZED_LABEL)
            .to_string();
        let entry = stats.by_category.entry(bucket).or_insert(Decimal::ZERO);
        let (subtotal, bucket_overflowed) = saturating_add(*entry, monthly);
        *entry = subtotal;

        overflowed |= total_overflowed || bucket_overflowed;
    }

    if overflowed {
        warn!("月額合計が表示可能な範囲を超えたため上限値で表示します");
    }

    stats
}

/// 月額合計の出所
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalSource {
    Server,
    Client,
}

/// 一覧画面に表示する概要
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyOverview {
    pub monthly_total: Decimal,
    pub yearly_total: Decimal,
    pub active_count: usize,
    pub source: TotalSource,
}

impl MonthlyOverview {
    /// サーバー集計があればそれを優先し、なければクライアント集計を使う
    ///
    /// サーバーの合計が10進数に変換できない場合や、年額が範囲を超える場合は
    /// クライアント集計を使う
    pub fn build(stats: &PortfolioStats, summary: Option<&ReportSummary>) -> Self {
        let server_totals = summary.and_then(|summary| {
            let monthly = Decimal::from_f64(summary.total_monthly)?;
            match monthly.checked_mul(MONTHS_PER_YEAR) {
                Some(yearly) => Some((monthly, yearly)),
                None => {
                    warn!(
                        "サーバー集計の年額が範囲を超えたため端末の集計を使います: {}",
                        summary.total_monthly
                    );
                    None
                }
            }
        });

        let (monthly_total, yearly_total, source) = match server_totals {
            Some((monthly, yearly)) => (monthly, yearly, TotalSource::Server),
            None => (stats.total_monthly, stats.yearly_total(), TotalSource::Client),
        };

        Self {
            monthly_total,
            yearly_total,
            active_count: stats.active_count,
            source,
        }
    }
}

/// サーバー集計とクライアント集計の照合結果
#[derive(Debug, Clone, PartialEq)]
pub enum SummaryCheck {
    Consistent,
    Diverged { server: Decimal, client: Decimal },
}

/// サーバー集計とクライアント集計を比較する
///
/// サーバーの値が数値に変換できない場合や差が計算できない場合も不一致として扱う
pub fn verify_summary(server: &ReportSummary, client: &PortfolioStats) -> SummaryCheck {
    let server_total = Decimal::from_f64(server.total_monthly);
    let difference = server_total.and_then(|total| total.checked_sub(client.total_monthly));

    match difference {
        Some(difference) if difference.abs() <= SUMMARY_TOLERANCE => SummaryCheck::Consistent,
        _ => {
            warn!(
                "サーバー集計とクライアント集計が一致しません: server={}, client={}",
                server.total_monthly, client.total_monthly
            );
            SummaryCheck::Diverged {
                server: server_total.unwrap_or(Decimal::ZERO),
                client: client.total_monthly,
            }
        }
    }
}
