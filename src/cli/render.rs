/// テキスト表示
use crate::features::categories::Category;
use crate::features::reports::{MonthlyOverview, PortfolioStats, ReportSummary, TotalSource};
use crate::features::store::SubscriptionSnapshot;
use crate::shared::config::DisplayConfig;
use crate::shared::utils::{color_for_index, format_date, format_money};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::fmt::Write;

const NO_CATEGORY: &str = "カテゴリーなし";

/// 一覧画面
pub fn render_list(
    rows: &[SubscriptionSnapshot],
    overview: &MonthlyOverview,
    display: &DisplayConfig,
) -> String {
    let symbol = display.currency_symbol.as_str();
    let mut out = String::new();

    let _ = writeln!(out, "月額合計: {}", format_money(overview.monthly_total, symbol));
    let _ = writeln!(out, "年額合計: {}", format_money(overview.yearly_total, symbol));
    let _ = writeln!(out, "登録数: {}", overview.active_count);
    if overview.source == TotalSource::Client {
        let _ = writeln!(out, "（サーバー集計なし。端末で計算した値を表示しています）");
    }
    let _ = writeln!(out);

    if rows.is_empty() {
        let _ = writeln!(out, "サブスクリプションはまだありません");
        return out;
    }

    for row in rows {
        let subscription = &row.subscription;
        let _ = writeln!(
            out,
            "[{}] #{} {}  {}/{}  {}  次回: {}",
            color_for_index(row.color_index),
            subscription.id,
            subscription.name,
            format_money(subscription.price, symbol),
            subscription.period.unit_label(),
            row.category_name.as_deref().unwrap_or(NO_CATEGORY),
            format_date(subscription.next_payment)
        );
    }
    out
}

/// 詳細画面
pub fn render_detail(snapshot: &SubscriptionSnapshot, display: &DisplayConfig) -> String {
    let symbol = display.currency_symbol.as_str();
    let subscription = &snapshot.subscription;
    let mut out = String::new();

    let _ = writeln!(out, "{} (#{})", subscription.name, subscription.id);
    let _ = writeln!(
        out,
        "  金額: {}/{}",
        format_money(subscription.price, symbol),
        subscription.period.unit_label()
    );
    let _ = writeln!(
        out,
        "  月額換算: {}",
        format_money(subscription.monthly_equivalent(), symbol)
    );
    let _ = writeln!(
        out,
        "  年額換算: {}",
        format_money(subscription.yearly_equivalent(), symbol)
    );
    let _ = writeln!(
        out,
        "  カテゴリー: {}",
        snapshot.category_name.as_deref().unwrap_or(NO_CATEGORY)
    );
    let _ = writeln!(out, "  次回支払日: {}", format_date(subscription.next_payment));
    if let Some(created) = subscription.created_date() {
        let _ = writeln!(out, "  登録日: {}", format_date(created));
    }
    let _ = writeln!(out, "  表示色: {}", color_for_index(snapshot.color_index));
    out
}

/// カテゴリー一覧と追加候補
pub fn render_categories(categories: &[Category], suggestions: &[&str]) -> String {
    let mut out = String::new();

    if categories.is_empty() {
        let _ = writeln!(out, "カテゴリーはまだありません");
    }
    for category in categories {
        let _ = writeln!(out, "#{} {}", category.id, category.name);
    }
    if !suggestions.is_empty() {
        let _ = writeln!(out, "候補: {}", suggestions.join(", "));
    }
    out
}

/// カテゴリー別集計
///
/// サーバー集計がある場合はその小計を、なければ端末での計算結果を表示する
pub fn render_summary(
    stats: &PortfolioStats,
    summary: Option<&ReportSummary>,
    display: &DisplayConfig,
) -> String {
    let symbol = display.currency_symbol.as_str();
    let overview = MonthlyOverview::build(stats, summary);
    let mut out = String::new();

    let _ = writeln!(out, "月額合計: {}", format_money(overview.monthly_total, symbol));
    let _ = writeln!(out, "年額合計: {}", format_money(overview.yearly_total, symbol));

    let buckets: Vec<(String, Decimal)> = match summary {
        Some(summary) => summary
            .by_category
            .iter()
            .filter_map(|(name, amount)| Decimal::from_f64(*amount).map(|a| (name.clone(), a)))
            .collect(),
        None => stats
            .by_category
            .iter()
            .map(|(name, amount)| (name.clone(), *amount))
            .collect(),
    };

    for (name, amount) in buckets {
        let _ = writeln!(out, "  {name}: {}", format_money(amount, symbol));
    }
    out
}
