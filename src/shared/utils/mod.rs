use crate::shared::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// 月名の略称（表示用）
const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// サブスクリプション一覧の表示色（一覧での位置で循環して割り当てる）
pub const SUBSCRIPTION_COLORS: [&str; 7] = [
    "#6366f1", "#8b5cf6", "#ec4899", "#f59e0b", "#10b981", "#06b6d4", "#ef4444",
];

/// 一覧での位置から色インデックスを求める
pub fn color_index_for_position(position: usize) -> usize {
    position % SUBSCRIPTION_COLORS.len()
}

/// 色インデックスに対応する色コードを取得する
pub fn color_for_index(index: usize) -> &'static str {
    SUBSCRIPTION_COLORS[color_index_for_position(index)]
}

/// 日付文字列をパースする
///
/// # 引数
/// * `date_str` - 日付文字列（YYYY-MM-DD形式）
///
/// # バリデーション規則
/// - 空でないこと
/// - YYYY-MM-DD形式の実在する日付であること
/// - 1900年以降、2100年以前であること
pub fn parse_date(date_str: &str) -> AppResult<NaiveDate> {
    let date_str = date_str.trim();
    if date_str.is_empty() {
        return Err(AppError::validation("次回支払日を入力してください"));
    }

    let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::validation("日付はYYYY-MM-DD形式で入力してください"))?;

    if !(1900..=2100).contains(&date.year()) {
        return Err(AppError::validation(
            "日付は1900年から2100年の間で入力してください",
        ));
    }

    Ok(date)
}

/// 入力できる金額の上限（999,999.99）
pub const MAX_PRICE: Decimal = Decimal::from_parts(99_999_999, 0, 0, false, 2);

/// 金額の小数点以下の最大桁数
pub const PRICE_DECIMAL_PLACES: u32 = 2;

/// 金額文字列をパースする
///
/// 文字列のまま10進数として読み込むため、浮動小数点の丸め誤差は発生しない
///
/// # バリデーション規則
/// - 数値であること
/// - 0以上であること
/// - [`MAX_PRICE`] 以下であること
/// - 小数点以下は2桁まで（"15.00" のような末尾の0は許可）
pub fn parse_price(price_str: &str) -> AppResult<Decimal> {
    let price = Decimal::from_str(price_str.trim())
        .map_err(|_| AppError::validation("正しい金額を入力してください"))?;

    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::validation("金額は0以上で入力してください"));
    }

    if price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "金額は{}以下で入力してください",
            format_amount(MAX_PRICE)
        )));
    }

    if price.normalize().scale() > PRICE_DECIMAL_PLACES {
        return Err(AppError::validation("金額の小数点以下は2桁までで入力してください"));
    }

    Ok(price)
}

/// 必須フィールドのバリデーション
pub fn validate_required_field(text: &str, field_name: &str) -> AppResult<()> {
    if text.trim().is_empty() {
        return Err(AppError::validation(format!("{field_name}を入力してください")));
    }
    Ok(())
}

/// 文字列の長さバリデーション
pub fn validate_text_length(text: &str, max_length: usize, field_name: &str) -> AppResult<()> {
    let char_count = text.chars().count();
    if char_count > max_length {
        return Err(AppError::validation(format!(
            "{field_name}は{max_length}文字以内で入力してください（現在: {char_count}文字）"
        )));
    }
    Ok(())
}

/// 金額を表示用に整形する（小数点以下2桁、四捨五入）
///
/// 丸めは表示時のみ行い、集計には使わない
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// 通貨記号付きで金額を整形する
pub fn format_money(amount: Decimal, currency_symbol: &str) -> String {
    format!("{} {currency_symbol}", format_amount(amount))
}

/// 日付を表示用に整形する（例: "Jan 5, 2026"）
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} {}, {}",
        MONTH_ABBREVIATIONS[date.month0() as usize],
        date.day(),
        date.year()
    )
}
