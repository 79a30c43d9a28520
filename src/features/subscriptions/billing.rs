/// 金額の正規化（月額換算・年額換算）
///
/// 価格は10進数のまま扱い、丸めは表示時にのみ行う。
use super::models::{BillingPeriod, Subscription};
use rust_decimal::Decimal;

/// 1年あたりの月数
pub const MONTHS_PER_YEAR: Decimal = Decimal::from_parts(12, 0, 0, false, 0);

/// 月額換算額を計算する
///
/// 月額はそのまま、年額は12で割る
pub fn monthly_equivalent(price: Decimal, period: BillingPeriod) -> Decimal {
    match period {
        BillingPeriod::Monthly => price,
        BillingPeriod::Yearly => price / MONTHS_PER_YEAR,
    }
}

/// 年額換算額を計算する
///
/// 年額はそのまま、月額は12倍する。
/// 12倍が `Decimal` の範囲を超える場合は `Decimal::MAX` に丸める
pub fn yearly_equivalent(price: Decimal, period: BillingPeriod) -> Decimal {
    match period {
        BillingPeriod::Monthly => price.checked_mul(MONTHS_PER_YEAR).unwrap_or(Decimal::MAX),
        BillingPeriod::Yearly => price,
    }
}

impl Subscription {
    /// このサブスクリプションの月額換算額
    pub fn monthly_equivalent(&self) -> Decimal {
        monthly_equivalent(self.price, self.period)
    }

    /// このサブスクリプションの年額換算額
    pub fn yearly_equivalent(&self) -> Decimal {
        yearly_equivalent(self.price, self.period)
    }
}
