use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::{parse_date, parse_price, validate_required_field, validate_text_length};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// サービス名の最大文字数
pub const MAX_NAME_LENGTH: usize = 100;

/// 支払いサイクル（月額・年額の2種類のみ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Monthly,
    Yearly,
}

impl BillingPeriod {
    /// APIで使用する文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "monthly",
            BillingPeriod::Yearly => "yearly",
        }
    }

    /// 金額の後ろに付ける単位（例: "/月"）
    pub fn unit_label(&self) -> &'static str {
        match self {
            BillingPeriod::Monthly => "月",
            BillingPeriod::Yearly => "年",
        }
    }
}

impl fmt::Display for BillingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BillingPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "monthly" => Ok(BillingPeriod::Monthly),
            "yearly" => Ok(BillingPeriod::Yearly),
            other => Err(AppError::validation(format!(
                "支払いサイクルはmonthlyまたはyearlyで指定してください: {other}"
            ))),
        }
    }
}

/// サブスクリプションデータモデル（APIサーバーのレスポンス）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Subscription {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>, // カテゴリーID（存在しない場合は未分類として扱う）
    pub name: String,
    pub price: Decimal, // 文字列で送受信される10進数
    pub period: BillingPeriod,
    pub next_payment: NaiveDate, // YYYY-MM-DD形式
    pub created_at: String,      // サーバーが付与する作成日時
}

impl Subscription {
    /// 作成日（created_atの日付部分）を取得する
    pub fn created_date(&self) -> Option<NaiveDate> {
        self.created_at
            .get(..10)
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
    }
}

/// サブスクリプション作成用DTO
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CreateSubscriptionDto {
    pub name: String,
    pub price: Decimal,
    pub period: BillingPeriod,
    pub next_payment: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// 追加フォームでのカテゴリー指定
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryInput {
    /// カテゴリーなし
    #[default]
    None,
    /// 既存カテゴリーのIDを選択した
    Existing(i64),
    /// カテゴリー名を入力した（存在しなければ作成される）
    Named(String),
}

impl CategoryInput {
    /// 空白のみの名前を「カテゴリーなし」に正規化する
    pub fn normalized(self) -> Self {
        match self {
            CategoryInput::Named(name) if name.trim().is_empty() => CategoryInput::None,
            CategoryInput::Named(name) => CategoryInput::Named(name.trim().to_string()),
            other => other,
        }
    }
}

/// 追加フォームの入力内容（未検証）
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionDraft {
    pub name: String,
    pub price: String,
    pub period: BillingPeriod,
    pub next_payment: String,
    pub category: CategoryInput,
}

impl SubscriptionDraft {
    /// 入力内容を検証して作成用DTOに変換する
    ///
    /// カテゴリー名の解決はここでは行わない（category_idは既存ID指定時のみ設定される）
    pub fn validate(&self) -> AppResult<CreateSubscriptionDto> {
        validate_required_field(&self.name, "サービス名")?;
        validate_text_length(self.name.trim(), MAX_NAME_LENGTH, "サービス名")?;
        let price = parse_price(&self.price)?;
        let next_payment = parse_date(&self.next_payment)?;

        let category_id = match &self.category {
            CategoryInput::Existing(id) => Some(*id),
            _ => None,
        };

        Ok(CreateSubscriptionDto {
            name: self.name.trim().to_string(),
            price,
            period: self.period,
            next_payment,
            category_id,
        })
    }
}

/// 削除APIのレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteSubscriptionResponse {
    pub ok: bool,
}
