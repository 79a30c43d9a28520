/// サブスクリプション機能モジュール
///
/// このモジュールは、サブスクリプション管理に関連する機能を提供します：
/// - サブスクリプションのデータモデルと追加フォームの検証
/// - 月額・年額換算
/// - APIサーバー経由でのサブスクリプション操作
pub mod api_commands;
pub mod billing;
pub mod models;

pub use billing::{monthly_equivalent, yearly_equivalent, MONTHS_PER_YEAR};
pub use models::{
    BillingPeriod, CategoryInput, CreateSubscriptionDto, Subscription, SubscriptionDraft,
};
