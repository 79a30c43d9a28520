//! コマンドラインインターフェース
//!
//! 各コマンドは保存済みのセッションからセッションゲートを開始し、
//! 一覧を再読み込みしてから操作を行い、結果をテキストで表示する。

pub mod commands;
pub mod render;

use crate::features::subscriptions::{BillingPeriod, CategoryInput, SubscriptionDraft};
use clap::{Args, Parser, Subcommand};

/// CLI引数
#[derive(Parser, Debug)]
#[command(name = "subscription-memo")]
#[command(version, about = "サブスクリプション管理クライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// サブコマンド
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// ユーザーIDでログインする（開発用ログイン）
    Login {
        /// ユーザーID（整数）
        user_id: String,
    },

    /// ログアウトする
    Logout,

    /// サブスクリプション一覧と月額合計を表示する
    List,

    /// サブスクリプションの詳細を表示する
    Show {
        /// サブスクリプションID
        id: i64,
    },

    /// サブスクリプションを追加する
    Add(AddArgs),

    /// サブスクリプションを削除する
    Delete {
        /// サブスクリプションID
        id: i64,
    },

    /// カテゴリー一覧を表示する
    Categories,

    /// カテゴリー別の集計を表示する
    Summary,
}

/// addコマンドの引数
#[derive(Args, Debug, Clone)]
pub struct AddArgs {
    /// サービス名
    #[arg(long)]
    pub name: String,

    /// 金額（例: 15.00）
    #[arg(long)]
    pub price: String,

    /// 支払いサイクル（monthly / yearly）
    #[arg(long, default_value = "monthly")]
    pub period: BillingPeriod,

    /// 次回支払日（YYYY-MM-DD）
    #[arg(long)]
    pub next_payment: String,

    /// カテゴリー名（存在しなければ作成される）
    #[arg(long, conflicts_with = "category_id")]
    pub category: Option<String>,

    /// 既存カテゴリーのID
    #[arg(long)]
    pub category_id: Option<i64>,
}

impl AddArgs {
    /// 追加フォームの入力内容に変換する
    pub fn to_draft(&self) -> SubscriptionDraft {
        let category = match (&self.category, self.category_id) {
            (_, Some(id)) => CategoryInput::Existing(id),
            (Some(name), None) => CategoryInput::Named(name.clone()),
            (None, None) => CategoryInput::None,
        };

        SubscriptionDraft {
            name: self.name.clone(),
            price: self.price.clone(),
            period: self.period,
            next_payment: self.next_payment.clone(),
            category,
        }
    }
}
