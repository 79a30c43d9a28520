use crate::features::store::SubscriptionSnapshot;

/// 表示中の画面
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    /// ログイン画面（セッション破棄時は通知文言を伴う）
    Unauthenticated { notice: Option<String> },
    /// サブスクリプション一覧
    List,
    /// サブスクリプション詳細（開いた時点のスナップショット）
    Detail(SubscriptionSnapshot),
    /// サブスクリプション追加フォーム
    Add,
}

impl Screen {
    pub fn name(&self) -> &'static str {
        match self {
            Screen::Unauthenticated { .. } => "ログイン",
            Screen::List => "一覧",
            Screen::Detail(_) => "詳細",
            Screen::Add => "追加",
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Screen::Unauthenticated { .. })
    }
}
