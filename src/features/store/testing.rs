//! テスト用のインメモリRemoteStore
//!
//! APIサーバーと同じ集計ロジックでサマリーを返し、呼び出し履歴を記録する。
//! 操作ごとに失敗を注入でき、401の場合はApiClientと同様にセッションを破棄する。

use crate::features::auth::models::LogoutReason;
use crate::features::auth::session::SessionContext;
use crate::features::categories::Category;
use crate::features::reports::{summarize, ReportSummary};
use crate::features::store::remote::RemoteStore;
use crate::features::subscriptions::{CreateSubscriptionDto, Subscription};
use crate::shared::errors::{AppError, AppResult};
use rust_decimal::prelude::ToPrimitive;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;

/// 注入する失敗の種類
#[derive(Debug, Clone)]
pub enum MockFailure {
    Unauthorized,
    Server(u16, String),
}

#[derive(Default)]
struct MockState {
    subscriptions: Vec<Subscription>,
    categories: Vec<Category>,
    next_id: i64,
    calls: Vec<String>,
    failures: HashMap<&'static str, MockFailure>,
    list_gates: VecDeque<oneshot::Receiver<()>>,
}

#[derive(Default)]
pub struct MockRemote {
    state: Mutex<MockState>,
    session: Option<SessionContext>,
}

pub const USER_ID: i64 = 1;

impl MockRemote {
    pub fn new() -> Self {
        let remote = Self::default();
        remote.lock().next_id = 100;
        remote
    }

    /// 401注入時に破棄するセッションを設定する
    pub fn with_session(mut self, session: SessionContext) -> Self {
        self.session = Some(session);
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    pub fn seed_category(&self, id: i64, name: &str) -> Category {
        let category = Category {
            id,
            user_id: USER_ID,
            name: name.to_string(),
        };
        self.lock().categories.push(category.clone());
        category
    }

    pub fn seed_subscription(&self, subscription: Subscription) {
        self.lock().subscriptions.push(subscription);
    }

    /// 操作名（"list_subscriptions" など）に失敗を注入する
    pub fn fail(&self, operation: &'static str, failure: MockFailure) {
        self.lock().failures.insert(operation, failure);
    }

    pub fn recover(&self, operation: &'static str) {
        self.lock().failures.remove(operation);
    }

    /// 次のlist_subscriptions呼び出しを、返されたSenderが送信されるまで保留する
    ///
    /// データは保留前に確定するため、古い一覧を遅れて返す状況を再現できる
    pub fn hold_next_list(&self) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        self.lock().list_gates.push_back(receiver);
        sender
    }

    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.lock().subscriptions.clone()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.lock().categories.clone()
    }

    fn record(&self, call: String, operation: &'static str) -> AppResult<()> {
        let failure = {
            let mut state = self.lock();
            state.calls.push(call);
            state.failures.get(operation).cloned()
        };

        match failure {
            None => Ok(()),
            Some(MockFailure::Unauthorized) => {
                if let Some(session) = &self.session {
                    session.invalidate(LogoutReason::Unauthorized);
                }
                Err(AppError::Unauthorized)
            }
            Some(MockFailure::Server(status, message)) => Err(AppError::Remote { status, message }),
        }
    }
}

impl RemoteStore for MockRemote {
    async fn list_subscriptions(&self) -> AppResult<Vec<Subscription>> {
        self.record("list_subscriptions".to_string(), "list_subscriptions")?;

        let (snapshot, gate) = {
            let mut state = self.lock();
            (state.subscriptions.clone(), state.list_gates.pop_front())
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(snapshot)
    }

    async fn create_subscription(&self, dto: &CreateSubscriptionDto) -> AppResult<Subscription> {
        self.record(
            format!("create_subscription:{}:{:?}", dto.name, dto.category_id),
            "create_subscription",
        )?;

        let mut state = self.lock();
        state.next_id += 1;
        let subscription = Subscription {
            id: state.next_id,
            user_id: USER_ID,
            category_id: dto.category_id,
            name: dto.name.clone(),
            price: dto.price,
            period: dto.period,
            next_payment: dto.next_payment,
            created_at: "2026-10-19T09:00:00".to_string(),
        };
        state.subscriptions.push(subscription.clone());
        Ok(subscription)
    }

    async fn delete_subscription(&self, id: i64) -> AppResult<()> {
        self.record(format!("delete_subscription:{id}"), "delete_subscription")?;

        let mut state = self.lock();
        let before = state.subscriptions.len();
        state.subscriptions.retain(|subscription| subscription.id != id);
        if state.subscriptions.len() == before {
            return Err(AppError::Remote {
                status: 404,
                message: "Subscription not found".to_string(),
            });
        }
        Ok(())
    }

    async fn list_categories(&self) -> AppResult<Vec<Category>> {
        self.record("list_categories".to_string(), "list_categories")?;
        Ok(self.categories())
    }

    async fn create_category(&self, name: &str) -> AppResult<Category> {
        self.record(format!("create_category:{name}"), "create_category")?;

        let mut state = self.lock();
        state.next_id += 1;
        let category = Category {
            id: state.next_id,
            user_id: USER_ID,
            name: name.to_string(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn fetch_summary(&self) -> AppResult<ReportSummary> {
        self.record("fetch_summary".to_string(), "fetch_summary")?;

        let state = self.lock();
        let stats = summarize(&state.subscriptions, &state.categories);
        Ok(ReportSummary {
            total_monthly: stats.total_monthly.to_f64().unwrap_or_default(),
            by_category: stats
                .by_category
                .into_iter()
                .map(|(name, amount)| (name, amount.to_f64().unwrap_or_default()))
                .collect(),
        })
    }
}
