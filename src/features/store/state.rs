use crate::features::auth::models::LogoutReason;
use crate::features::auth::session::SessionContext;
use crate::features::categories::{resolve_name, resolve_or_create, Category, CategoryResolution};
use crate::features::reports::{
    summarize, verify_summary, MonthlyOverview, PortfolioStats, ReportSummary,
};
use crate::features::store::remote::RemoteStore;
use crate::features::subscriptions::{CategoryInput, Subscription, SubscriptionDraft};
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::color_index_for_position;
use futures::future::try_join3;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// 削除APIが失敗したときの楽観的削除の扱い
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteFailurePolicy {
    /// 削除したままにする（次回の再読み込みで復元される）
    #[default]
    KeepRemoved,
    /// 元の位置に戻す
    Rollback,
}

/// 再読み込みの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// 取得結果を反映した
    Applied,
    /// より新しい再読み込みが先に反映されていたため破棄した
    Superseded,
    /// セッションがないため実行しなかった
    Skipped,
}

/// サブスクリプション追加の結果
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOutcome {
    pub subscription: Subscription,
    /// カテゴリー名を入力した場合の解決結果
    pub category: Option<CategoryResolution>,
    pub reload: ReloadOutcome,
}

/// 表示用に解決済みのサブスクリプション
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionSnapshot {
    pub subscription: Subscription,
    pub category_name: Option<String>,
    pub color_index: usize,
}

#[derive(Debug, Default)]
struct StoreState {
    subscriptions: Vec<Subscription>,
    categories: Vec<Category>,
    summary: Option<ReportSummary>,
    loading: bool,
    applied_generation: u64,
}

/// APIサーバーのデータを保持するクライアントストア
///
/// 一覧・カテゴリー・サマリーは最後に成功した再読み込みの内容を反映する。
/// 追加・削除の後は必ず再読み込みしてサーバーの状態に揃える。
pub struct ClientStore<R> {
    remote: R,
    session: SessionContext,
    state: Mutex<StoreState>,
    generation: AtomicU64,
    delete_policy: DeleteFailurePolicy,
}

impl<R: RemoteStore> ClientStore<R> {
    pub fn new(remote: R, session: SessionContext) -> Self {
        Self {
            remote,
            session,
            state: Mutex::new(StoreState::default()),
            generation: AtomicU64::new(0),
            delete_policy: DeleteFailurePolicy::default(),
        }
    }

    pub fn with_delete_policy(mut self, policy: DeleteFailurePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn delete_policy(&self) -> DeleteFailurePolicy {
        self.delete_policy
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// サブスクリプション・カテゴリー・サマリーを並行して再取得する
    ///
    /// いずれかが失敗した場合は何も置き換えず、セッションを破棄する。
    /// 後から発行された再読み込みが先に反映済みなら、この結果は破棄される。
    pub async fn reload(&self) -> AppResult<ReloadOutcome> {
        if !self.session.has_session() {
            debug!("セッションがないため再読み込みをスキップします");
            return Ok(ReloadOutcome::Skipped);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.lock().loading = true;
        debug!("再読み込み開始: generation={generation}");

        let fetched = try_join3(
            self.remote.list_subscriptions(),
            self.remote.list_categories(),
            self.remote.fetch_summary(),
        )
        .await;

        let outcome = self.apply_reload(generation, fetched);
        self.lock().loading = false;
        outcome
    }

    fn apply_reload(
        &self,
        generation: u64,
        fetched: AppResult<(Vec<Subscription>, Vec<Category>, ReportSummary)>,
    ) -> AppResult<ReloadOutcome> {
        let (subscriptions, categories, summary) = match fetched {
            Ok(data) => data,
            Err(e) => {
                error!("再読み込みに失敗しました: generation={generation}, error={e}");
                // 401はApiClient側でセッション破棄済み
                if !e.is_auth_fault() {
                    self.session.invalidate(LogoutReason::ReloadFailed);
                }
                return Err(e);
            }
        };

        let mut state = self.lock();
        if generation <= state.applied_generation {
            debug!(
                "古い再読み込み結果を破棄しました: generation={generation}, applied={}",
                state.applied_generation
            );
            return Ok(ReloadOutcome::Superseded);
        }

        verify_summary(&summary, &summarize(&subscriptions, &categories));

        info!(
            "再読み込み完了: subscriptions={}, categories={}",
            subscriptions.len(),
            categories.len()
        );
        state.subscriptions = subscriptions;
        state.categories = categories;
        state.summary = Some(summary);
        state.applied_generation = generation;
        Ok(ReloadOutcome::Applied)
    }

    /// サブスクリプションを追加する
    ///
    /// 入力の検証に失敗した場合はAPIサーバーへ何も送信しない。
    /// カテゴリー名が入力された場合は既存カテゴリーに対応付け、なければ作成する。
    pub async fn create_subscription(&self, draft: &SubscriptionDraft) -> AppResult<CreateOutcome> {
        let mut dto = draft.validate()?;

        let category = match draft.category.clone().normalized() {
            CategoryInput::Named(name) => {
                let categories = self.categories();
                let resolution = resolve_or_create(&name, &categories, &self.remote).await?;
                if let CategoryResolution::Created(created) = &resolution {
                    let mut state = self.lock();
                    if !state.categories.iter().any(|c| c.id == created.id) {
                        state.categories.push(created.clone());
                    }
                }
                dto.category_id = Some(resolution.id());
                Some(resolution)
            }
            _ => None,
        };

        let subscription = self.remote.create_subscription(&dto).await?;
        info!(
            "サブスクリプション作成成功: subscription_id={}, name={}",
            subscription.id, subscription.name
        );

        let reload = self.reload().await?;
        Ok(CreateOutcome {
            subscription,
            category,
            reload,
        })
    }

    /// サブスクリプションを削除する
    ///
    /// 一覧からは先に取り除き、削除成功後に再読み込みする。
    /// 失敗時の扱いはDeleteFailurePolicyに従い、再読み込みは行わない。
    pub async fn delete_subscription(&self, id: i64) -> AppResult<ReloadOutcome> {
        let removed = {
            let mut state = self.lock();
            let position = state
                .subscriptions
                .iter()
                .position(|subscription| subscription.id == id);
            let removed = position.map(|index| (index, state.subscriptions.remove(index)));
            removed
        };
        if removed.is_none() {
            warn!("一覧に存在しないサブスクリプションを削除します: subscription_id={id}");
        }

        match self.remote.delete_subscription(id).await {
            Ok(()) => {
                info!("サブスクリプション削除成功: subscription_id={id}");
                self.reload().await
            }
            Err(e) => {
                warn!("サブスクリプション削除に失敗しました: subscription_id={id}, error={e}");
                if self.delete_policy == DeleteFailurePolicy::Rollback {
                    self.restore(removed);
                }
                Err(e)
            }
        }
    }

    fn restore(&self, removed: Option<(usize, Subscription)>) {
        let Some((index, subscription)) = removed else {
            return;
        };
        let mut state = self.lock();
        if state.subscriptions.iter().any(|s| s.id == subscription.id) {
            return;
        }
        let index = index.min(state.subscriptions.len());
        debug!("削除を取り消しました: subscription_id={}", subscription.id);
        state.subscriptions.insert(index, subscription);
    }

    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.lock().subscriptions.clone()
    }

    pub fn categories(&self) -> Vec<Category> {
        self.lock().categories.clone()
    }

    pub fn summary(&self) -> Option<ReportSummary> {
        self.lock().summary.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().loading
    }

    /// クライアント側の集計
    pub fn portfolio_stats(&self) -> PortfolioStats {
        let state = self.lock();
        summarize(&state.subscriptions, &state.categories)
    }

    /// 一覧画面の概要（サーバー集計を優先）
    pub fn monthly_overview(&self) -> MonthlyOverview {
        let state = self.lock();
        let stats = summarize(&state.subscriptions, &state.categories);
        MonthlyOverview::build(&stats, state.summary.as_ref())
    }

    /// カテゴリー名と表示色を解決した一覧
    pub fn resolved_rows(&self) -> Vec<SubscriptionSnapshot> {
        let state = self.lock();
        state
            .subscriptions
            .iter()
            .enumerate()
            .map(|(position, subscription)| SubscriptionSnapshot {
                subscription: subscription.clone(),
                category_name: resolve_name(subscription.category_id, &state.categories)
                    .map(str::to_string),
                color_index: color_index_for_position(position),
            })
            .collect()
    }

    /// 詳細画面用のスナップショットを取得する
    pub fn snapshot_of(&self, id: i64) -> AppResult<SubscriptionSnapshot> {
        self.resolved_rows()
            .into_iter()
            .find(|row| row.subscription.id == id)
            .ok_or_else(|| AppError::not_found(format!("サブスクリプション(id={id})")))
    }
}
