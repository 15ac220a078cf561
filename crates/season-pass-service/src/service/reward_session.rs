//! 奖励会话
//!
//! 一次查看会话：固定一个游戏身份，持有定义表缓存和最近一次成功的解析结果。
//!
//! ## 刷新规则
//!
//! - 定义表与玩家进度并发拉取，两者都成功后才解析
//! - 任一失败时保留上一次的解析结果不变
//! - 每次刷新领取递增的序号，只有比已发布结果更新的刷新才会发布，
//!   慢返回的旧请求不会覆盖新结果
//! - 丢弃刷新 future 即放弃该次刷新，结果不会发布

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use season_shared::observability::metrics;
use tracing::{debug, info, instrument, warn};

use super::catalog_store::CatalogStore;
use super::membership::Membership;
use super::progression_client::ProgressionClient;
use super::resolver;
use crate::error::Result;
use crate::models::{Catalog, CatalogVersion, ProgressionSnapshot, Resolution};

/// 一次成功刷新得到的完整状态
#[derive(Debug)]
pub struct ResolvedState {
    pub catalog: Arc<Catalog>,
    pub snapshot: Arc<ProgressionSnapshot>,
    pub resolution: Resolution,
    ticket: u64,
}

impl ResolvedState {
    pub fn version(&self) -> &CatalogVersion {
        &self.catalog.version
    }

    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

pub struct RewardSession {
    catalog_store: Arc<CatalogStore>,
    progression: ProgressionClient,
    membership: Membership,
    state: ArcSwapOption<ResolvedState>,
    next_ticket: AtomicU64,
    /// 已发布结果的序号
    published: Mutex<u64>,
}

impl RewardSession {
    pub fn new(
        catalog_store: Arc<CatalogStore>,
        progression: ProgressionClient,
        membership: Membership,
    ) -> Self {
        Self {
            catalog_store,
            progression,
            membership,
            state: ArcSwapOption::empty(),
            next_ticket: AtomicU64::new(0),
            published: Mutex::new(0),
        }
    }

    pub fn membership(&self) -> &Membership {
        &self.membership
    }

    pub fn catalog_store(&self) -> &Arc<CatalogStore> {
        &self.catalog_store
    }

    /// 最近一次发布的状态
    pub fn current(&self) -> Option<Arc<ResolvedState>> {
        self.state.load_full()
    }

    /// 并发拉取定义表和玩家进度后重新解析
    #[instrument(skip(self), fields(membership_id = %self.membership.membership_id))]
    pub async fn refresh(&self) -> Result<Arc<ResolvedState>> {
        let ticket = self.take_ticket();

        let (catalog, snapshot) = tokio::try_join!(
            self.catalog_store.load(),
            self.progression.fetch_progression(
                &self.membership.membership_id,
                self.membership.membership_type
            )
        )?;

        Ok(self.resolve_and_publish(ticket, catalog, snapshot))
    }

    /// 只重新拉取玩家进度，沿用已缓存的定义表
    ///
    /// 尚无定义表缓存时退化为完整刷新
    #[instrument(skip(self), fields(membership_id = %self.membership.membership_id))]
    pub async fn refresh_progression(&self) -> Result<Arc<ResolvedState>> {
        let Some(catalog) = self.catalog_store.cached() else {
            return self.refresh().await;
        };

        let ticket = self.take_ticket();
        let snapshot = self
            .progression
            .fetch_progression(&self.membership.membership_id, self.membership.membership_type)
            .await?;

        Ok(self.resolve_and_publish(ticket, catalog, snapshot))
    }

    /// 丢弃定义表缓存；已发布的解析结果保持不变
    pub async fn invalidate_catalog(&self) {
        self.catalog_store.invalidate().await;
    }

    fn take_ticket(&self) -> u64 {
        self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn resolve_and_publish(
        &self,
        ticket: u64,
        catalog: Arc<Catalog>,
        snapshot: ProgressionSnapshot,
    ) -> Arc<ResolvedState> {
        let resolution = resolver::resolve(&catalog, &snapshot);

        for warning in &resolution.warnings {
            warn!(
                code = warning.code(),
                progression_hash = warning.progression_hash,
                "{}",
                warning
            );
        }
        metrics::record_resolution(resolution.items.len(), resolution.warnings.len());

        let state = Arc::new(ResolvedState {
            catalog,
            snapshot: Arc::new(snapshot),
            resolution,
            ticket,
        });

        let mut published = self.published.lock();
        if ticket > *published {
            *published = ticket;
            self.state.store(Some(state.clone()));
            info!(
                version = %state.version(),
                characters = state.snapshot.characters.len(),
                unclaimed = state.resolution.items.len(),
                warnings = state.resolution.warnings.len(),
                "未领取奖励已解析"
            );
        } else {
            debug!(ticket, published = *published, "丢弃过期的刷新结果");
        }

        state
    }
}
