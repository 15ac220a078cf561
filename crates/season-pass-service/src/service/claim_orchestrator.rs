//! 奖励领取编排
//!
//! 每次调用只提交一次领取，不合并、不去重、不静默重试。
//! 本地从不乐观地把奖励标记为已领取，领取后的状态一律以重新拉取的服务端数据为准：
//!
//! - 领取成功 / 已被其他会话领取：重新拉取玩家进度
//! - 进度未达标（本地数据过期）：丢弃定义表缓存后完整刷新
//! - 传输或服务端失败：不刷新，作为可重试错误交给调用方

use std::sync::Arc;

use season_shared::config::ClaimConfig;
use season_shared::observability::metrics;
use tracing::{info, instrument, warn};

use super::reward_session::{ResolvedState, RewardSession};
use crate::error::{Result, RewardError};
use crate::models::{ClaimRequest, ClaimResult, ClaimStatus, RefreshOutcome, UnclaimedKey};
use crate::platform::{ClaimSink, FailureKind, PlatformFailure};

pub struct ClaimOrchestrator {
    sink: Arc<dyn ClaimSink>,
    session: Arc<RewardSession>,
    config: ClaimConfig,
}

impl ClaimOrchestrator {
    pub fn new(sink: Arc<dyn ClaimSink>, session: Arc<RewardSession>, config: ClaimConfig) -> Self {
        Self {
            sink,
            session,
            config,
        }
    }

    pub fn session(&self) -> &Arc<RewardSession> {
        &self.session
    }

    /// 根据定义表构建领取请求
    ///
    /// seasonHash 取自轨道所属赛季；轨道不属于任何赛季时返回 `SeasonNotFound`
    pub async fn request_for(
        &self,
        character_id: &str,
        progression_hash: u32,
        reward_index: usize,
    ) -> Result<ClaimRequest> {
        if character_id.trim().is_empty() {
            return Err(RewardError::Validation("character_id 不能为空".to_string()));
        }

        let store = self.session.catalog_store();
        let catalog = match store.cached() {
            Some(catalog) => catalog,
            None => store.load().await?,
        };

        let season = catalog
            .season_for_progression(progression_hash)
            .ok_or(RewardError::SeasonNotFound(progression_hash))?;

        Ok(ClaimRequest {
            character_id: character_id.to_string(),
            membership_type: self.session.membership().membership_type,
            reward_index,
            season_hash: season.hash,
            progression_hash,
        })
    }

    /// 提交一次领取并按结果刷新
    #[instrument(
        skip(self, request),
        fields(
            character_id = %request.character_id,
            progression_hash = request.progression_hash,
            reward_index = request.reward_index
        )
    )]
    pub async fn claim(&self, request: ClaimRequest) -> ClaimResult {
        let status = match self.sink.submit_claim(&request).await {
            Ok(payload) => ClaimStatus::Claimed(payload),
            Err(failure) => classify_failure(&self.config, failure),
        };
        metrics::record_claim(status.outcome());

        let refresh = match &status {
            ClaimStatus::Claimed(_) => {
                info!("领取成功，重新拉取玩家进度");
                let refreshed = self.session.refresh_progression().await;
                self.refresh_outcome(&request, refreshed)
            }
            ClaimStatus::AlreadyClaimed(reason) => {
                info!(reason = %reason, "奖励已在其他会话领取，重新拉取玩家进度");
                let refreshed = self.session.refresh_progression().await;
                self.refresh_outcome(&request, refreshed)
            }
            ClaimStatus::Failed(RewardError::ClaimThresholdNotMet { message }) => {
                warn!(message = %message, "进度未达标，本地数据可能已过期，完整刷新");
                self.session.invalidate_catalog().await;
                let refreshed = self.session.refresh().await;
                self.refresh_outcome(&request, refreshed)
            }
            ClaimStatus::Failed(err) => {
                warn!(error = %err, "领取失败，可重试");
                RefreshOutcome::Skipped
            }
        };

        ClaimResult {
            request,
            status,
            refresh,
        }
    }

    fn refresh_outcome(
        &self,
        request: &ClaimRequest,
        refreshed: Result<Arc<ResolvedState>>,
    ) -> RefreshOutcome {
        match refreshed {
            Ok(state) => {
                let key = UnclaimedKey {
                    character_id: request.character_id.clone(),
                    progression_hash: request.progression_hash,
                    reward_item_index: request.reward_index,
                };
                if state.resolution.contains(&key) {
                    // 服务端尚未反映领取结果，保留条目等待下次刷新
                    warn!("刷新后奖励仍显示为未领取");
                }
                RefreshOutcome::Refreshed {
                    items_remaining: state.resolution.items.len(),
                }
            }
            Err(e) => {
                warn!(error = %e, "领取后刷新失败，保留上次解析结果");
                RefreshOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// 按配置的关键字把平台失败归类
///
/// 未收到响应的失败一律视为传输失败
pub fn classify_failure(config: &ClaimConfig, failure: PlatformFailure) -> ClaimStatus {
    if failure.kind != FailureKind::Transport {
        if failure.mentions(&config.already_claimed_markers) {
            return ClaimStatus::AlreadyClaimed(RewardError::ClaimAlreadyClaimed {
                message: failure.describe(),
            });
        }
        if failure.mentions(&config.threshold_markers) {
            return ClaimStatus::Failed(RewardError::ClaimThresholdNotMet {
                message: failure.describe(),
            });
        }
    }

    ClaimStatus::Failed(RewardError::ClaimTransportFailure {
        status: failure.status,
        message: failure.describe(),
    })
}
