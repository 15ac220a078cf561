//! 领取请求与结果

use serde::Serialize;
use serde_json::Value;

use super::enums::MembershipType;
use crate::error::RewardError;

/// 领取请求
///
/// 字段名与平台 ClaimReward 接口一致
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimRequest {
    pub character_id: String,
    pub membership_type: MembershipType,
    pub reward_index: usize,
    pub season_hash: u32,
    pub progression_hash: u32,
}

/// 领取状态
#[derive(Debug, Clone)]
pub enum ClaimStatus {
    /// 平台确认领取，附带平台返回的结果
    Claimed(Value),
    /// 已被其他会话领取，按成功对账处理；携带平台返回的原因用于日志
    AlreadyClaimed(RewardError),
    Failed(RewardError),
}

impl ClaimStatus {
    /// 指标标签
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Claimed(_) => "claimed",
            Self::AlreadyClaimed(_) => "already_claimed",
            Self::Failed(RewardError::ClaimThresholdNotMet { .. }) => "threshold_not_met",
            Self::Failed(_) => "transport_failure",
        }
    }

    /// 奖励在服务端是否已处于领取状态
    pub fn is_reconciled(&self) -> bool {
        matches!(self, Self::Claimed(_) | Self::AlreadyClaimed(_))
    }
}

/// 领取后的刷新结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// 传输失败不刷新
    Skipped,
    Refreshed { items_remaining: usize },
    Failed { reason: String },
}

/// 单次领取的完整结果
#[derive(Debug, Clone)]
pub struct ClaimResult {
    pub request: ClaimRequest,
    pub status: ClaimStatus,
    pub refresh: RefreshOutcome,
}

impl ClaimResult {
    /// 可重试的失败转成 Err，便于调用方套用重试策略
    pub fn into_retryable(self) -> Result<ClaimResult, RewardError> {
        match self.status {
            ClaimStatus::Failed(err) if err.is_retryable() => Err(err),
            status => Ok(ClaimResult { status, ..self }),
        }
    }
}
