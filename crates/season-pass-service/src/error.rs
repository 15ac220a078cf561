//! 赛季通行证服务错误类型
//!
//! 区分数据源不可用、领取失败分类和调用方输入错误。
//! 数据完整性问题（定义表缺项）不是错误，见 `models::DataIntegrityWarning`。

use thiserror::Error;

/// 赛季通行证服务错误类型
#[derive(Debug, Clone, Error)]
pub enum RewardError {
    // === 数据源错误 ===
    #[error("定义表不可用: {reason}")]
    CatalogUnavailable { reason: String },

    #[error("玩家进度不可用: {reason}")]
    ProgressionUnavailable { reason: String },

    #[error("账号成员信息不可用: {reason}")]
    MembershipUnavailable { reason: String },

    // === 领取错误 ===
    #[error("奖励已被领取: {message}")]
    ClaimAlreadyClaimed { message: String },

    #[error("奖励进度未达标: {message}")]
    ClaimThresholdNotMet { message: String },

    #[error("领取请求失败: {message}")]
    ClaimTransportFailure { status: Option<u16>, message: String },

    // === 调用方错误 ===
    #[error("进度轨道不属于任何赛季: progression_hash={0}")]
    SeasonNotFound(u32),

    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 赛季通行证服务 Result 类型别名
pub type Result<T> = std::result::Result<T, RewardError>;

impl RewardError {
    /// 检查是否为可重试的错误
    ///
    /// 数据源读取天然幂等；领取仅在传输层失败时可重试，服务端对重复领取幂等。
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CatalogUnavailable { .. }
                | Self::ProgressionUnavailable { .. }
                | Self::MembershipUnavailable { .. }
                | Self::ClaimTransportFailure { .. }
        )
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        matches!(
            self,
            Self::ClaimAlreadyClaimed { .. }
                | Self::ClaimThresholdNotMet { .. }
                | Self::SeasonNotFound(_)
                | Self::Validation(_)
        )
    }

    /// 获取错误码
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CatalogUnavailable { .. } => "CATALOG_UNAVAILABLE",
            Self::ProgressionUnavailable { .. } => "PROGRESSION_UNAVAILABLE",
            Self::MembershipUnavailable { .. } => "MEMBERSHIP_UNAVAILABLE",
            Self::ClaimAlreadyClaimed { .. } => "CLAIM_ALREADY_CLAIMED",
            Self::ClaimThresholdNotMet { .. } => "CLAIM_THRESHOLD_NOT_MET",
            Self::ClaimTransportFailure { .. } => "CLAIM_TRANSPORT_FAILURE",
            Self::SeasonNotFound(_) => "SEASON_NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
