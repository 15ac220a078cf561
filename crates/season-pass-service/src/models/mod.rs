//! 赛季通行证领域模型
//!
//! 定义表（不可变）、玩家进度快照（只读镜像）、解析结果与领取请求。

pub mod catalog;
pub mod claim;
pub mod enums;
pub mod progression;
pub mod unclaimed;

// 重新导出常用类型
pub use catalog::{
    Catalog, CatalogVersion, ItemDefinition, ManifestDescriptor, ProgressionDefinition,
    ProgressionStep, RewardItem, SeasonDefinition, SeasonPassDefinition, level_threshold,
};
pub use claim::{ClaimRequest, ClaimResult, ClaimStatus, RefreshOutcome};
pub use enums::{ClassType, ItemVariant, MembershipType};
pub use progression::{
    CharacterProgressionState, CharacterSnapshot, CharacterSummary, ProgressionSnapshot,
    REWARD_STATE_CLAIMED,
};
pub use unclaimed::{DataIntegrityWarning, IntegrityIssue, Resolution, UnclaimedItem, UnclaimedKey};
