//! 业务服务层
//!
//! - `catalog_store`: 定义表缓存
//! - `progression_client`: 玩家进度拉取
//! - `resolver`: 未领取奖励解析（纯函数）
//! - `categorizer`: 分组与排序
//! - `overview`: 按变体拆分的总览
//! - `reward_session`: 组合以上组件的查看会话
//! - `claim_orchestrator`: 领取与领取后刷新
//! - `membership`: 当前账号的游戏身份选择

pub mod catalog_store;
pub mod categorizer;
pub mod claim_orchestrator;
pub mod membership;
pub mod overview;
pub mod progression_client;
pub mod resolver;
pub mod reward_session;

pub use catalog_store::CatalogStore;
pub use categorizer::{CategoryGroup, categorize, categorize_by};
pub use claim_orchestrator::{ClaimOrchestrator, classify_failure};
pub use membership::{Membership, fetch_membership, select_membership};
pub use overview::{RewardOverview, VariantSection};
pub use progression_client::ProgressionClient;
pub use resolver::resolve;
pub use reward_session::{ResolvedState, RewardSession};
