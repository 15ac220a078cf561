//! 赛季通行证奖励服务
//!
//! 查看玩家已获得但未领取的赛季通行证奖励，并提交领取。
//!
//! ## 核心功能
//!
//! - **定义表缓存**：按版本缓存进度轨道、物品、赛季定义，版本变化时整体失效
//! - **进度拉取**：实时读取各角色的赛季轨道进度与已领取状态
//! - **未领取解析**：对比定义表与进度，计算已达门槛但未领取的奖励
//! - **分组排序**：按变体（货币、材料、物品）分组并确定性排序
//! - **领取编排**：提交领取、归类失败原因，并以服务端数据刷新本地状态
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `platform`: 游戏平台接入层
//! - `service`: 业务服务层
//! - `cli`: 命令行入口

pub mod cli;
pub mod error;
pub mod models;
pub mod platform;
pub mod service;

pub use error::{Result, RewardError};
pub use models::*;
pub use platform::{
    CatalogSource, ClaimSink, MembershipSource, PlatformClient, PlatformFailure,
    ProgressionSource, SessionLayer, StaticSession,
};
pub use service::{
    CatalogStore, CategoryGroup, ClaimOrchestrator, Membership, ProgressionClient,
    ResolvedState, RewardOverview, RewardSession, categorize, categorize_by, resolve,
};
