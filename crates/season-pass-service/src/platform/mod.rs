//! 游戏平台接入层
//!
//! - `traits`: 数据源接口（定义表、玩家进度、领取、账号）
//! - `client`: reqwest 实现
//! - `http`: 统一的响应解释规则
//! - `session`: 凭据附加
//! - `wire`: 平台 JSON 结构

pub mod client;
pub mod http;
pub mod session;
pub mod traits;
pub mod wire;

pub use client::PlatformClient;
pub use http::{FailureKind, MessageField, PlatformFailure, PlatformResult};
pub use session::{SessionLayer, StaticSession};
pub use traits::{CatalogSource, ClaimSink, MembershipSource, ProgressionSource};
