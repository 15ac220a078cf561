//! 共享库
//!
//! 包含所有二进制共用的配置、可观测性和重试策略等基础设施代码。

pub mod config;
pub mod observability;
pub mod retry;
