//! 平台数据源 Trait 定义
//!
//! 核心组件依赖这些接口而非具体 HTTP 客户端，便于 mock 测试

use async_trait::async_trait;
use serde_json::Value;

use super::http::PlatformResult;
use super::wire::{ProfileResponse, UserMembershipData};
use crate::models::{ClaimRequest, ManifestDescriptor, MembershipType};

/// 定义表数据源
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// 拉取当前语言下的定义表清单
    async fn fetch_manifest(&self) -> PlatformResult<ManifestDescriptor>;

    /// 按清单拉取一张原始定义表（`hash 字符串 -> 记录`）
    async fn fetch_table(&self, manifest: &ManifestDescriptor, table: &str) -> PlatformResult<Value>;
}

/// 玩家进度数据源
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressionSource: Send + Sync {
    async fn fetch_profile(
        &self,
        membership_id: &str,
        membership_type: MembershipType,
    ) -> PlatformResult<ProfileResponse>;
}

/// 领取提交
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClaimSink: Send + Sync {
    /// 提交一次领取，返回平台的 Response 负载
    async fn submit_claim(&self, request: &ClaimRequest) -> PlatformResult<Value>;
}

/// 当前登录账号信息
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipSource: Send + Sync {
    async fn fetch_memberships(&self) -> PlatformResult<UserMembershipData>;
}
