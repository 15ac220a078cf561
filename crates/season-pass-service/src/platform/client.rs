//! 平台 HTTP 客户端
//!
//! 基于 reqwest 实现全部平台数据源接口。平台 API 请求经过会话层附加凭据，
//! 定义表内容主机是公开静态资源，不附加凭据。

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};
use season_shared::config::PlatformConfig;
use serde_json::Value;
use tracing::{debug, instrument};

use super::http::{
    MessageField, PlatformFailure, PlatformResult, interpret_response, unwrap_envelope,
    unwrap_envelope_payload,
};
use super::session::{SessionLayer, StaticSession};
use super::traits::{CatalogSource, ClaimSink, MembershipSource, ProgressionSource};
use super::wire::{ManifestRecord, ProfileResponse, UserMembershipData};
use crate::models::{ClaimRequest, ManifestDescriptor, MembershipType};

/// 档案组件：200 角色，202 角色进度
pub const PROFILE_COMPONENTS: &str = "200,202";

const MANIFEST_PATH: &str = "/Platform/Destiny2/Manifest/";
const CLAIM_REWARD_PATH: &str = "/Platform/Destiny2/Actions/Seasons/ClaimReward/";
const MEMBERSHIPS_PATH: &str = "/Platform/User/GetMembershipsForCurrentUser/";

/// 平台客户端
#[derive(Clone)]
pub struct PlatformClient {
    http: Client,
    base_url: String,
    content_base_url: String,
    language: String,
    session: Arc<dyn SessionLayer>,
}

impl PlatformClient {
    pub fn new(config: &PlatformConfig, session: Arc<dyn SessionLayer>) -> PlatformResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PlatformFailure::transport(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            content_base_url: config.content_base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            session,
        })
    }

    /// 使用配置中的静态凭据创建
    pub fn from_config(config: &PlatformConfig) -> PlatformResult<Self> {
        Self::new(config, Arc::new(StaticSession::from_config(config)))
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    fn platform_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn content_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.content_base_url, path)
        }
    }

    /// 发送请求并按统一规则解释响应
    async fn execute(
        &self,
        request: RequestBuilder,
        field: MessageField,
    ) -> PlatformResult<(u16, Value)> {
        let response = request.send().await?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        let value = interpret_response(
            status.as_u16(),
            &reason,
            content_type.as_deref(),
            &body,
            field,
        )?;
        Ok((status.as_u16(), value))
    }

    /// 平台 API 请求：附加会话并拆开信封
    async fn platform_call<T: serde::de::DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> PlatformResult<T> {
        let (status, envelope) = self
            .execute(self.session.apply(request), MessageField::Platform)
            .await?;
        unwrap_envelope(status, envelope)
    }
}

#[async_trait]
impl CatalogSource for PlatformClient {
    #[instrument(skip(self), fields(language = %self.language))]
    async fn fetch_manifest(&self) -> PlatformResult<ManifestDescriptor> {
        let record: ManifestRecord = self
            .platform_call(self.http.get(self.platform_url(MANIFEST_PATH)))
            .await?;

        let version = record.version.clone();
        let descriptor = record.into_descriptor(&self.language).ok_or_else(|| {
            PlatformFailure::decode(
                Some(200),
                format!("manifest {} has no tables for language '{}'", version, self.language),
            )
        })?;

        debug!(
            version = %descriptor.version,
            tables = descriptor.table_paths.len(),
            "Manifest fetched"
        );
        Ok(descriptor)
    }

    #[instrument(skip(self, manifest), fields(version = %manifest.version))]
    async fn fetch_table(&self, manifest: &ManifestDescriptor, table: &str) -> PlatformResult<Value> {
        let path = manifest.table_path(table).ok_or_else(|| {
            PlatformFailure::decode(None, format!("manifest has no path for table {}", table))
        })?;

        let (_, value) = self
            .execute(self.http.get(self.content_url(path)), MessageField::Content)
            .await?;
        Ok(value)
    }
}

#[async_trait]
impl ProgressionSource for PlatformClient {
    #[instrument(skip(self), fields(membership_type = %membership_type))]
    async fn fetch_profile(
        &self,
        membership_id: &str,
        membership_type: MembershipType,
    ) -> PlatformResult<ProfileResponse> {
        let url = self.platform_url(&format!(
            "/Platform/Destiny2/{}/Profile/{}/",
            membership_type, membership_id
        ));
        self.platform_call(self.http.get(url).query(&[("components", PROFILE_COMPONENTS)]))
            .await
    }
}

#[async_trait]
impl ClaimSink for PlatformClient {
    #[instrument(
        skip(self, request),
        fields(
            character_id = %request.character_id,
            progression_hash = request.progression_hash,
            reward_index = request.reward_index
        )
    )]
    async fn submit_claim(&self, request: &ClaimRequest) -> PlatformResult<Value> {
        let (status, envelope) = self
            .execute(
                self.session
                    .apply(self.http.post(self.platform_url(CLAIM_REWARD_PATH)).json(request)),
                MessageField::Platform,
            )
            .await?;

        // 领取结果的 Response 结构不固定，可能为 null，原样返回
        unwrap_envelope_payload(status, envelope)
    }
}

#[async_trait]
impl MembershipSource for PlatformClient {
    #[instrument(skip(self))]
    async fn fetch_memberships(&self) -> PlatformResult<UserMembershipData> {
        self.platform_call(self.http.get(self.platform_url(MEMBERSHIPS_PATH)))
            .await
    }
}
