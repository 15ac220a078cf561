//! 命令执行器
//!
//! 负责执行各 CLI 子命令的具体逻辑：组装平台客户端、会话和领取编排，
//! 对只读请求套用调用方重试策略，并把结果输出到 stdout（日志走 stderr）。

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use season_shared::config::AppConfig;
use season_shared::retry::{RetryPolicy, retry_with_policy};

use super::commands::{GroupBy, MembershipArgs};
use crate::error::RewardError;
use crate::models::{
    ClaimRequest, ClaimResult, ClaimStatus, DataIntegrityWarning, ItemVariant, MembershipType,
    RefreshOutcome, UnclaimedItem,
};
use crate::platform::PlatformClient;
use crate::service::{
    CatalogStore, CategoryGroup, ClaimOrchestrator, Membership, ProgressionClient, ResolvedState,
    RewardOverview, RewardSession, categorize_by, fetch_membership,
};

/// 命令执行器
pub struct CommandRunner {
    config: AppConfig,
    client: Arc<PlatformClient>,
}

impl CommandRunner {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = PlatformClient::from_config(&config.platform)
            .context("创建平台客户端失败")?;
        Ok(Self {
            config,
            client: Arc::new(client),
        })
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.config.retry.policy()
    }

    /// 执行 list 命令
    pub async fn run_list(&self, args: MembershipArgs, group_by: GroupBy, json: bool) -> Result<()> {
        let session = self.open_session(args).await?;
        let state = self.refresh(&session).await?;

        let output = ListOutput::new(session.membership(), &state, group_by);
        if json {
            print_json(&output)?;
        } else {
            print_list(&output);
        }
        Ok(())
    }

    /// 执行 claim 命令
    pub async fn run_claim(
        &self,
        args: MembershipArgs,
        character_id: &str,
        progression_hash: u32,
        reward_index: usize,
        retry: bool,
        json: bool,
    ) -> Result<()> {
        let session = Arc::new(self.open_session(args).await?);
        // 先建立一次解析结果，领取后的刷新以它为基线
        self.refresh(&session).await?;

        let orchestrator = ClaimOrchestrator::new(
            self.client.clone(),
            session.clone(),
            self.config.claim.clone(),
        );
        let request = orchestrator
            .request_for(character_id, progression_hash, reward_index)
            .await?;

        info!(
            character_id = %request.character_id,
            progression_hash = request.progression_hash,
            reward_index = request.reward_index,
            season_hash = request.season_hash,
            "提交领取"
        );

        let result = if retry {
            // 领取在服务端幂等，传输失败可安全重试
            let orchestrator = &orchestrator;
            retry_with_policy(
                &self.retry_policy(),
                "claim_reward",
                RewardError::is_retryable,
                || {
                    let request = request.clone();
                    async move { orchestrator.claim(request).await.into_retryable() }
                },
            )
            .await?
        } else {
            orchestrator.claim(request).await
        };

        let output = ClaimOutput::from(&result);
        if json {
            print_json(&output)?;
        } else {
            print_claim(&output);
        }

        match result.status {
            ClaimStatus::Failed(err) => Err(err.into()),
            ClaimStatus::Claimed(_) | ClaimStatus::AlreadyClaimed(_) => Ok(()),
        }
    }

    /// 执行 membership 命令
    pub async fn run_membership(&self, json: bool) -> Result<()> {
        let membership = self.discover_membership().await?;
        if json {
            print_json(&membership)?;
        } else {
            println!(
                "{} ({} {})",
                membership.display_name,
                membership.membership_type.name(),
                membership.membership_id
            );
        }
        Ok(())
    }

    async fn discover_membership(&self) -> Result<Membership> {
        let client = self.client.as_ref();
        let membership = retry_with_policy(
            &self.retry_policy(),
            "fetch_membership",
            RewardError::is_retryable,
            || fetch_membership(client),
        )
        .await?;
        Ok(membership)
    }

    async fn open_session(&self, args: MembershipArgs) -> Result<RewardSession> {
        let membership = match (args.membership_id, args.membership_type) {
            (Some(id), Some(ty)) => Membership::new(id, MembershipType(ty)),
            (None, None) => self.discover_membership().await?,
            _ => bail!("--membership-id 与 --membership-type 必须同时指定"),
        };

        Ok(RewardSession::new(
            Arc::new(CatalogStore::new(self.client.clone())),
            ProgressionClient::new(self.client.clone()),
            membership,
        ))
    }

    async fn refresh(&self, session: &RewardSession) -> Result<Arc<ResolvedState>> {
        let state = retry_with_policy(
            &self.retry_policy(),
            "refresh_rewards",
            RewardError::is_retryable,
            || session.refresh(),
        )
        .await?;
        Ok(state)
    }
}

// ==================== 输出 ====================

/// list 命令的分组结果
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Grouping {
    Overview(RewardOverview),
    Seasons(BTreeMap<String, CategoryGroup>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListOutput {
    membership: Membership,
    catalog_version: String,
    fetched_at: DateTime<Utc>,
    total: usize,
    groups: Grouping,
    warnings: Vec<DataIntegrityWarning>,
}

impl ListOutput {
    fn new(membership: &Membership, state: &ResolvedState, group_by: GroupBy) -> Self {
        let items = &state.resolution.items;
        let groups = match group_by {
            GroupBy::Category => Grouping::Overview(RewardOverview::build(items)),
            GroupBy::Season => Grouping::Seasons(categorize_by(
                items.iter().cloned(),
                ItemVariant::Default,
                |item| item.season_def.name.clone(),
            )),
        };

        Self {
            membership: membership.clone(),
            catalog_version: state.version().to_string(),
            fetched_at: state.snapshot.fetched_at,
            total: items.len(),
            groups,
            warnings: state.resolution.warnings.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimOutput {
    request: ClaimRequest,
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    refresh: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    items_remaining: Option<usize>,
}

impl From<&ClaimResult> for ClaimOutput {
    fn from(result: &ClaimResult) -> Self {
        let (payload, error) = match &result.status {
            ClaimStatus::Claimed(payload) => (Some(payload.clone()), None),
            ClaimStatus::AlreadyClaimed(_) => (None, None),
            ClaimStatus::Failed(err) => (None, Some(err)),
        };
        let (refresh, items_remaining) = match &result.refresh {
            RefreshOutcome::Skipped => ("skipped".to_string(), None),
            RefreshOutcome::Refreshed { items_remaining } => {
                ("refreshed".to_string(), Some(*items_remaining))
            }
            RefreshOutcome::Failed { reason } => (format!("failed: {}", reason), None),
        };

        Self {
            request: result.request.clone(),
            outcome: result.status.outcome(),
            payload,
            error_code: error.map(RewardError::error_code),
            error: error.map(ToString::to_string),
            refresh,
            items_remaining,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("序列化输出失败")?;
    println!("{}", text);
    Ok(())
}

fn print_group(group: &CategoryGroup) {
    if group.show_quantity() {
        println!(
            "  {} ({} 项, 共 {})",
            group.category,
            group.item_count(),
            group.total_quantity()
        );
    } else {
        println!("  {} ({} 项)", group.category, group.item_count());
    }
    for item in &group.items {
        print_item(item);
    }
}

fn print_item(item: &UnclaimedItem) {
    let quantity = match item.quantity() {
        0 | 1 => String::new(),
        n => format!(" x{}", n),
    };
    println!(
        "    {}{}  [{}]  character={} progression={} reward={}",
        item.item_def.name,
        quantity,
        item.season_def.name,
        item.character_id,
        item.progression_hash,
        item.reward_item.reward_item_index
    );
}

fn print_list(output: &ListOutput) {
    println!(
        "{} ({} {})  定义表 {}  拉取于 {}",
        output.membership.display_name,
        output.membership.membership_type.name(),
        output.membership.membership_id,
        output.catalog_version,
        output.fetched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    if output.total == 0 {
        println!("没有未领取的奖励");
    }

    match &output.groups {
        Grouping::Overview(overview) => {
            for (variant, section) in overview.sections() {
                println!("== {} ({}) ==", variant, section.item_count());
                for group in section.groups.values() {
                    print_group(group);
                }
            }
        }
        Grouping::Seasons(groups) => {
            for group in groups.values() {
                print_group(group);
            }
        }
    }

    if !output.warnings.is_empty() {
        println!("数据完整性警告 ({}):", output.warnings.len());
        for warning in &output.warnings {
            println!("  {}", warning);
        }
    }
}

fn print_claim(output: &ClaimOutput) {
    match &output.error {
        Some(error) => println!("领取失败: {}", error),
        None => println!("领取结果: {}", output.outcome),
    }
    match output.items_remaining {
        Some(remaining) => println!("刷新完成，剩余未领取 {} 项", remaining),
        None => println!("刷新: {}", output.refresh),
    }
}
