//! 玩家进度拉取
//!
//! 每次调用都是一次实时读取，不缓存、不重试；刷新节奏和重试策略由调用方决定。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use season_shared::observability::metrics;
use tracing::{debug, instrument, warn};

use crate::error::{Result, RewardError};
use crate::models::{
    CharacterProgressionState, CharacterSnapshot, CharacterSummary, ClassType, MembershipType,
    ProgressionSnapshot,
};
use crate::platform::ProgressionSource;
use crate::platform::wire::{ProfileResponse, ProgressionRecord};

pub struct ProgressionClient {
    source: Arc<dyn ProgressionSource>,
}

impl ProgressionClient {
    pub fn new(source: Arc<dyn ProgressionSource>) -> Self {
        Self { source }
    }

    /// 拉取账号下所有角色的进度快照
    #[instrument(skip(self), fields(membership_type = %membership_type))]
    pub async fn fetch_progression(
        &self,
        membership_id: &str,
        membership_type: MembershipType,
    ) -> Result<ProgressionSnapshot> {
        if membership_id.trim().is_empty() {
            return Err(RewardError::Validation("membership_id 不能为空".to_string()));
        }

        let profile = match self.source.fetch_profile(membership_id, membership_type).await {
            Ok(profile) => profile,
            Err(e) => {
                metrics::record_progression_fetch("error");
                return Err(RewardError::ProgressionUnavailable {
                    reason: e.describe(),
                });
            }
        };

        let snapshot = snapshot_from_profile(profile);
        metrics::record_progression_fetch("ok");
        debug!(characters = snapshot.characters.len(), "玩家进度已拉取");
        Ok(snapshot)
    }
}

/// 合并角色组件与进度组件
///
/// 只出现在其中一个组件里的角色也保留，缺失部分留空
pub(crate) fn snapshot_from_profile(profile: ProfileResponse) -> ProgressionSnapshot {
    let characters = profile.characters.and_then(|c| c.data).unwrap_or_default();
    let mut progressions = profile
        .character_progressions
        .and_then(|c| c.data)
        .unwrap_or_default();

    if characters.is_empty() && progressions.is_empty() {
        warn!("档案中没有角色数据，可能受隐私设置限制");
    }

    let mut snapshot = BTreeMap::new();
    for (character_id, record) in characters {
        let states = progressions
            .remove(&character_id)
            .map(|p| p.progressions)
            .unwrap_or_default();
        snapshot.insert(
            character_id,
            CharacterSnapshot {
                summary: CharacterSummary::from(record),
                progressions: convert_states(states),
            },
        );
    }

    for (character_id, record) in progressions {
        let summary = CharacterSummary {
            character_id: character_id.clone(),
            class_type: ClassType(-1),
            light: 0,
            date_last_played: None,
        };
        snapshot.insert(
            character_id,
            CharacterSnapshot {
                summary,
                progressions: convert_states(record.progressions),
            },
        );
    }

    ProgressionSnapshot {
        fetched_at: Utc::now(),
        characters: snapshot,
    }
}

fn convert_states(
    records: HashMap<String, ProgressionRecord>,
) -> HashMap<u32, CharacterProgressionState> {
    records
        .into_values()
        .map(|record| (record.progression_hash, CharacterProgressionState::from(record)))
        .collect()
}
