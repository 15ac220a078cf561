//! 玩家进度快照模型
//!
//! 快照一经返回即不可变，新的拉取产生新的快照而不是就地修改。

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::enums::ClassType;

/// rewardItemStates 中的"已领取"标志位
pub const REWARD_STATE_CLAIMED: u32 = 0x4;

/// 单个角色在单条进度轨道上的状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProgressionState {
    pub progression_hash: u32,
    pub level: u32,
    /// 累计进度
    pub current_progress: i64,
    /// 已领取的奖励下标
    pub claimed: BTreeSet<usize>,
}

impl CharacterProgressionState {
    /// 从平台的 rewardItemStates 位图数组构建已领取集合
    pub fn from_reward_states(
        progression_hash: u32,
        level: u32,
        current_progress: i64,
        reward_states: &[u32],
    ) -> Self {
        let claimed = reward_states
            .iter()
            .enumerate()
            .filter(|(_, state)| *state & REWARD_STATE_CLAIMED != 0)
            .map(|(index, _)| index)
            .collect();

        Self {
            progression_hash,
            level,
            current_progress,
            claimed,
        }
    }

    pub fn is_claimed(&self, reward_item_index: usize) -> bool {
        self.claimed.contains(&reward_item_index)
    }
}

/// 角色概要
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    pub character_id: String,
    pub class_type: ClassType,
    pub light: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_last_played: Option<DateTime<Utc>>,
}

/// 单个角色的进度快照
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterSnapshot {
    pub summary: CharacterSummary,
    pub progressions: HashMap<u32, CharacterProgressionState>,
}

impl CharacterSnapshot {
    pub fn progression(&self, progression_hash: u32) -> Option<&CharacterProgressionState> {
        self.progressions.get(&progression_hash)
    }
}

/// 一次进度拉取的完整结果
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressionSnapshot {
    pub fetched_at: DateTime<Utc>,
    /// 按角色 ID 排序，保证解析输出顺序确定
    pub characters: BTreeMap<String, CharacterSnapshot>,
}

impl ProgressionSnapshot {
    pub fn character(&self, character_id: &str) -> Option<&CharacterSnapshot> {
        self.characters.get(character_id)
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
