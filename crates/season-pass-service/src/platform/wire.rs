//! 平台 JSON 结构
//!
//! 只声明解析器需要的字段，其余字段忽略。

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::{
    CatalogVersion, CharacterProgressionState, CharacterSummary, ClassType, ItemDefinition,
    ManifestDescriptor, MembershipType, ProgressionDefinition, ProgressionStep, RewardItem,
    SeasonDefinition, SeasonPassDefinition, level_threshold,
};

/// 缺少分类名时使用的分类
pub const UNKNOWN_CATEGORY: &str = "Unknown";

// ==================== 定义表 ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestRecord {
    pub version: String,
    #[serde(default)]
    pub json_world_component_content_paths: HashMap<String, HashMap<String, String>>,
}

impl ManifestRecord {
    /// 取指定语言的表路径，该语言不存在时返回 None
    pub fn into_descriptor(mut self, language: &str) -> Option<ManifestDescriptor> {
        let table_paths = self.json_world_component_content_paths.remove(language)?;
        Some(ManifestDescriptor {
            version: CatalogVersion::new(self.version),
            table_paths,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayProperties {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionStepRecord {
    #[serde(default)]
    pub progress_total: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionRewardRecord {
    pub item_hash: u32,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub rewarded_at_progression_level: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionDefinitionRecord {
    pub hash: u32,
    #[serde(default)]
    pub display_properties: DisplayProperties,
    #[serde(default)]
    pub steps: Vec<ProgressionStepRecord>,
    #[serde(default)]
    pub reward_items: Vec<ProgressionRewardRecord>,
}

impl From<ProgressionDefinitionRecord> for ProgressionDefinition {
    fn from(record: ProgressionDefinitionRecord) -> Self {
        let totals: Vec<i64> = record.steps.iter().map(|s| s.progress_total).collect();
        let steps = record
            .reward_items
            .into_iter()
            .enumerate()
            .map(|(index, reward)| ProgressionStep {
                threshold: level_threshold(&totals, reward.rewarded_at_progression_level),
                reward: RewardItem {
                    reward_item_index: index,
                    item_hash: reward.item_hash,
                    quantity: reward.quantity,
                },
            })
            .collect();

        Self {
            hash: record.hash,
            name: record.display_properties.name,
            steps,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryBlock {
    #[serde(default)]
    pub tier_type: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemRecord {
    pub hash: u32,
    #[serde(default)]
    pub display_properties: DisplayProperties,
    #[serde(default)]
    pub item_type_display_name: String,
    #[serde(default)]
    pub item_type: i32,
    #[serde(default)]
    pub inventory: Option<InventoryBlock>,
}

impl From<InventoryItemRecord> for ItemDefinition {
    fn from(record: InventoryItemRecord) -> Self {
        let category = match record.item_type_display_name.trim() {
            "" => UNKNOWN_CATEGORY.to_string(),
            name => name.to_string(),
        };
        Self {
            hash: record.hash,
            name: record.display_properties.name,
            icon: record.display_properties.icon,
            tier_rank: record.inventory.and_then(|i| i.tier_type),
            item_type: record.item_type,
            category,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonRecord {
    pub hash: u32,
    #[serde(default)]
    pub display_properties: DisplayProperties,
    #[serde(default)]
    pub season_number: i32,
    #[serde(default)]
    pub season_pass_hash: Option<u32>,
}

impl From<SeasonRecord> for SeasonDefinition {
    fn from(record: SeasonRecord) -> Self {
        Self {
            hash: record.hash,
            name: record.display_properties.name,
            season_number: record.season_number,
            season_pass_hash: record.season_pass_hash,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonPassRecord {
    pub hash: u32,
    #[serde(default)]
    pub reward_progression_hash: u32,
    #[serde(default)]
    pub prestige_progression_hash: Option<u32>,
}

impl From<SeasonPassRecord> for SeasonPassDefinition {
    fn from(record: SeasonPassRecord) -> Self {
        Self {
            hash: record.hash,
            reward_progression_hash: record.reward_progression_hash,
            prestige_progression_hash: record.prestige_progression_hash,
        }
    }
}

// ==================== 玩家档案 ====================

/// 档案组件：数据可能因隐私设置缺失
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentData<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub privacy: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    pub character_id: String,
    #[serde(default)]
    pub class_type: i32,
    #[serde(default)]
    pub light: i32,
    #[serde(default)]
    pub date_last_played: Option<DateTime<Utc>>,
}

impl From<CharacterRecord> for CharacterSummary {
    fn from(record: CharacterRecord) -> Self {
        Self {
            character_id: record.character_id,
            class_type: ClassType(record.class_type),
            light: record.light,
            date_last_played: record.date_last_played,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionRecord {
    pub progression_hash: u32,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub current_progress: i64,
    #[serde(default)]
    pub reward_item_states: Vec<u32>,
}

impl From<ProgressionRecord> for CharacterProgressionState {
    fn from(record: ProgressionRecord) -> Self {
        CharacterProgressionState::from_reward_states(
            record.progression_hash,
            record.level,
            record.current_progress,
            &record.reward_item_states,
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterProgressionsRecord {
    #[serde(default)]
    pub progressions: HashMap<String, ProgressionRecord>,
}

/// 档案响应，仅包含组件 200（角色）与 202（角色进度）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(default)]
    pub characters: Option<ComponentData<HashMap<String, CharacterRecord>>>,
    #[serde(default)]
    pub character_progressions: Option<ComponentData<HashMap<String, CharacterProgressionsRecord>>>,
}

// ==================== 账号 ====================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipCard {
    pub membership_id: String,
    pub membership_type: MembershipType,
    #[serde(default)]
    pub cross_save_override: i32,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub bungie_global_display_name: Option<String>,
    #[serde(default)]
    pub bungie_global_display_name_code: Option<u16>,
}

impl MembershipCard {
    /// `名称#四位编号`，无全局名称时退回平台显示名
    pub fn global_display_name(&self) -> String {
        match (&self.bungie_global_display_name, self.bungie_global_display_name_code) {
            (Some(name), Some(code)) if !name.is_empty() => format!("{}#{:04}", name, code),
            _ => self.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMembershipData {
    #[serde(default)]
    pub destiny_memberships: Vec<MembershipCard>,
    #[serde(default)]
    pub primary_membership_id: Option<String>,
}
