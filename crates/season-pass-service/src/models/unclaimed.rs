//! 未领取奖励及解析结果

use std::fmt;

use serde::Serialize;

use super::catalog::{ItemDefinition, RewardItem, SeasonDefinition};

/// 未领取奖励的唯一标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnclaimedKey {
    pub character_id: String,
    pub progression_hash: u32,
    pub reward_item_index: usize,
}

/// 已获得但未领取的奖励
///
/// 纯投影值，每次解析重新计算，从不持久化。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnclaimedItem {
    pub character_id: String,
    pub progression_hash: u32,
    pub reward_item: RewardItem,
    pub item_def: ItemDefinition,
    pub season_def: SeasonDefinition,
}

impl UnclaimedItem {
    pub fn key(&self) -> UnclaimedKey {
        UnclaimedKey {
            character_id: self.character_id.clone(),
            progression_hash: self.progression_hash,
            reward_item_index: self.reward_item.reward_item_index,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.reward_item.quantity
    }

    pub fn season_number(&self) -> i32 {
        self.season_def.season_number
    }
}

/// 数据完整性问题类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntegrityIssue {
    /// 赛季引用了不存在的进度轨道
    MissingProgressionDefinition,
    /// 奖励引用了不存在的物品
    MissingItemDefinition { item_hash: u32 },
}

/// 数据完整性警告
///
/// 定义表与进度数据连接失败时记录，不会中断解析。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataIntegrityWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub character_id: Option<String>,
    pub progression_hash: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_item_index: Option<usize>,
    pub issue: IntegrityIssue,
}

impl DataIntegrityWarning {
    pub fn code(&self) -> &'static str {
        "DATA_INTEGRITY_WARNING"
    }
}

impl fmt::Display for DataIntegrityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            IntegrityIssue::MissingProgressionDefinition => write!(
                f,
                "progression {} is a season track but has no definition",
                self.progression_hash
            ),
            IntegrityIssue::MissingItemDefinition { item_hash } => {
                write!(
                    f,
                    "item {} referenced by progression {}",
                    item_hash, self.progression_hash
                )?;
                if let Some(index) = self.reward_item_index {
                    write!(f, " reward {}", index)?;
                }
                if let Some(character) = &self.character_id {
                    write!(f, " for character {}", character)?;
                }
                f.write_str(" has no definition")
            }
        }
    }
}

/// 一次解析的输出
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub items: Vec<UnclaimedItem>,
    pub warnings: Vec<DataIntegrityWarning>,
}

impl Resolution {
    pub fn contains(&self, key: &UnclaimedKey) -> bool {
        self.items.iter().any(|item| item.key() == *key)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_display() {
        let warning = DataIntegrityWarning {
            character_id: Some("c1".to_string()),
            progression_hash: 3001,
            reward_item_index: Some(3),
            issue: IntegrityIssue::MissingItemDefinition { item_hash: 9999 },
        };
        assert_eq!(warning.code(), "DATA_INTEGRITY_WARNING");
        assert_eq!(
            warning.to_string(),
            "item 9999 referenced by progression 3001 reward 3 for character c1 has no definition"
        );

        let warning = DataIntegrityWarning {
            character_id: None,
            progression_hash: 3002,
            reward_item_index: None,
            issue: IntegrityIssue::MissingProgressionDefinition,
        };
        assert!(warning.to_string().contains("3002"));
    }
}
