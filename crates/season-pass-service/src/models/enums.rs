//! 枚举与标识类型定义

use std::fmt;

use serde::{Deserialize, Serialize};

/// 奖励展示变体
///
/// 同时决定分组后的排序规则和是否展示数量汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemVariant {
    /// 装备、引擎等物品：按稀有度排序
    Item,
    /// 货币：按数量排序，总是展示数量
    Currency,
    /// 材料：按数量排序，存在堆叠时展示数量
    Material,
    /// 其他分组（如按赛季）：仅按赛季排序
    #[default]
    Default,
}

impl ItemVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Currency => "currency",
            Self::Material => "material",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for ItemVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 平台账号类型（数值与平台一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MembershipType(pub i32);

impl MembershipType {
    pub const XBOX: Self = Self(1);
    pub const PSN: Self = Self(2);
    pub const STEAM: Self = Self(3);
    pub const STADIA: Self = Self(5);
    pub const EPIC: Self = Self(6);

    pub fn name(&self) -> &'static str {
        match self.0 {
            1 => "Xbox",
            2 => "PlayStation",
            3 => "Steam",
            5 => "Stadia",
            6 => "Epic",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 角色职业
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassType(pub i32);

impl ClassType {
    pub fn name(&self) -> &'static str {
        match self.0 {
            0 => "Titan",
            1 => "Hunter",
            2 => "Warlock",
            _ => "Unknown",
        }
    }
}
