//! 定义表领域模型
//!
//! 定义表在同一版本内不可变：进度轨道、奖励物品、赛季。
//! 由 `CatalogStore` 从平台原始表构建，解析器只读取这里的结构。

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::enums::ItemVariant;

/// 物品类型：货币
pub const ITEM_TYPE_CURRENCY: i32 = 1;
/// 物品类型：消耗品
pub const ITEM_TYPE_CONSUMABLE: i32 = 9;
/// 物品类型：兑换材料
pub const ITEM_TYPE_EXCHANGE_MATERIAL: i32 = 10;

/// 定义表版本标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogVersion(String);

impl CatalogVersion {
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CatalogVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 定义表清单
///
/// 版本号 + 当前语言下各表的内容路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDescriptor {
    pub version: CatalogVersion,
    pub table_paths: HashMap<String, String>,
}

impl ManifestDescriptor {
    pub fn table_path(&self, table: &str) -> Option<&str> {
        self.table_paths.get(table).map(String::as_str)
    }
}

/// 轨道上的一份奖励
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardItem {
    /// 奖励在轨道 rewardItems 中的下标，领取时作为 rewardIndex
    pub reward_item_index: usize,
    pub item_hash: u32,
    pub quantity: u32,
}

/// 轨道上的一个奖励阶梯
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionStep {
    /// 累计进度达到该值即视为已获得
    pub threshold: i64,
    pub reward: RewardItem,
}

/// 进度轨道定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressionDefinition {
    pub hash: u32,
    pub name: String,
    pub steps: Vec<ProgressionStep>,
}

/// 计算某个等级奖励所需的累计进度
///
/// 1 级奖励无门槛；L 级需要完成前 L-1 个阶梯。
/// 超出阶梯列表的等级沿用最后一个阶梯的进度值。
pub fn level_threshold(step_totals: &[i64], level: u32) -> i64 {
    let completed = level.saturating_sub(1) as usize;
    let listed: i64 = step_totals.iter().take(completed).sum();
    let overflow = completed.saturating_sub(step_totals.len()) as i64;
    let last = step_totals.last().copied().unwrap_or(0);
    listed + overflow * last
}

/// 奖励物品定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDefinition {
    pub hash: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// 稀有度等级，缺失时排序按 0 处理
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_rank: Option<i32>,
    pub item_type: i32,
    /// 分组用的分类名
    pub category: String,
}

impl ItemDefinition {
    pub fn tier_rank_or_zero(&self) -> i32 {
        self.tier_rank.unwrap_or(0)
    }

    /// 按物品类型归入展示变体
    pub fn variant(&self) -> ItemVariant {
        match self.item_type {
            ITEM_TYPE_CURRENCY => ItemVariant::Currency,
            ITEM_TYPE_CONSUMABLE | ITEM_TYPE_EXCHANGE_MATERIAL => ItemVariant::Material,
            _ => ItemVariant::Item,
        }
    }
}

/// 赛季定义
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonDefinition {
    pub hash: u32,
    pub name: String,
    pub season_number: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_pass_hash: Option<u32>,
}

/// 赛季通行证定义：赛季与其奖励轨道的关联
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonPassDefinition {
    pub hash: u32,
    pub reward_progression_hash: u32,
    pub prestige_progression_hash: Option<u32>,
}

/// 某一版本的完整定义表
#[derive(Debug, Clone)]
pub struct Catalog {
    pub version: CatalogVersion,
    pub progressions: HashMap<u32, ProgressionDefinition>,
    pub items: HashMap<u32, ItemDefinition>,
    pub seasons: HashMap<u32, SeasonDefinition>,
    /// 进度轨道 hash -> 所属赛季 hash
    tracks: BTreeMap<u32, u32>,
}

impl Catalog {
    /// 构建定义表并推导赛季轨道
    ///
    /// 每个赛季通行证的奖励轨道和巅峰轨道都是一条赛季轨道；
    /// 同一轨道被多个赛季引用时，以赛季序号最小者为准。
    pub fn new(
        version: CatalogVersion,
        progressions: HashMap<u32, ProgressionDefinition>,
        items: HashMap<u32, ItemDefinition>,
        seasons: HashMap<u32, SeasonDefinition>,
        season_passes: &HashMap<u32, SeasonPassDefinition>,
    ) -> Self {
        let mut ordered: Vec<&SeasonDefinition> = seasons.values().collect();
        ordered.sort_by_key(|s| (s.season_number, s.hash));

        let mut tracks = BTreeMap::new();
        for season in ordered {
            let Some(pass) = season.season_pass_hash.and_then(|h| season_passes.get(&h)) else {
                continue;
            };
            let hashes = std::iter::once(pass.reward_progression_hash)
                .chain(pass.prestige_progression_hash)
                .filter(|&h| h != 0);
            for progression_hash in hashes {
                tracks.entry(progression_hash).or_insert(season.hash);
            }
        }

        Self {
            version,
            progressions,
            items,
            seasons,
            tracks,
        }
    }

    /// 按轨道 hash 升序遍历所有赛季轨道
    pub fn tracks(&self) -> impl Iterator<Item = (u32, &SeasonDefinition)> + '_ {
        self.tracks
            .iter()
            .filter_map(|(&progression, season)| self.seasons.get(season).map(|s| (progression, s)))
    }

    pub fn season_for_progression(&self, progression_hash: u32) -> Option<&SeasonDefinition> {
        self.tracks
            .get(&progression_hash)
            .and_then(|season| self.seasons.get(season))
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}
