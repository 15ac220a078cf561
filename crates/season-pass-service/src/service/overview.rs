//! 未领取奖励总览
//!
//! 按物品类型把解析结果拆成货币、材料、物品三部分，每部分按自己的变体分组排序。

use std::collections::BTreeMap;

use serde::Serialize;

use super::categorizer::{CategoryGroup, categorize};
use crate::models::{ItemVariant, UnclaimedItem};

/// 单个变体下的分组
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSection {
    pub groups: BTreeMap<String, CategoryGroup>,
}

impl VariantSection {
    pub fn item_count(&self) -> usize {
        self.groups.values().map(CategoryGroup::item_count).sum()
    }

    pub fn total_quantity(&self) -> u64 {
        self.groups.values().map(CategoryGroup::total_quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// 前端展示用的总览
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardOverview {
    pub currency: VariantSection,
    pub material: VariantSection,
    pub item: VariantSection,
}

impl RewardOverview {
    pub fn build(items: &[UnclaimedItem]) -> Self {
        let mut buckets: BTreeMap<ItemVariant, Vec<UnclaimedItem>> = BTreeMap::new();
        for item in items {
            buckets
                .entry(item.item_def.variant())
                .or_default()
                .push(item.clone());
        }

        let mut section = |variant: ItemVariant| VariantSection {
            groups: categorize(buckets.remove(&variant).unwrap_or_default(), variant),
        };

        Self {
            currency: section(ItemVariant::Currency),
            material: section(ItemVariant::Material),
            item: section(ItemVariant::Item),
        }
    }

    /// 按展示顺序遍历非空部分
    pub fn sections(&self) -> impl Iterator<Item = (ItemVariant, &VariantSection)> {
        [
            (ItemVariant::Currency, &self.currency),
            (ItemVariant::Material, &self.material),
            (ItemVariant::Item, &self.item),
        ]
        .into_iter()
        .filter(|(_, section)| !section.is_empty())
    }

    pub fn item_count(&self) -> usize {
        self.currency.item_count() + self.material.item_count() + self.item.item_count()
    }
}
