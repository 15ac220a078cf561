//! 未领取奖励分组与排序
//!
//! 变体同时决定组内排序规则和数量展示规则：
//!
//! | 变体 | 排序 | 展示数量 |
//! |------|------|----------|
//! | currency | 数量降序，赛季降序 | 总是 |
//! | material | 数量降序，赛季降序 | 存在堆叠（总数量 ≠ 件数）时 |
//! | item | 稀有度降序（缺失按 0），赛季降序 | 否 |
//! | default | 赛季降序 | 否 |
//!
//! 排序是稳定的，完全相同的键保持输入顺序。

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeStruct, Serializer};

use crate::models::{ItemVariant, UnclaimedItem};

/// 一个分类下的奖励
///
/// 序列化时附带由条目推导出的 `itemCount`、`totalQuantity`、`showQuantity`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub category: String,
    pub variant: ItemVariant,
    pub items: Vec<UnclaimedItem>,
}

impl CategoryGroup {
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity())).sum()
    }

    pub fn show_quantity(&self) -> bool {
        match self.variant {
            ItemVariant::Currency => true,
            ItemVariant::Material => self.total_quantity() != self.item_count() as u64,
            ItemVariant::Item | ItemVariant::Default => false,
        }
    }
}

impl Serialize for CategoryGroup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CategoryGroup", 6)?;
        state.serialize_field("category", &self.category)?;
        state.serialize_field("variant", &self.variant)?;
        state.serialize_field("itemCount", &self.item_count())?;
        state.serialize_field("totalQuantity", &self.total_quantity())?;
        state.serialize_field("showQuantity", &self.show_quantity())?;
        state.serialize_field("items", &self.items)?;
        state.end()
    }
}

/// 数量降序，赛季降序
pub fn by_quantity(a: &UnclaimedItem, b: &UnclaimedItem) -> Ordering {
    b.quantity()
        .cmp(&a.quantity())
        .then_with(|| by_season(a, b))
}

/// 稀有度降序，赛季降序
pub fn by_tier(a: &UnclaimedItem, b: &UnclaimedItem) -> Ordering {
    b.item_def
        .tier_rank_or_zero()
        .cmp(&a.item_def.tier_rank_or_zero())
        .then_with(|| by_season(a, b))
}

/// 赛季降序
pub fn by_season(a: &UnclaimedItem, b: &UnclaimedItem) -> Ordering {
    b.season_number().cmp(&a.season_number())
}

/// 变体对应的排序函数
pub fn comparator(variant: ItemVariant) -> fn(&UnclaimedItem, &UnclaimedItem) -> Ordering {
    match variant {
        ItemVariant::Currency | ItemVariant::Material => by_quantity,
        ItemVariant::Item => by_tier,
        ItemVariant::Default => by_season,
    }
}

/// 按变体规则稳定排序
pub fn sort_items(items: &mut [UnclaimedItem], variant: ItemVariant) {
    items.sort_by(comparator(variant));
}

/// 按物品分类名分组
pub fn categorize(
    items: impl IntoIterator<Item = UnclaimedItem>,
    variant: ItemVariant,
) -> BTreeMap<String, CategoryGroup> {
    categorize_by(items, variant, |item| item.item_def.category.clone())
}

/// 按调用方提供的分类键分组（如按赛季名）
///
/// 只为出现过的分类建组，不会产生空组
pub fn categorize_by<F>(
    items: impl IntoIterator<Item = UnclaimedItem>,
    variant: ItemVariant,
    key: F,
) -> BTreeMap<String, CategoryGroup>
where
    F: Fn(&UnclaimedItem) -> String,
{
    let mut groups: BTreeMap<String, CategoryGroup> = BTreeMap::new();
    for item in items {
        let category = key(&item);
        groups
            .entry(category.clone())
            .or_insert_with(|| CategoryGroup {
                category,
                variant,
                items: Vec::new(),
            })
            .items
            .push(item);
    }

    for group in groups.values_mut() {
        sort_items(&mut group.items, variant);
    }
    groups
}
