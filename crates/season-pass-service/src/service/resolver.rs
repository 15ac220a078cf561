//! 未领取奖励解析
//!
//! `(定义表, 进度快照) -> 未领取奖励列表` 的纯函数，不做 I/O，不持有状态。
//!
//! 对快照中的每个角色、定义表中的每条赛季轨道、轨道上的每个奖励阶梯：
//! 累计进度达到阶梯门槛且该奖励下标不在已领取集合中，即输出一条未领取奖励。
//! 各阶梯独立判断，同一轨道可同时有多条未领取奖励。
//!
//! 定义表缺项（轨道或物品定义缺失）只记录数据完整性警告并跳过，不中断解析。

use crate::models::{
    Catalog, CharacterProgressionState, DataIntegrityWarning, IntegrityIssue,
    ProgressionDefinition, ProgressionSnapshot, ProgressionStep, Resolution, SeasonDefinition,
    UnclaimedItem,
};

/// 单个阶梯是否已获得但未领取
#[inline]
pub fn is_unclaimed(step: &ProgressionStep, state: &CharacterProgressionState) -> bool {
    state.current_progress >= step.threshold && !state.is_claimed(step.reward.reward_item_index)
}

/// 解析所有角色的未领取奖励
///
/// 输出顺序：角色 ID 升序，轨道 hash 升序，奖励下标升序
pub fn resolve(catalog: &Catalog, snapshot: &ProgressionSnapshot) -> Resolution {
    let mut resolution = Resolution::default();

    let mut tracks: Vec<(u32, &ProgressionDefinition, &SeasonDefinition)> = Vec::new();
    for (progression_hash, season) in catalog.tracks() {
        match catalog.progressions.get(&progression_hash) {
            Some(definition) => tracks.push((progression_hash, definition, season)),
            None => resolution.warnings.push(DataIntegrityWarning {
                character_id: None,
                progression_hash,
                reward_item_index: None,
                issue: IntegrityIssue::MissingProgressionDefinition,
            }),
        }
    }

    for (character_id, character) in &snapshot.characters {
        for &(progression_hash, definition, season) in &tracks {
            // 角色没有该轨道的进度，视为尚未获得任何奖励
            let Some(state) = character.progression(progression_hash) else {
                continue;
            };

            for step in definition.steps.iter().filter(|s| is_unclaimed(s, state)) {
                let reward = &step.reward;
                match catalog.items.get(&reward.item_hash) {
                    Some(item_def) => resolution.items.push(UnclaimedItem {
                        character_id: character_id.clone(),
                        progression_hash,
                        reward_item: reward.clone(),
                        item_def: item_def.clone(),
                        season_def: season.clone(),
                    }),
                    None => resolution.warnings.push(DataIntegrityWarning {
                        character_id: Some(character_id.clone()),
                        progression_hash,
                        reward_item_index: Some(reward.reward_item_index),
                        issue: IntegrityIssue::MissingItemDefinition {
                            item_hash: reward.item_hash,
                        },
                    }),
                }
            }
        }
    }

    resolution
}
