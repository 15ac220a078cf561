//! 当前账号的游戏成员身份
//!
//! 选择规则：
//! 1. 平台标记的主身份（primaryMembershipId）
//! 2. 跨平台存档覆盖到自身平台的身份
//! 3. 第一个身份

use serde::Serialize;
use tracing::{info, instrument};

use crate::error::{Result, RewardError};
use crate::models::MembershipType;
use crate::platform::MembershipSource;
use crate::platform::wire::{MembershipCard, UserMembershipData};

/// 要查看的游戏成员身份
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub membership_id: String,
    pub membership_type: MembershipType,
    pub display_name: String,
}

impl Membership {
    pub fn new(membership_id: impl Into<String>, membership_type: MembershipType) -> Self {
        let membership_id = membership_id.into();
        Self {
            display_name: membership_id.clone(),
            membership_id,
            membership_type,
        }
    }
}

impl From<&MembershipCard> for Membership {
    fn from(card: &MembershipCard) -> Self {
        Self {
            membership_id: card.membership_id.clone(),
            membership_type: card.membership_type,
            display_name: card.global_display_name(),
        }
    }
}

/// 从账号数据中选出要查看的身份
pub fn select_membership(data: &UserMembershipData) -> Option<Membership> {
    let cards = &data.destiny_memberships;

    let primary = data
        .primary_membership_id
        .as_deref()
        .and_then(|id| cards.iter().find(|c| c.membership_id == id));
    let cross_save = || {
        cards
            .iter()
            .find(|c| c.cross_save_override != 0 && c.cross_save_override == c.membership_type.0)
    };

    primary
        .or_else(cross_save)
        .or_else(|| cards.first())
        .map(Membership::from)
}

/// 拉取当前登录账号并选出身份
#[instrument(skip(source))]
pub async fn fetch_membership(source: &dyn MembershipSource) -> Result<Membership> {
    let data = source
        .fetch_memberships()
        .await
        .map_err(|e| RewardError::MembershipUnavailable {
            reason: e.describe(),
        })?;

    let membership = select_membership(&data).ok_or_else(|| RewardError::MembershipUnavailable {
        reason: "账号下没有游戏身份".to_string(),
    })?;

    info!(
        membership_id = %membership.membership_id,
        membership_type = %membership.membership_type,
        display_name = %membership.display_name,
        "已选定游戏身份"
    );
    Ok(membership)
}
