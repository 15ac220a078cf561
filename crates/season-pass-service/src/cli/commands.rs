//! CLI 命令定义
//!
//! 使用 clap derive 宏定义命令行接口结构。

use clap::{Args, Parser, Subcommand, ValueEnum};

/// 赛季通行证奖励工具
///
/// 查看已获得但未领取的赛季奖励，并逐个领取。
/// 平台凭据通过配置文件或 SEASON__PLATFORM__* 环境变量提供。
#[derive(Parser, Debug)]
#[command(name = "season-pass")]
#[command(version, about = "赛季通行证未领取奖励工具")]
#[command(propagate_version = true)]
pub struct Cli {
    /// 日志级别，覆盖配置文件 (trace, debug, info, warn, error)
    #[arg(short, long)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// 指定游戏身份；不指定时使用当前登录账号的主身份
#[derive(Args, Debug, Clone, Default)]
pub struct MembershipArgs {
    /// 游戏身份 ID
    #[arg(long, requires = "membership_type")]
    pub membership_id: Option<String>,

    /// 游戏身份平台类型（1 Xbox, 2 PSN, 3 Steam, 6 Epic）
    #[arg(long, requires = "membership_id")]
    pub membership_type: Option<i32>,
}

/// 分组方式
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GroupBy {
    /// 按货币、材料、物品拆分后按物品分类分组
    #[default]
    Category,
    /// 按赛季分组
    Season,
}

/// 子命令枚举
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 列出所有未领取的奖励
    List {
        #[command(flatten)]
        membership: MembershipArgs,

        /// 分组方式
        #[arg(short, long, value_enum, default_value_t = GroupBy::Category)]
        group_by: GroupBy,

        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 领取一个奖励
    ///
    /// 提交后会重新拉取玩家进度，以服务端结果为准。
    Claim {
        #[command(flatten)]
        membership: MembershipArgs,

        /// 角色 ID
        #[arg(short, long)]
        character_id: String,

        /// 进度轨道 hash
        #[arg(short, long)]
        progression_hash: u32,

        /// 奖励下标
        #[arg(short, long)]
        reward_index: usize,

        /// 传输失败时按重试策略重试
        #[arg(long)]
        retry: bool,

        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },

    /// 显示当前登录账号的游戏身份
    Membership {
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// 单元测试
// ============================================================================
