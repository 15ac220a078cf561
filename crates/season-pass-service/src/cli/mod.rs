//! CLI 模块
//!
//! - `list` - 列出未领取的奖励
//! - `claim` - 领取一个奖励
//! - `membership` - 显示当前账号的游戏身份
//!
//! # 使用示例
//!
//! ```bash
//! # 按分类列出（JSON 输出）
//! season-pass list --json
//!
//! # 指定身份并按赛季分组
//! season-pass list --membership-id 4611686018400000001 --membership-type 3 --group-by season
//!
//! # 领取，传输失败时重试
//! season-pass claim -c 2305843009300000001 -p 3001 -r 4 --retry
//! ```

pub mod commands;
pub mod runner;

pub use commands::{Cli, Commands, GroupBy, MembershipArgs};
pub use runner::CommandRunner;
