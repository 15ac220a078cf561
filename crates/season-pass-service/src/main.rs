//! 赛季通行证奖励 CLI
//!
//! 加载配置、初始化日志与指标后执行子命令。

use clap::Parser;
use season_pass::cli::{Cli, CommandRunner, Commands};
use season_shared::config::AppConfig;
use season_shared::observability;

const SERVICE_NAME: &str = "season-pass";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(SERVICE_NAME)?;
    let observability_config = config
        .observability
        .clone()
        .with_log_level(cli.log_level.as_deref());
    let _guard = observability::init(&observability_config)?;

    let runner = CommandRunner::new(config)?;

    match cli.command {
        Commands::List {
            membership,
            group_by,
            json,
        } => {
            runner.run_list(membership, group_by, json).await?;
        }
        Commands::Claim {
            membership,
            character_id,
            progression_hash,
            reward_index,
            retry,
            json,
        } => {
            runner
                .run_claim(
                    membership,
                    &character_id,
                    progression_hash,
                    reward_index,
                    retry,
                    json,
                )
                .await?;
        }
        Commands::Membership { json } => {
            runner.run_membership(json).await?;
        }
    }

    Ok(())
}
