use anyhow::Context;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use synergy_actions::Action;
use synergy_common::logging::init_logging;
use synergy_node_core::{Node, NodeConfig, SynergyNode};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Synergy governance node")]
struct Args {
    /// Path to configuration file (TOML or YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON-lines log of actions and block boundaries to replay
    #[arg(value_name = "ACTIONS")]
    actions: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// One line of the replay log
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Entry {
    Action(Action),
    NextBlock(u64),
}

#[derive(Debug, Default)]
struct Replay {
    applied: usize,
    rejected: usize,
    expired: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = NodeConfig::load(args.config.as_deref())?;
    if args.verbose {
        config.log_level = "debug".to_string();
    }
    init_logging(&config.log_level)?;

    info!(node_id = %config.node_id, "Starting Synergy node");
    let mut node = SynergyNode::initialize(config).await?;
    node.start().await?;
    let handle = node.handle()?;

    let log = tokio::fs::read_to_string(&args.actions)
        .await
        .with_context(|| format!("reading {}", args.actions.display()))?;

    let mut replay = Replay::default();
    for (number, line) in log.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry: Entry = serde_json::from_str(line)
            .with_context(|| format!("line {}: malformed entry", number + 1))?;
        match entry {
            Entry::Action(action) => match handle.apply(action).await {
                Ok(()) => replay.applied += 1,
                Err(e) if e.is_rejection() => {
                    warn!(line = number + 1, error = %e, "skipping rejected action");
                    replay.rejected += 1;
                }
                Err(e) => return Err(e.into()),
            },
            Entry::NextBlock(epoch) => {
                let expired = handle.next_block(epoch).await?;
                for hash in &expired {
                    info!(epoch, hash = %hash, "proposal expired");
                }
                replay.expired += expired.len();
            }
        }
    }

    info!(
        applied = replay.applied,
        rejected = replay.rejected,
        expired = replay.expired,
        "Replay finished"
    );
    node.stop().await?;
    Ok(())
}
