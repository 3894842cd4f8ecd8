mod card;
mod cli;
mod config;
mod hass;
mod logging;
mod ordering;
mod reconcile;
mod record;
mod recording;
mod replay;
mod scheduler;
mod selection;
mod snapshot;
mod storage;
mod theme;
mod thumbnails;
mod throttle;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Watch(args) => {
            tui::run_watch(&args).await?;
        }
        Command::Replay(args) => {
            logging::init_stderr()?;
            replay::run_replay(&args)?;
        }
        Command::Check(args) => {
            let config = config::load_from_path(&args.config)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&config).context("failed serializing card config")?
            );
            println!(
                "{} camera(s), reconciliation every {} ms.",
                config.cameras.len(),
                config.poll_interval_ms()
            );
        }
    }

    Ok(())
}
