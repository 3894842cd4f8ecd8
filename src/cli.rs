use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "surveillance-tui",
    version,
    about = "Terminal surveillance dashboard for Home Assistant cameras with motion-driven focus"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the live dashboard against a Home Assistant host.
    Watch(WatchArgs),
    /// Push recorded state snapshots through the selection engine offline.
    Replay(ReplayArgs),
    /// Validate a card configuration and print it with defaults applied.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Card configuration (JSON).
    #[arg(short, long)]
    pub config: PathBuf,

    /// Base URL of the Home Assistant host.
    #[arg(long, env = "HASS_URL", default_value = "http://localhost:8123")]
    pub url: String,

    /// Long-lived access token.
    #[arg(long, env = "HASS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// How often to read host state, in milliseconds (0 = card update_interval).
    #[arg(long, default_value_t = 0)]
    pub state_poll_ms: u64,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 5_000)]
    pub timeout_ms: u64,

    /// Where recordings and snapshots are written (defaults to the data directory).
    #[arg(long)]
    pub recordings_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReplayArgs {
    /// Card configuration (JSON).
    #[arg(short, long)]
    pub config: PathBuf,

    /// JSON array of `{ "at_ms": .., "states": [..] }` frames.
    #[arg(short, long)]
    pub snapshots: PathBuf,

    /// Keep timers running this long after the last frame (defaults to one poll interval).
    #[arg(long)]
    pub tail_ms: Option<u64>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Card configuration (JSON).
    #[arg(short, long)]
    pub config: PathBuf,
}
