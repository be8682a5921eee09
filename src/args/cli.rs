use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::domain::Point;

use super::parsers::{parse_duration_arg, parse_point};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Capture, replay and sync input for screen automation routines."
)]
pub struct StudioArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (TOML or JSON)
    #[arg(long = "config", short = 'c', global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(long = "verbose", short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Open a session with the routine runtime and mirror its state
    Connect(ConnectArgs),
    /// Capture JSON-lines input events into a replay
    Record(RecordArgs),
    /// Play a recorded replay, printing each event as it fires
    Replay(ReplayArgs),
}

#[derive(Debug, Args, Clone)]
pub struct ConnectArgs {
    /// Runtime WebSocket endpoint (ws:// or wss://)
    #[arg(long = "url", env = "ROUTINE_STUDIO_URL")]
    pub url: Option<String>,

    /// Give up on condition queries after this long (supports ms/s/m/h)
    #[arg(long = "query-timeout", value_parser = parse_duration_arg)]
    pub query_timeout: Option<Duration>,

    /// File the synced routine is persisted to
    #[arg(long = "routine-store")]
    pub routine_store: Option<PathBuf>,

    /// Request the live frame once connected
    #[arg(long = "fetch-frame")]
    pub fetch_frame: bool,
}

#[derive(Debug, Args, Clone)]
pub struct RecordArgs {
    /// JSON-lines event source (defaults to stdin)
    #[arg(long = "input", short = 'i')]
    pub input: Option<PathBuf>,

    /// Replay output path (defaults to stdout)
    #[arg(long = "output", short = 'o')]
    pub output: Option<PathBuf>,

    /// Drop pointer moves while no button is held
    #[arg(long = "no-hover")]
    pub no_hover: bool,

    /// Mark the replay as relative to this anchor (x,y)
    #[arg(long = "anchor", value_parser = parse_point, allow_hyphen_values = true)]
    pub anchor: Option<Point>,
}

#[derive(Debug, Args, Clone)]
pub struct ReplayArgs {
    /// Replay JSON file
    pub file: PathBuf,

    /// Horizontal shift applied to move events
    #[arg(long = "dx", default_value_t = 0, allow_hyphen_values = true)]
    pub dx: i32,

    /// Vertical shift applied to move events
    #[arg(long = "dy", default_value_t = 0, allow_hyphen_values = true)]
    pub dy: i32,

    /// Replay a relative recording against this anchor (x,y)
    #[arg(
        long = "anchor",
        value_parser = parse_point,
        allow_hyphen_values = true,
        conflicts_with_all = ["dx", "dy"]
    )]
    pub anchor: Option<Point>,
}
