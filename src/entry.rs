use clap::{CommandFactory, FromArgMatches};
use tracing::debug;

use crate::app::{run_connect, run_record, run_replay};
use crate::args::{Command, StudioArgs};
use crate::config::{apply_config, load_config};
use crate::error::AppResult;
use crate::logger::init_logging;

/// Parses the command line, layers the config file underneath it and runs
/// the selected subcommand on a multi-threaded runtime.
///
/// # Errors
///
/// Returns the first error raised by config loading or the subcommand.
pub fn run() -> AppResult<()> {
    let matches = StudioArgs::command().get_matches();
    let mut args = StudioArgs::from_arg_matches(&matches)?;
    let config = load_config(args.config.as_deref())?;
    if let Some(config) = config.as_ref() {
        apply_config(&mut args, &matches, config)?;
    }

    init_logging(args.verbose);
    if config.is_some() {
        debug!("Applied config file defaults");
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args))
}

async fn run_async(args: StudioArgs) -> AppResult<()> {
    match args.command {
        Command::Connect(connect) => run_connect(connect).await,
        Command::Record(record) => run_record(&record).await,
        Command::Replay(replay) => run_replay(&replay).await,
    }
}
