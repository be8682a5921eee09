use std::path::PathBuf;
use std::time::Duration;

use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{Command, StudioArgs};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Fills CLI values that were not given on the command line from `config`.
///
/// # Errors
///
/// Returns an error when a config value is out of range.
pub fn apply_config(
    args: &mut StudioArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    let sub_matches = matches.subcommand().map(|(_, sub)| sub);

    let verbose_on_cli =
        is_cli(matches, "verbose") || sub_matches.is_some_and(|sub| is_cli(sub, "verbose"));
    if !verbose_on_cli && let Some(verbose) = config.verbose {
        args.verbose = verbose;
    }

    match &mut args.command {
        Command::Connect(connect) => {
            if connect.url.is_none() {
                connect.url.clone_from(&config.server_url);
            }
            if connect.query_timeout.is_none()
                && let Some(ms) = config.query_timeout_ms
            {
                if ms == 0 {
                    return Err(AppError::config(ConfigError::FieldMustBePositive {
                        field: "query_timeout_ms",
                    }));
                }
                connect.query_timeout = Some(Duration::from_millis(ms));
            }
            if connect.routine_store.is_none() {
                connect.routine_store = config.routine_store.as_ref().map(PathBuf::from);
            }
        }
        Command::Record(record) => {
            let no_hover_on_cli = sub_matches.is_some_and(|sub| is_cli(sub, "no_hover"));
            if !no_hover_on_cli && let Some(no_hover) = config.no_hover {
                record.no_hover = no_hover;
            }
        }
        Command::Replay(_) => {}
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}
