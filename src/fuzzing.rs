use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};

use crate::args::StudioArgs;
use crate::capture::{BroadcastRegistry, CloseOptions, EventBroadcaster};
use crate::config::types::ConfigFile;
use crate::config::{apply_config, parse_duration_value};
use crate::domain::InputEvent;
use crate::error::{AppError, AppResult, ConfigError};

/// Parses a duration argument (e.g. `10s`, `500ms`).
///
/// # Errors
///
/// Returns an error when the duration is invalid.
pub fn parse_duration_value_input(input: &str) -> AppResult<Duration> {
    parse_duration_value(input).map_err(AppError::from)
}

/// Parses a TOML config and layers it under a bare `connect` invocation.
///
/// # Errors
///
/// Returns an error when the config does not parse or carries invalid values.
pub fn apply_config_from_toml(input: &str) -> AppResult<StudioArgs> {
    let config: ConfigFile = toml::from_str(input).map_err(|err| {
        AppError::config(ConfigError::ParseToml {
            path: "fuzz.toml".into(),
            source: err,
        })
    })?;
    apply_to_connect(&config)
}

/// Parses a JSON config and layers it under a bare `connect` invocation.
///
/// # Errors
///
/// Returns an error when the config does not parse or carries invalid values.
pub fn apply_config_from_json(data: &[u8]) -> AppResult<StudioArgs> {
    let config: ConfigFile = serde_json::from_slice(data)?;
    apply_to_connect(&config)
}

fn apply_to_connect(config: &ConfigFile) -> AppResult<StudioArgs> {
    let matches = StudioArgs::command().try_get_matches_from(["routine-studio", "connect"])?;
    let mut args = StudioArgs::from_arg_matches(&matches)?;
    apply_config(&mut args, &matches, config)?;
    Ok(args)
}

/// Broadcasts `events` into a single stream and returns its finished contents.
///
/// # Errors
///
/// Returns an error when the stream cannot be closed.
pub fn capture_events(events: &[InputEvent], no_hover: bool) -> AppResult<Vec<InputEvent>> {
    let broadcaster = EventBroadcaster::new(BroadcastRegistry::new());
    let stream = broadcaster.registry().open();
    for event in events {
        broadcaster.handle_input_event(*event);
    }
    stream.close(CloseOptions { no_hover })?;
    Ok(stream
        .try_contents()
        .map(|contents| contents.to_vec())
        .unwrap_or_default())
}
