use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};
use tempfile::tempdir;

use super::loader::load_config_file;
use super::types::ConfigFile;
use super::{apply_config, parse_duration_value};
use crate::args::{Command, StudioArgs};
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

fn parse_with_config(argv: &[&str], config: &ConfigFile) -> AppResult<StudioArgs> {
    let matches = StudioArgs::command().try_get_matches_from(argv)?;
    let mut args = StudioArgs::from_arg_matches(&matches)?;
    apply_config(&mut args, &matches, config)?;
    Ok(args)
}

#[test]
fn duration_units() -> AppResult<()> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("5", Duration::from_secs(5)),
        ("5s", Duration::from_secs(5)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_value(input)?;
        if parsed != expected {
            return Err(AppError::validation(format!(
                "Expected {:?} for '{}', got {:?}",
                expected, input, parsed
            )));
        }
    }
    Ok(())
}

#[test]
fn duration_rejects_bad_input() -> AppResult<()> {
    match parse_duration_value("") {
        Err(ValidationError::DurationEmpty) => {}
        other => {
            return Err(AppError::validation(format!(
                "Expected DurationEmpty, got {:?}",
                other
            )));
        }
    }
    match parse_duration_value("0ms") {
        Err(ValidationError::DurationZero) => {}
        other => {
            return Err(AppError::validation(format!(
                "Expected DurationZero, got {:?}",
                other
            )));
        }
    }
    match parse_duration_value("3d") {
        Err(ValidationError::InvalidDurationUnit { unit }) if unit == "d" => {}
        other => {
            return Err(AppError::validation(format!(
                "Expected InvalidDurationUnit, got {:?}",
                other
            )));
        }
    }
    match parse_duration_value("ms") {
        Err(ValidationError::InvalidDurationFormat { .. }) => Ok(()),
        other => Err(AppError::validation(format!(
            "Expected InvalidDurationFormat, got {:?}",
            other
        ))),
    }
}

#[test]
fn loads_toml_and_json() -> AppResult<()> {
    let dir = tempdir()?;
    let toml_path = dir.path().join("routine-studio.toml");
    std::fs::write(
        &toml_path,
        "server_url = \"ws://127.0.0.1:7000\"\nquery_timeout_ms = 1500\nno_hover = true\n",
    )?;
    let config = load_config_file(&toml_path)?;
    if config.server_url.as_deref() != Some("ws://127.0.0.1:7000")
        || config.query_timeout_ms != Some(1500)
        || config.no_hover != Some(true)
    {
        return Err(AppError::config(format!("Unexpected TOML config {:?}", config)));
    }

    let json_path = dir.path().join("routine-studio.json");
    std::fs::write(&json_path, r#"{"routine_store":"routine.json","verbose":true}"#)?;
    let config = load_config_file(&json_path)?;
    if config.routine_store.as_deref() != Some("routine.json") || config.verbose != Some(true) {
        return Err(AppError::config(format!("Unexpected JSON config {:?}", config)));
    }
    Ok(())
}

#[test]
fn rejects_unknown_extension() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("routine-studio.yaml");
    std::fs::write(&path, "verbose: true\n")?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => Ok(()),
        other => Err(AppError::config(format!(
            "Expected UnsupportedExtension, got {:?}",
            other
        ))),
    }
}

#[test]
fn config_fills_missing_connect_values() -> AppResult<()> {
    let config = ConfigFile {
        server_url: Some("ws://runtime:9000".to_owned()),
        query_timeout_ms: Some(750),
        routine_store: Some("routine.json".to_owned()),
        no_hover: None,
        verbose: Some(true),
    };
    let args = parse_with_config(&["routine-studio", "connect"], &config)?;
    if !args.verbose {
        return Err(AppError::config("Expected verbose from config"));
    }
    match args.command {
        Command::Connect(connect) => {
            if connect.url.as_deref() != Some("ws://runtime:9000")
                || connect.query_timeout != Some(Duration::from_millis(750))
                || connect.routine_store.as_deref() != Some(std::path::Path::new("routine.json"))
            {
                return Err(AppError::config(format!(
                    "Unexpected connect args {:?}",
                    connect
                )));
            }
            Ok(())
        }
        Command::Record(_) | Command::Replay(_) => {
            Err(AppError::config("Expected connect subcommand"))
        }
    }
}

#[test]
fn cli_overrides_config() -> AppResult<()> {
    let config = ConfigFile {
        server_url: Some("ws://from-config:1".to_owned()),
        query_timeout_ms: Some(750),
        ..ConfigFile::default()
    };
    let args = parse_with_config(
        &[
            "routine-studio",
            "connect",
            "--url",
            "ws://from-cli:2",
            "--query-timeout",
            "2s",
        ],
        &config,
    )?;
    match args.command {
        Command::Connect(connect) => {
            if connect.url.as_deref() != Some("ws://from-cli:2")
                || connect.query_timeout != Some(Duration::from_secs(2))
            {
                return Err(AppError::config(format!(
                    "Expected CLI values to win, got {:?}",
                    connect
                )));
            }
            Ok(())
        }
        Command::Record(_) | Command::Replay(_) => {
            Err(AppError::config("Expected connect subcommand"))
        }
    }
}

#[test]
fn zero_query_timeout_is_rejected() -> AppResult<()> {
    let config = ConfigFile {
        query_timeout_ms: Some(0),
        ..ConfigFile::default()
    };
    match parse_with_config(&["routine-studio", "connect"], &config) {
        Err(AppError::Config(ConfigError::FieldMustBePositive { field }))
            if field == "query_timeout_ms" =>
        {
            Ok(())
        }
        other => Err(AppError::config(format!(
            "Expected FieldMustBePositive, got {:?}",
            other
        ))),
    }
}

#[test]
fn record_no_hover_from_config() -> AppResult<()> {
    let config = ConfigFile {
        no_hover: Some(true),
        ..ConfigFile::default()
    };
    let args = parse_with_config(&["routine-studio", "record"], &config)?;
    match args.command {
        Command::Record(record) if record.no_hover => Ok(()),
        other => Err(AppError::config(format!(
            "Expected no_hover from config, got {:?}",
            other
        ))),
    }
}
