use std::time::Duration;

use clap::Parser;

use super::parsers::parse_point;
use super::{Command, StudioArgs};
use crate::domain::Point;
use crate::error::{AppError, AppResult};

fn parse(args: &[&str]) -> AppResult<StudioArgs> {
    StudioArgs::try_parse_from(args)
        .map_err(|err| AppError::validation(format!("Expected parse success: {}", err)))
}

#[test]
fn connect_parses_url_and_timeout() -> AppResult<()> {
    let args = parse(&[
        "routine-studio",
        "connect",
        "--url",
        "ws://127.0.0.1:9000",
        "--query-timeout",
        "250ms",
    ])?;
    match args.command {
        Command::Connect(connect) => {
            if connect.url.as_deref() != Some("ws://127.0.0.1:9000")
                || connect.query_timeout != Some(Duration::from_millis(250))
            {
                return Err(AppError::validation(format!(
                    "Unexpected connect args {:?}",
                    connect
                )));
            }
            Ok(())
        }
        Command::Record(_) | Command::Replay(_) => {
            Err(AppError::validation("Expected connect subcommand"))
        }
    }
}

#[test]
fn replay_accepts_negative_offsets() -> AppResult<()> {
    let args = parse(&["routine-studio", "replay", "replay.json", "--dx", "-12", "--dy", "4"])?;
    match args.command {
        Command::Replay(replay) => {
            if replay.dx != -12 || replay.dy != 4 || replay.anchor.is_some() {
                return Err(AppError::validation(format!("Unexpected replay args {:?}", replay)));
            }
            Ok(())
        }
        Command::Connect(_) | Command::Record(_) => {
            Err(AppError::validation("Expected replay subcommand"))
        }
    }
}

#[test]
fn replay_rejects_anchor_with_offsets() -> AppResult<()> {
    let parsed = StudioArgs::try_parse_from([
        "routine-studio",
        "replay",
        "replay.json",
        "--dx",
        "3",
        "--anchor",
        "10,20",
    ]);
    if parsed.is_ok() {
        return Err(AppError::validation("Expected --anchor to conflict with --dx"));
    }
    Ok(())
}

#[test]
fn record_flags_and_global_verbose() -> AppResult<()> {
    let args = parse(&["routine-studio", "record", "--no-hover", "-v", "--anchor", "-5,7"])?;
    if !args.verbose {
        return Err(AppError::validation("Expected global verbose flag"));
    }
    match args.command {
        Command::Record(record) => {
            if !record.no_hover || record.anchor != Some(Point::new(-5, 7)) {
                return Err(AppError::validation(format!(
                    "Unexpected record args {:?}",
                    record
                )));
            }
            Ok(())
        }
        Command::Connect(_) | Command::Replay(_) => {
            Err(AppError::validation("Expected record subcommand"))
        }
    }
}

#[test]
fn parse_point_rejects_garbage() -> AppResult<()> {
    for value in ["", "12", "a,b", "1,2,3"] {
        if parse_point(value).is_ok() {
            return Err(AppError::validation(format!("Expected '{}' to fail", value)));
        }
    }
    Ok(())
}
