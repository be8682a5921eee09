use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::args::RecordArgs;
use crate::capture::{BroadcastRegistry, CloseOptions, EventBroadcaster};
use crate::domain::{InputEvent, InputReplay, Point};
use crate::error::{AppError, AppResult, CaptureError};
use crate::replay::save_replay;

/// Reads JSON-lines events through a broadcaster into one stream and
/// returns the finished replay once the input ends.
pub(crate) async fn record_events<R>(
    reader: R,
    options: CloseOptions,
    anchor: Option<Point>,
) -> AppResult<InputReplay>
where
    R: AsyncBufRead + Unpin,
{
    let broadcaster = EventBroadcaster::new(BroadcastRegistry::new());
    let stream = broadcaster.registry().open();
    debug!("Recording into stream {}", stream.id());

    let mut lines = reader.lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_no = line_no.saturating_add(1);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let event: InputEvent = serde_json::from_str(trimmed).map_err(|source| {
            AppError::capture(CaptureError::InvalidEventLine {
                line: line_no,
                source,
            })
        })?;
        broadcaster.handle_input_event(event);
    }

    stream.close(options)?;
    let mut replay = InputReplay::default();
    stream.write(&mut replay).await?;
    if let Some(anchor) = anchor {
        replay.relative = true;
        replay.offset = Some(anchor);
    }
    Ok(replay)
}

/// Records stdin (or `--input`) and writes the replay to `--output` or stdout.
///
/// # Errors
///
/// Returns an error when the input cannot be read, a line is not a valid
/// event, or the replay cannot be written.
pub async fn run_record(args: &RecordArgs) -> AppResult<()> {
    let options = CloseOptions {
        no_hover: args.no_hover,
    };
    let replay = match args.input.as_deref() {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            record_events(BufReader::new(file), options, args.anchor).await?
        }
        None => record_events(BufReader::new(tokio::io::stdin()), options, args.anchor).await?,
    };

    match args.output.as_deref() {
        Some(path) => write_output(path, &replay).await?,
        None => println!("{}", serde_json::to_string_pretty(&replay)?),
    }
    Ok(())
}

async fn write_output(path: &Path, replay: &InputReplay) -> AppResult<()> {
    save_replay(path, replay).await?;
    info!(
        "Recorded {} events over {}ms to {}",
        replay.events.len(),
        replay.duration,
        path.display()
    );
    Ok(())
}
