use tokio::sync::{mpsc, watch};
use tracing::info;

use crate::args::ReplayArgs;
use crate::domain::{InputEvent, InputReplay, Point};
use crate::error::AppResult;
use crate::replay::{ReplaySource, load_replay};
use crate::shutdown::{ShutdownReceiver, setup_signal_shutdown_handler, shutdown_channel};

/// Where a replay lands on screen.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Placement {
    Offset { dx: i32, dy: i32 },
    Anchor(Point),
}

/// Plays `replay` and hands each delivered event to `emit` in order.
/// Returns the number of events delivered before the end or a shutdown.
pub(crate) async fn drive_playback<F>(
    replay: &InputReplay,
    placement: Placement,
    mut shutdown_rx: ShutdownReceiver,
    mut emit: F,
) -> AppResult<usize>
where
    F: FnMut(&InputEvent) -> AppResult<()>,
{
    let source = ReplaySource::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<InputEvent>();
    let (end_tx, mut end_rx) = watch::channel(false);
    source.set_callback(move |event| {
        drop(event_tx.send(event));
    });
    source.set_end_callback(move || {
        end_tx.send_replace(true);
    });

    match placement {
        Placement::Offset { dx, dy } => source.play(replay, dx, dy)?,
        Placement::Anchor(anchor) => source.play_relative(replay, anchor)?,
    }

    let mut delivered = 0usize;
    loop {
        tokio::select! {
            biased;
            Some(event) = event_rx.recv() => {
                emit(&event)?;
                delivered = delivered.saturating_add(1);
            }
            _ = end_rx.wait_for(|ended| *ended) => break,
            _ = shutdown_rx.recv() => {
                source.stop();
                break;
            }
        }
    }

    while let Ok(event) = event_rx.try_recv() {
        emit(&event)?;
        delivered = delivered.saturating_add(1);
    }
    Ok(delivered)
}

/// Plays a replay file, printing every event as a JSON line.
///
/// # Errors
///
/// Returns an error when the file cannot be loaded or is not playable.
pub async fn run_replay(args: &ReplayArgs) -> AppResult<()> {
    let replay = load_replay(&args.file).await?;
    let placement = args.anchor.map_or(
        Placement::Offset {
            dx: args.dx,
            dy: args.dy,
        },
        Placement::Anchor,
    );
    info!(
        "Playing {} events over {}ms from {}",
        replay.events.len(),
        replay.duration,
        args.file.display()
    );

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let signal_task = setup_signal_shutdown_handler(&shutdown_tx);
    let delivered = drive_playback(&replay, placement, shutdown_rx, |event| {
        println!("{}", serde_json::to_string(event)?);
        Ok(())
    })
    .await?;
    drop(shutdown_tx.send(()));
    signal_task.await?;

    info!("Delivered {} of {} events", delivered, replay.events.len());
    Ok(())
}
