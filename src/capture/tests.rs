use std::future::Future;

use super::{BroadcastRegistry, CloseOptions, EventBroadcaster};
use crate::domain::{InputEvent, InputReplay, MouseButton};
use crate::error::{AppError, AppResult, CaptureError};

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::capture(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn timestamps(events: &[InputEvent]) -> Vec<u64> {
    events.iter().map(|event| event.timestamp).collect()
}

fn global_events() -> Vec<InputEvent> {
    (0_u64..9)
        .map(|index| {
            let coord = i32::try_from(index).unwrap_or(i32::MAX);
            InputEvent::moved(1000_u64.saturating_add(index.saturating_mul(10)), coord, coord)
        })
        .collect()
}

#[test]
fn empty_stream_yields_empty_contents() -> AppResult<()> {
    run_async_test(async {
        let registry = BroadcastRegistry::new();
        let stream = registry.open();
        stream.close(CloseOptions::default())?;
        let contents = stream.contents().await?;
        if !contents.is_empty() {
            return Err(AppError::capture(format!(
                "Expected empty contents, got {:?}",
                contents
            )));
        }
        Ok(())
    })
}

#[test]
fn close_sorts_and_zero_bases() -> AppResult<()> {
    run_async_test(async {
        let registry = BroadcastRegistry::new();
        let stream = registry.open();
        stream.insert(InputEvent::moved(500, 1, 1))?;
        stream.insert(InputEvent::mouse_down(320, MouseButton::Left))?;
        stream.insert(InputEvent::moved(410, 2, 2))?;
        stream.close(CloseOptions::default())?;
        let contents = stream.contents().await?;
        let got = timestamps(&contents);
        if got != vec![0, 90, 180] {
            return Err(AppError::capture(format!("Unexpected timestamps {:?}", got)));
        }
        if contents.first().map(|event| event.is_move()) != Some(false) {
            return Err(AppError::capture("Expected mouse down to sort first"));
        }
        Ok(())
    })
}

#[test]
fn overlapping_streams_see_only_their_window() -> AppResult<()> {
    run_async_test(async {
        let registry = BroadcastRegistry::new();
        let broadcaster = EventBroadcaster::new(registry.clone());
        let events = global_events();

        let first = registry.open();
        let mut second = None;
        for (index, event) in events.iter().enumerate() {
            if index == 3 {
                second = Some(registry.open());
            }
            broadcaster.handle_input_event(*event);
            if index == 6 {
                first.close(CloseOptions::default())?;
            }
        }
        let second = second.ok_or_else(|| AppError::capture("Second stream never opened"))?;
        second.close(CloseOptions::default())?;

        let first_contents = first.contents().await?;
        let second_contents = second.contents().await?;
        if timestamps(&first_contents) != vec![0, 10, 20, 30, 40, 50, 60] {
            return Err(AppError::capture(format!(
                "Unexpected first stream {:?}",
                timestamps(&first_contents)
            )));
        }
        if timestamps(&second_contents) != vec![0, 10, 20, 30, 40, 50] {
            return Err(AppError::capture(format!(
                "Unexpected second stream {:?}",
                timestamps(&second_contents)
            )));
        }
        let expected_first_coord = events.get(3).map(|event| event.kind);
        if second_contents.first().map(|event| event.kind) != expected_first_coord {
            return Err(AppError::capture("Second stream should start at the fourth event"));
        }
        if registry.open_count() != 0 {
            return Err(AppError::capture("Closed streams should be unregistered"));
        }
        Ok(())
    })
}

#[test]
fn no_hover_drops_moves_without_button() -> AppResult<()> {
    run_async_test(async {
        let registry = BroadcastRegistry::new();
        let broadcaster = EventBroadcaster::new(registry.clone());
        let stream = registry.open();
        let mut timestamp = 100_u64;
        for _ in 0..3 {
            for event in [
                InputEvent::moved(timestamp, 5, 5),
                InputEvent::mouse_down(timestamp.saturating_add(1), MouseButton::Left),
                InputEvent::moved(timestamp.saturating_add(2), 6, 6),
                InputEvent::mouse_up(timestamp.saturating_add(3), MouseButton::Left),
            ] {
                broadcaster.handle_input_event(event);
            }
            timestamp = timestamp.saturating_add(10);
        }
        stream.close(CloseOptions::no_hover())?;
        let contents = stream.contents().await?;
        if contents.len() != 9 {
            return Err(AppError::capture(format!(
                "Expected 9 events after filtering, got {}",
                contents.len()
            )));
        }
        let moves = contents.iter().filter(|event| event.is_move()).count();
        if moves != 3 {
            return Err(AppError::capture(format!("Expected 3 drag moves, got {}", moves)));
        }
        if contents.first().map(|event| event.timestamp) != Some(0) {
            return Err(AppError::capture("Expected zero-based first event"));
        }
        Ok(())
    })
}

#[test]
fn concurrent_waiters_share_contents() -> AppResult<()> {
    run_async_test(async {
        let registry = BroadcastRegistry::new();
        let stream = registry.open();
        let first_waiter = tokio::spawn({
            let stream = stream.clone();
            async move { stream.contents().await }
        });
        let second_waiter = tokio::spawn({
            let stream = stream.clone();
            async move { stream.contents().await }
        });
        tokio::task::yield_now().await;
        stream.insert(InputEvent::moved(7, 0, 0))?;
        stream.close(CloseOptions::default())?;

        let first = first_waiter.await??;
        let second = second_waiter.await??;
        let third = stream.contents().await?;
        if first != second || second != third || third.len() != 1 {
            return Err(AppError::capture("Waiters observed different contents"));
        }
        Ok(())
    })
}

#[test]
fn double_close_and_late_insert_are_rejected() -> AppResult<()> {
    let registry = BroadcastRegistry::new();
    let stream = registry.open();
    stream.close(CloseOptions::default())?;
    match stream.close(CloseOptions::default()) {
        Err(AppError::Capture(CaptureError::AlreadyClosed { .. })) => {}
        other => {
            return Err(AppError::capture(format!(
                "Expected AlreadyClosed on double close, got {:?}",
                other
            )));
        }
    }
    match stream.insert(InputEvent::moved(1, 1, 1)) {
        Err(AppError::Capture(CaptureError::AlreadyClosed { .. })) => Ok(()),
        other => Err(AppError::capture(format!(
            "Expected AlreadyClosed on insert, got {:?}",
            other
        ))),
    }
}

#[test]
fn write_populates_replay() -> AppResult<()> {
    run_async_test(async {
        let registry = BroadcastRegistry::new();

        let empty = registry.open();
        empty.close(CloseOptions::default())?;
        let mut replay = InputReplay::default();
        empty.write(&mut replay).await?;
        if !replay.events.is_empty() || replay.duration != 0 {
            return Err(AppError::capture(format!("Unexpected empty replay {:?}", replay)));
        }

        let single = registry.open();
        single.insert(InputEvent::mouse_down(250, MouseButton::Right))?;
        single.close(CloseOptions::default())?;
        single.write(&mut replay).await?;
        let expected = InputEvent::mouse_down(0, MouseButton::Right);
        if replay.events != vec![expected] || replay.duration != expected.timestamp {
            return Err(AppError::capture(format!("Unexpected single replay {:?}", replay)));
        }
        Ok(())
    })
}

#[test]
fn separate_registries_are_isolated() -> AppResult<()> {
    let left = BroadcastRegistry::new();
    let right = BroadcastRegistry::new();
    let left_stream = left.open();
    let right_stream = right.open();
    let delivered =
        EventBroadcaster::new(left.clone()).handle_input_event(InputEvent::moved(1, 0, 0));
    if delivered != 1 {
        return Err(AppError::capture(format!("Expected one delivery, got {}", delivered)));
    }
    left_stream.close(CloseOptions::default())?;
    right_stream.close(CloseOptions::default())?;
    let left_len = left_stream.try_contents().map(|events| events.len());
    let right_len = right_stream.try_contents().map(|events| events.len());
    if left_len != Some(1) || right_len != Some(0) {
        return Err(AppError::capture(format!(
            "Unexpected isolation result left={:?} right={:?}",
            left_len, right_len
        )));
    }
    Ok(())
}
