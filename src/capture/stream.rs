use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::domain::{InputEvent, InputReplay};
use crate::error::{AppError, AppResult, CaptureError};

use super::process::{CloseOptions, finalize};
use super::registry::BroadcastRegistry;

type Contents = Option<Arc<[InputEvent]>>;

#[derive(Debug)]
pub(super) struct StreamShared {
    id: u64,
    buffer: Mutex<Option<Vec<InputEvent>>>,
    done: watch::Sender<Contents>,
}

impl StreamShared {
    pub(super) fn new(id: u64) -> Self {
        let (done, _) = watch::channel(None);
        Self {
            id,
            buffer: Mutex::new(Some(Vec::new())),
            done,
        }
    }

    /// Appends to the live buffer. Returns `false` once the stream is sealed.
    pub(super) fn push(&self, event: InputEvent) -> bool {
        match self.lock_buffer().as_mut() {
            Some(buffer) => {
                buffer.push(event);
                true
            }
            None => false,
        }
    }

    fn seal(&self) -> Option<Vec<InputEvent>> {
        self.lock_buffer().take()
    }

    fn lock_buffer(&self) -> MutexGuard<'_, Option<Vec<InputEvent>>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Handle to one capture session.
///
/// Clones refer to the same stream, so several tasks can wait on
/// [`EventStream::contents`] at once.
#[derive(Debug, Clone)]
pub struct EventStream {
    registry: BroadcastRegistry,
    shared: Arc<StreamShared>,
}

impl EventStream {
    pub(super) const fn new(registry: BroadcastRegistry, shared: Arc<StreamShared>) -> Self {
        Self { registry, shared }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.done.borrow().is_some()
    }

    /// Appends an event to this stream only. Order does not matter; events
    /// are sorted on close.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::AlreadyClosed`] when the stream was closed.
    pub fn insert(&self, event: InputEvent) -> AppResult<()> {
        if self.shared.push(event) {
            return Ok(());
        }
        warn!("Insert into closed event stream {}", self.id());
        Err(AppError::capture(CaptureError::AlreadyClosed {
            stream_id: self.id(),
        }))
    }

    /// Stops collecting, then sorts, filters and zero-bases the buffer and
    /// wakes every waiter.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::AlreadyClosed`] on a second close.
    pub fn close(&self, options: CloseOptions) -> AppResult<()> {
        self.registry.unregister(self.id());
        let Some(events) = self.shared.seal() else {
            warn!("Event stream {} closed twice", self.id());
            return Err(AppError::capture(CaptureError::AlreadyClosed {
                stream_id: self.id(),
            }));
        };
        let collected = events.len();
        let events: Arc<[InputEvent]> = finalize(events, options).into();
        debug!(
            "Closed event stream {} ({} collected, {} kept, no_hover={})",
            self.id(),
            collected,
            events.len(),
            options.no_hover
        );
        self.shared.done.send_replace(Some(events));
        Ok(())
    }

    /// Waits for `close` and returns the frozen contents. Every caller gets
    /// the same list.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::Abandoned`] if the completion cell disappears
    /// before the stream is closed.
    pub async fn contents(&self) -> AppResult<Arc<[InputEvent]>> {
        let mut done = self.shared.done.subscribe();
        let contents = done.wait_for(Option::is_some).await.map_err(|_closed| {
            AppError::capture(CaptureError::Abandoned {
                stream_id: self.id(),
            })
        })?;
        contents.as_ref().map(Arc::clone).ok_or_else(|| {
            AppError::capture(CaptureError::Abandoned {
                stream_id: self.id(),
            })
        })
    }

    /// Returns the contents if the stream is already closed.
    #[must_use]
    pub fn try_contents(&self) -> Option<Arc<[InputEvent]>> {
        self.shared.done.borrow().as_ref().map(Arc::clone)
    }

    /// Waits for the contents and stores them in `replay`, with `duration`
    /// set to the last aligned timestamp.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`EventStream::contents`].
    pub async fn write(&self, replay: &mut InputReplay) -> AppResult<()> {
        let events = self.contents().await?;
        replay.set_events(events.to_vec());
        Ok(())
    }
}
