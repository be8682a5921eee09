use std::cell::RefCell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::domain::{InputEvent, InputReplay, Point};
use crate::error::{AppError, AppResult, ReplayError};

pub type EventCallback = Arc<dyn Fn(InputEvent) + Send + Sync>;
pub type EndCallback = Arc<dyn Fn() + Send + Sync>;

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(0);

thread_local! {
    /// Sources whose callback is running on this thread.
    static IN_CALLBACK: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Plays one [`InputReplay`] at a time against a single event callback.
///
/// Starting a new playback supersedes the current one. Both natural
/// completion and `stop` fire the end callback, once per playback. Once
/// `stop` returns, no event of the stopped playback is delivered, even when
/// playback runs on another worker thread.
#[derive(Clone)]
pub struct ReplaySource {
    shared: Arc<Shared>,
}

struct Shared {
    id: u64,
    // Held across the generation check and the event callback, and by
    // `stop`/`play` while they retire a playback.
    gate: Mutex<()>,
    state: Mutex<ReplayInner>,
}

#[derive(Default)]
struct ReplayInner {
    on_event: Option<EventCallback>,
    on_end: Option<EndCallback>,
    generation: u64,
    active: Option<ActivePlayback>,
}

struct ActivePlayback {
    generation: u64,
    start: Instant,
    end: Instant,
    task: JoinHandle<()>,
}

/// Marks this thread as running a callback of one source, so a nested
/// `stop` or `play` from inside it does not wait on the gate it holds.
struct CallbackScope {
    id: u64,
}

impl CallbackScope {
    fn enter(id: u64) -> Self {
        IN_CALLBACK.with(|ids| ids.borrow_mut().push(id));
        Self { id }
    }

    fn is_inside(id: u64) -> bool {
        IN_CALLBACK.with(|ids| ids.borrow().contains(&id))
    }
}

impl Drop for CallbackScope {
    fn drop(&mut self) {
        IN_CALLBACK.with(|ids| {
            let mut ids = ids.borrow_mut();
            if let Some(index) = ids.iter().rposition(|id| *id == self.id) {
                ids.remove(index);
            }
        });
    }
}

impl Default for ReplaySource {
    fn default() -> Self {
        Self {
            shared: Arc::new(Shared {
                id: NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed),
                gate: Mutex::new(()),
                state: Mutex::new(ReplayInner::default()),
            }),
        }
    }
}

impl fmt::Debug for ReplaySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("ReplaySource")
            .field("id", &self.shared.id)
            .field("generation", &inner.generation)
            .field("playing", &inner.active.is_some())
            .finish()
    }
}

impl ReplaySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the per-event callback.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(InputEvent) + Send + Sync + 'static,
    {
        self.lock().on_event = Some(Arc::new(callback));
    }

    /// Replaces the completion callback.
    pub fn set_end_callback<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.lock().on_end = Some(Arc::new(callback));
    }

    /// Starts playing `replay`, shifting move events by `(dx, dy)`.
    ///
    /// Any playback in progress is stopped first, which fires its end
    /// callback.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::NoRuntime`] outside a tokio runtime and
    /// [`ReplayError::Unsorted`] when the events are out of order.
    pub fn play(&self, replay: &InputReplay, dx: i32, dy: i32) -> AppResult<()> {
        let handle = Handle::try_current()
            .map_err(|_outside| AppError::replay(ReplayError::NoRuntime))?;
        if let Some(index) = replay
            .events
            .windows(2)
            .position(|pair| matches!(pair, [prev, next] if prev.timestamp > next.timestamp))
        {
            return Err(AppError::replay(ReplayError::Unsorted {
                index: index.saturating_add(1),
            }));
        }

        let events: Arc<[InputEvent]> = replay
            .events
            .iter()
            .map(|event| event.translated(dx, dy))
            .collect();
        let last = events.last().map_or(0, |event| event.timestamp);
        let event_count = events.len();

        let _gate = self.gate();
        let mut inner = self.lock();
        let superseded = inner.active.take();
        if let Some(previous) = superseded.as_ref() {
            previous.task.abort();
        }
        inner.generation = inner.generation.wrapping_add(1);
        let generation = inner.generation;
        let start = Instant::now();
        let end = deadline(start, last);
        // Spawned under the lock so the task cannot finish before it is recorded.
        let task = handle.spawn(run_playback(self.clone(), generation, start, events));
        inner.active = Some(ActivePlayback {
            generation,
            start,
            end,
            task,
        });
        let on_end = inner.on_end.clone();
        drop(inner);

        if let Some(previous) = superseded {
            debug!("Playback {} superseded by {}", previous.generation, generation);
            self.fire_end(on_end.as_ref());
        }
        debug!(
            "Playback {} started ({} events, {}ms, offset {},{})",
            generation, event_count, last, dx, dy
        );
        Ok(())
    }

    /// Plays a relative replay so that its recorded anchor lands on `anchor`.
    ///
    /// # Errors
    ///
    /// Same as [`ReplaySource::play`].
    pub fn play_relative(&self, replay: &InputReplay, anchor: Point) -> AppResult<()> {
        let (dx, dy) = replay.translation_to(anchor);
        self.play(replay, dx, dy)
    }

    /// Halts the current playback and fires the end callback. Returns `false`
    /// when nothing was playing.
    pub fn stop(&self) -> bool {
        let _gate = self.gate();
        let mut inner = self.lock();
        let Some(active) = inner.active.take() else {
            return false;
        };
        active.task.abort();
        let on_end = inner.on_end.clone();
        drop(inner);
        debug!("Playback {} stopped", active.generation);
        self.fire_end(on_end.as_ref());
        true
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.lock().active.is_some()
    }

    /// `-1.0` when idle, otherwise elapsed time over the time of the last
    /// event, in `[0, 1]`.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "Progress is a fraction of the playback duration"
    )]
    pub fn progress(&self) -> f64 {
        let inner = self.lock();
        let Some(active) = inner.active.as_ref() else {
            return -1.0;
        };
        let total = active.end.saturating_duration_since(active.start).as_secs_f64();
        if total <= 0.0 {
            return 1.0;
        }
        let elapsed = Instant::now()
            .saturating_duration_since(active.start)
            .as_secs_f64();
        (elapsed / total).clamp(0.0, 1.0)
    }

    /// Delivers `event` if `generation` is still the active playback.
    /// Returns `false` once the playback was stopped or superseded.
    fn deliver(&self, generation: u64, event: InputEvent) -> bool {
        let _gate = self.gate();
        let callback = {
            let inner = self.lock();
            match inner.active.as_ref() {
                Some(active) if active.generation == generation => inner.on_event.clone(),
                Some(_) | None => return false,
            }
        };
        if let Some(callback) = callback {
            trace!("Playback {} delivering event at {}ms", generation, event.timestamp);
            let _scope = CallbackScope::enter(self.shared.id);
            callback(event);
        }
        true
    }

    fn finish(&self, generation: u64) {
        let _gate = self.gate();
        let mut inner = self.lock();
        let current = inner
            .active
            .as_ref()
            .is_some_and(|active| active.generation == generation);
        if !current {
            return;
        }
        inner.active = None;
        let on_end = inner.on_end.clone();
        drop(inner);
        debug!("Playback {} finished", generation);
        self.fire_end(on_end.as_ref());
    }

    fn fire_end(&self, on_end: Option<&EndCallback>) {
        if let Some(on_end) = on_end {
            let _scope = CallbackScope::enter(self.shared.id);
            on_end();
        }
    }

    /// `None` when called from inside one of this source's callbacks, which
    /// already hold the gate.
    fn gate(&self) -> Option<MutexGuard<'_, ()>> {
        if CallbackScope::is_inside(self.shared.id) {
            return None;
        }
        Some(self.shared.gate.lock().unwrap_or_else(PoisonError::into_inner))
    }

    // Callbacks run outside the state lock, so poisoning never leaves partial
    // state.
    fn lock(&self) -> MutexGuard<'_, ReplayInner> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

fn deadline(start: Instant, offset_ms: u64) -> Instant {
    start
        .checked_add(Duration::from_millis(offset_ms))
        .unwrap_or(start)
}

/// Each event sleeps until `start + timestamp`, recomputed against the clock
/// at every step, so timer slack never accumulates.
async fn run_playback(
    source: ReplaySource,
    generation: u64,
    start: Instant,
    events: Arc<[InputEvent]>,
) {
    for event in events.iter() {
        tokio::time::sleep_until(deadline(start, event.timestamp)).await;
        if !source.deliver(generation, *event) {
            return;
        }
    }
    source.finish(generation);
}
