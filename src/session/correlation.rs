use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rand::Rng;
use tokio::sync::oneshot;
use tracing::debug;

/// Pending request/response exchanges keyed by correlation id.
///
/// Ids are negative so they never collide with ids assigned by the runtime.
/// Entries live until their reply arrives or they are cancelled.
pub struct CorrelationTable<T> {
    pending: Mutex<HashMap<i32, oneshot::Sender<T>>>,
}

impl<T> Default for CorrelationTable<T> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> fmt::Debug for CorrelationTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationTable")
            .field("pending", &self.len())
            .finish()
    }
}

impl<T> CorrelationTable<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh negative id and the receiver its reply resolves.
    #[must_use]
    pub fn register(&self) -> (i32, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        let mut pending = self.lock();
        let mut rng = rand::thread_rng();
        let id = loop {
            let candidate = rng.gen_range(i32::MIN..0);
            if !pending.contains_key(&candidate) {
                break candidate;
            }
        };
        pending.insert(id, tx);
        debug!("Registered query {} ({} pending)", id, pending.len());
        (id, rx)
    }

    /// Fulfils and removes the entry for `id`. Returns `false` when no entry
    /// was waiting.
    pub fn resolve(&self, id: i32, value: T) -> bool {
        let Some(tx) = self.lock().remove(&id) else {
            return false;
        };
        if tx.send(value).is_err() {
            debug!("Query {} resolved after its caller went away", id);
        }
        true
    }

    /// Drops the entry for `id` without resolving it.
    pub fn cancel(&self, id: i32) -> bool {
        self.lock().remove(&id).is_some()
    }

    #[must_use]
    pub fn contains(&self, id: i32) -> bool {
        self.lock().contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<i32, oneshot::Sender<T>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
