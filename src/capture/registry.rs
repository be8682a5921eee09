use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::domain::InputEvent;

use super::stream::{EventStream, StreamShared};

/// The set of currently open streams.
///
/// Cloning shares the same set. Independent registries never see each
/// other's streams or events.
#[derive(Debug, Clone, Default)]
pub struct BroadcastRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    next_id: u64,
    open: BTreeMap<u64, Arc<StreamShared>>,
}

impl BroadcastRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new capture session that sees every event delivered from now
    /// until it is closed.
    #[must_use]
    pub fn open(&self) -> EventStream {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id = inner.next_id.wrapping_add(1);
        let shared = Arc::new(StreamShared::new(id));
        inner.open.insert(id, Arc::clone(&shared));
        debug!("Opened event stream {} ({} open)", id, inner.open.len());
        drop(inner);
        EventStream::new(self.clone(), shared)
    }

    #[must_use]
    pub fn open_count(&self) -> usize {
        self.lock().open.len()
    }

    /// Inserts `event` into every open stream while holding the registry,
    /// so a concurrent close either sees the event or is already gone.
    pub(super) fn deliver(&self, event: InputEvent) -> usize {
        let inner = self.lock();
        for shared in inner.open.values() {
            shared.push(event);
        }
        inner.open.len()
    }

    pub(super) fn unregister(&self, id: u64) -> bool {
        let removed = self.lock().open.remove(&id).is_some();
        if removed {
            debug!("Unregistered event stream {}", id);
        }
        removed
    }

    // Registry mutations never leave the map half-updated, so a poisoned lock
    // is still consistent.
    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
