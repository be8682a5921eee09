use tracing::trace;

use crate::domain::InputEvent;

use super::registry::BroadcastRegistry;

/// Routes observed input events to all currently open streams.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    registry: BroadcastRegistry,
}

impl EventBroadcaster {
    #[must_use]
    pub const fn new(registry: BroadcastRegistry) -> Self {
        Self { registry }
    }

    #[must_use]
    pub const fn registry(&self) -> &BroadcastRegistry {
        &self.registry
    }

    /// Delivers `event` to every stream open right now and returns how many
    /// received it. Streams opened later never see it.
    pub fn handle_input_event(&self, event: InputEvent) -> usize {
        let delivered = self.registry.deliver(event);
        trace!("Broadcast event at {}ms to {} streams", event.timestamp, delivered);
        delivered
    }
}
