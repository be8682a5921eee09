use crate::domain::{InputEvent, InputEventKind};

/// Post-processing applied when a stream is closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseOptions {
    /// Drop pointer moves while no button is held.
    pub no_hover: bool,
}

impl CloseOptions {
    #[must_use]
    pub const fn no_hover() -> Self {
        Self { no_hover: true }
    }
}

pub(super) fn finalize(mut events: Vec<InputEvent>, options: CloseOptions) -> Vec<InputEvent> {
    events.sort_by_key(|event| event.timestamp);
    if options.no_hover {
        events = drop_hover(events);
    }
    zero_base(&mut events);
    events
}

fn drop_hover(events: Vec<InputEvent>) -> Vec<InputEvent> {
    let mut dragging = false;
    events
        .into_iter()
        .filter(|event| match event.kind {
            InputEventKind::MouseDown { .. } => {
                dragging = true;
                true
            }
            InputEventKind::MouseUp { .. } => {
                dragging = false;
                true
            }
            InputEventKind::Move { .. } => dragging,
        })
        .collect()
}

fn zero_base(events: &mut [InputEvent]) {
    let Some(origin) = events.first().map(|event| event.timestamp) else {
        return;
    };
    for event in events.iter_mut() {
        event.timestamp = event.timestamp.saturating_sub(origin);
    }
}
