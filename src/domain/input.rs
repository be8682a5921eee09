use serde::{Deserialize, Serialize};

use super::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// What happened, without the when.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEventKind {
    Move { x: i32, y: i32 },
    MouseDown { button: MouseButton },
    MouseUp { button: MouseButton },
}

/// A single captured input event.
///
/// `timestamp` is in milliseconds relative to an origin chosen at capture
/// time. Events are ordered by timestamp only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputEvent {
    pub timestamp: u64,
    #[serde(flatten)]
    pub kind: InputEventKind,
}

impl InputEvent {
    #[must_use]
    pub const fn new(timestamp: u64, kind: InputEventKind) -> Self {
        Self { timestamp, kind }
    }

    #[must_use]
    pub const fn moved(timestamp: u64, x: i32, y: i32) -> Self {
        Self::new(timestamp, InputEventKind::Move { x, y })
    }

    #[must_use]
    pub const fn mouse_down(timestamp: u64, button: MouseButton) -> Self {
        Self::new(timestamp, InputEventKind::MouseDown { button })
    }

    #[must_use]
    pub const fn mouse_up(timestamp: u64, button: MouseButton) -> Self {
        Self::new(timestamp, InputEventKind::MouseUp { button })
    }

    #[must_use]
    pub const fn is_move(&self) -> bool {
        matches!(self.kind, InputEventKind::Move { .. })
    }

    /// Shifts coordinate-bearing events; button events pass through as-is.
    #[must_use]
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        match self.kind {
            InputEventKind::Move { x, y } => Self {
                timestamp: self.timestamp,
                kind: InputEventKind::Move {
                    x: x.saturating_add(dx),
                    y: y.saturating_add(dy),
                },
            },
            InputEventKind::MouseDown { .. } | InputEventKind::MouseUp { .. } => self,
        }
    }
}

/// A recorded, zero-based event sequence attached to an edge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputReplay {
    #[serde(default)]
    pub events: Vec<InputEvent>,
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub relative: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Point>,
}

impl InputReplay {
    /// Replaces the event list and recomputes `duration` from the last event.
    pub fn set_events(&mut self, events: Vec<InputEvent>) {
        self.duration = events.last().map_or(0, |event| event.timestamp);
        self.events = events;
    }

    /// Translation needed to play a relative replay against `anchor`.
    ///
    /// Absolute replays and replays recorded without an offset anchor are
    /// played where they were captured.
    #[must_use]
    pub fn translation_to(&self, anchor: Point) -> (i32, i32) {
        match (self.relative, self.offset) {
            (true, Some(offset)) => (
                anchor.x.saturating_sub(offset.x),
                anchor.y.saturating_sub(offset.y),
            ),
            (true, None) | (false, _) => (0, 0),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
