//! Data model shared by capture, replay and the session protocol.
mod frame;
mod geometry;
mod input;
mod routine;

pub use frame::{Frame, FrameBlob, PNG_MIME};
pub use geometry::{Point, Region, Span};
pub use input::{InputEvent, InputEventKind, InputReplay, MouseButton};
pub use routine::{
    Condition, Edge, EdgeId, MatchResult, Node, NodeId, Routine, RuntimeContext, ScreenDimensions,
};
