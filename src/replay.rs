//! Timed playback of captured input.
mod file;
mod source;

pub use file::{load_replay, save_replay};
pub use source::{EndCallback, EventCallback, ReplaySource};
