//! Concurrent input capture.
//!
//! A [`BroadcastRegistry`] tracks every open [`EventStream`]. The
//! [`EventBroadcaster`] pushes each observed event into all streams open at
//! that moment. Streams only expose their contents once closed, sorted and
//! zero-based.
mod broadcaster;
mod process;
mod registry;
mod stream;

pub use broadcaster::EventBroadcaster;
pub use process::CloseOptions;
pub use registry::BroadcastRegistry;
pub use stream::EventStream;

#[cfg(test)]
mod tests;
