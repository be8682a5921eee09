//! Core library for the `routine-studio` CLI.
//!
//! The crate captures live input into replayable recordings, plays them back
//! on the original timing, and keeps a routine graph in sync with a remote
//! runtime over a single WebSocket session. The binary wires these pieces to
//! a small command-line surface; library APIs may evolve with it.
pub mod app;
pub mod args;
pub mod capture;
pub mod config;
pub mod domain;
pub mod entry;
pub mod error;
pub mod logger;
pub mod replay;
pub mod session;
pub mod shutdown;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;
