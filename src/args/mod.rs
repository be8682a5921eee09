//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;

#[cfg(test)]
mod tests;

pub use cli::{Command, ConnectArgs, RecordArgs, ReplayArgs, StudioArgs};
