//! Subcommand implementations driven by [`crate::entry`].
mod connect;
mod record;
mod replay;


pub use connect::run_connect;
pub use record::run_record;
pub use replay::run_replay;
