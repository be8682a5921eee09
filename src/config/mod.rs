//! Config file loading and CLI override application.
mod apply;
mod loader;
mod parse;
pub mod types;

#[cfg(test)]
mod tests;

pub use apply::apply_config;
pub use loader::load_config;
pub(crate) use parse::parse_duration_value;
