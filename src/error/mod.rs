mod app;
mod capture;
mod config;
mod replay;
mod session;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use capture::CaptureError;
pub use config::ConfigError;
pub use replay::ReplayError;
pub use session::SessionError;
pub use validation::ValidationError;
