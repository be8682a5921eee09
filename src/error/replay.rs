use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Playback requires a running tokio runtime.")]
    NoRuntime,
    #[error("Failed to read replay '{path}': {source}")]
    ReadReplay {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse replay '{path}': {source}")]
    ParseReplay {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Replay events are not sorted by timestamp (index {index}).")]
    Unsorted { index: usize },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
