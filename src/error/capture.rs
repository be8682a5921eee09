use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Event stream {stream_id} is already closed.")]
    AlreadyClosed { stream_id: u64 },
    #[error("Event stream {stream_id} was dropped before it was closed.")]
    Abandoned { stream_id: u64 },
    #[error("Invalid input event on line {line}: {source}")]
    InvalidEventLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
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
