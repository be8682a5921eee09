use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid session URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Unsupported session URL scheme '{scheme}'. Use ws or wss.")]
    UnsupportedScheme { scheme: String },
    #[error("Connection error to {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: Box<tokio_tungstenite::tungstenite::Error>,
    },
    #[error("Handshake with {url} timed out after {timeout_ms}ms.")]
    ConnectTimeout { url: String, timeout_ms: u64 },
    #[error("WebSocket error during {context}: {source}")]
    WebSocket {
        context: &'static str,
        #[source]
        source: Box<tokio_tungstenite::tungstenite::Error>,
    },
    #[error("Envelope exceeded max size ({max_bytes} bytes).")]
    EnvelopeTooLarge { max_bytes: usize },
    #[error("Serialization error during {context}: {source}")]
    Serialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Deserialization error during {context}: {source}")]
    Deserialize {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Frame {frame} is missing {field}.")]
    MissingData {
        frame: String,
        field: &'static str,
    },
    #[error("Frame {frame} has invalid base64 data: {source}")]
    InvalidFrameData {
        frame: String,
        #[source]
        source: base64::DecodeError,
    },
    #[error("Query {id} timed out after {timeout_ms}ms.")]
    QueryTimeout { id: i32, timeout_ms: u64 },
    #[error("Query {id} was abandoned before a reply arrived.")]
    QueryAbandoned { id: i32 },
    #[error("Outbound channel closed.")]
    OutboundClosed,
    #[error("Failed to read routine store '{path}': {source}")]
    ReadStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write routine store '{path}': {source}")]
    WriteStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
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
