//! Session protocol coordination with the routine runtime.
//!
//! One duplex WebSocket carries [`Envelope`]s both ways. Outbound requests
//! are fire-and-forget except [`SessionClient::query_condition`], which is
//! matched to its reply through a [`CorrelationTable`]. Inbound messages
//! update the published [`SessionState`].
mod client;
mod connection;
mod correlation;
mod protocol;
mod state;
mod store;

pub use client::{SessionClient, SessionOptions};
pub use connection::{DEFAULT_CONNECT_TIMEOUT, SessionHandle, connect, parse_session_url};
pub use correlation::CorrelationTable;
pub use protocol::{
    ConfigurationMessage, Envelope, FrameOperation, FrameOperationMessage, GotoMessage,
    InputEventMessage, MAX_ENVELOPE_BYTES, QueueEdgeMessage, RoutineMessage,
    SampleConditionMessage, SetCurrMessage, WireMessage, decode_envelope, encode_envelope,
};
pub use state::SessionState;
pub use store::{JsonFileRoutineStore, MemoryRoutineStore, RoutineStore};
