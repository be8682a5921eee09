use serde::Deserialize;

use crate::error::{AppError, AppResult, SessionError};

use super::types::Envelope;

pub const MAX_ENVELOPE_BYTES: usize = 16 * 1024 * 1024;

/// Encodes an envelope for a binary WebSocket frame.
///
/// # Errors
///
/// Returns an error when the envelope cannot be serialized.
pub fn encode_envelope(envelope: &Envelope) -> AppResult<Vec<u8>> {
    serde_json::to_vec(envelope).map_err(|err| {
        AppError::session(SessionError::Serialize {
            context: "envelope",
            source: err,
        })
    })
}

/// Decodes one envelope from a frame payload.
///
/// # Errors
///
/// Returns an error when the payload is oversized, malformed, or names a
/// message kind this client does not know.
pub fn decode_envelope(payload: &[u8]) -> AppResult<Envelope> {
    if payload.len() > MAX_ENVELOPE_BYTES {
        return Err(AppError::session(SessionError::EnvelopeTooLarge {
            max_bytes: MAX_ENVELOPE_BYTES,
        }));
    }
    serde_json::from_slice(payload).map_err(|err| {
        AppError::session(SessionError::Deserialize {
            context: "envelope",
            source: err,
        })
    })
}

#[derive(Deserialize)]
struct KindProbe {
    message: Option<TypeProbe>,
}

#[derive(Deserialize)]
struct TypeProbe {
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Best-effort recovery of the message kind from a payload that failed to
/// decode, for logging.
#[must_use]
pub fn probe_kind(payload: &[u8]) -> Option<String> {
    serde_json::from_slice::<KindProbe>(payload)
        .ok()
        .and_then(|probe| probe.message)
        .and_then(|message| message.kind)
}
