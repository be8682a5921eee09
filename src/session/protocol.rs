mod codec;
mod types;

pub use codec::{MAX_ENVELOPE_BYTES, decode_envelope, encode_envelope, probe_kind};
pub use types::*;
