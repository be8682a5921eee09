#![no_main]

use libfuzzer_sys::fuzz_target;
use routine_studio::session::{MAX_ENVELOPE_BYTES, decode_envelope, encode_envelope};

fuzz_target!(|data: &[u8]| {
    if let Ok(envelope) = decode_envelope(data) {
        debug_assert!(data.len() <= MAX_ENVELOPE_BYTES);
        if let Ok(encoded) = encode_envelope(&envelope) {
            let again = decode_envelope(&encoded).ok();
            debug_assert!(again.map(|value| value.message.kind()) == Some(envelope.message.kind()));
        }
    }
});
