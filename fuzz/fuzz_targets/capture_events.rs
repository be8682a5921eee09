#![no_main]

use libfuzzer_sys::fuzz_target;
use routine_studio::domain::InputEvent;

fuzz_target!(|data: &[u8]| {
    let events: Vec<InputEvent> = serde_json::from_slice(data).unwrap_or_default();
    let no_hover = data.first().is_some_and(|byte| byte & 1 == 1);
    if let Ok(contents) = routine_studio::fuzzing::capture_events(&events, no_hover) {
        debug_assert!(contents.len() <= events.len());
        debug_assert!(contents.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
        if let Some(first) = contents.first() {
            debug_assert_eq!(first.timestamp, 0);
        }
    }
});
