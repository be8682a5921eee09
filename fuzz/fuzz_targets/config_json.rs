#![no_main]

use libfuzzer_sys::fuzz_target;
use routine_studio::args::Command;

fuzz_target!(|data: &[u8]| {
    if let Ok(args) = routine_studio::fuzzing::apply_config_from_json(data) {
        if let Command::Connect(connect) = args.command {
            if let Some(timeout) = connect.query_timeout {
                debug_assert!(!timeout.is_zero());
            }
        }
    }
});
