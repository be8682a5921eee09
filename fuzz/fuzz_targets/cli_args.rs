#![no_main]

use clap::Parser;
use libfuzzer_sys::fuzz_target;
use routine_studio::args::{Command, StudioArgs};

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let mut args = Vec::new();
        args.push("routine-studio".to_owned());
        for token in input.split_whitespace().take(64) {
            args.push(token.to_owned());
        }
        let arg_refs: Vec<&str> = args.iter().map(|value| value.as_str()).collect();
        if let Ok(parsed) = StudioArgs::try_parse_from(arg_refs) {
            if let Command::Replay(replay) = parsed.command {
                if replay.anchor.is_some() {
                    debug_assert!(replay.dx == 0 && replay.dy == 0);
                }
            }
        }
    }
});
