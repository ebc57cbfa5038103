//! Fuzz target: serial configuration intake.
//!
//! Drives arbitrary operator input through the line parser and asserts
//! that it never panics and that any configuration it completes honours
//! the duration clamp.
//!
//! cargo fuzz run fuzz_intake

#![no_main]

use libfuzzer_sys::fuzz_target;
use strainlog::intake::{ConfigIntake, Progress, parse_yes_no};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    const MAX: u32 = 60;
    let mut intake = ConfigIntake::new();
    for line in text.lines() {
        if let Progress::Complete(cfg) = intake.push_line(line, MAX) {
            assert!(
                (1..=MAX).contains(&cfg.duration_secs),
                "clamp violated: {}",
                cfg.duration_secs
            );
            intake.reset();
        }
    }

    // The rerun reply parser must accept anything without panicking.
    let _ = parse_yes_no(text);
});
