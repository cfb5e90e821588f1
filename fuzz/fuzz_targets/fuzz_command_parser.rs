//! Fuzz target: `parse_command`
//!
//! Feeds arbitrary UTF-8 lines to the console parser and asserts that it
//! never panics and that every accepted line names a known command.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use envmon::console::parse_command;
use libfuzzer_sys::fuzz_target;

const NAMES: &[&str] = &[
    "sos", "help", "rc", "sc", "rtl", "rp", "mmp", "mta", "mpp", "rai", "dac", "dtl", "aa", "cai", "ir", "lr",
    "dr", "pr",
];

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    if parse_command(line).is_ok() {
        let name = line.split_whitespace().next().unwrap_or_default().to_ascii_lowercase();
        assert!(NAMES.contains(&name.as_str()), "accepted unknown command {name:?}");
    }
});
