//! Fuzz target: `PersistedSettings::from_bytes`
//!
//! Arbitrary blobs must decode to in-range settings or be rejected, never
//! panic.
//!
//! cargo fuzz run fuzz_settings_blob

#![no_main]

use envmon::config::PersistedSettings;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(settings) = PersistedSettings::from_bytes(data) {
        assert!(settings.parameters.validate().is_ok());
        assert!(settings.thresholds.validate().is_ok());
    }
});
