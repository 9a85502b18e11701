//! Fuzz target for JSON / JSON Lines record loading.
//!
//! Goal: The loader should **never panic** on any input.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_json_records
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let _ = fallback_store::fuzz::parse_json_records(text);
    }
});
