//! Fuzz target for retire.json parsing.
//!
//! Tests that config parsing and validation handle arbitrary input
//! without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lr_config::{validate_config, RetireConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = serde_json::from_slice::<RetireConfig>(data) {
        let _ = validate_config(&config);
    }
});
