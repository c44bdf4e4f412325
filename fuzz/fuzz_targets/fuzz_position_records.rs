//! Fuzz target for position-file parsing.
//!
//! Tests that `parse_records` handles arbitrary bytes without panicking and
//! that every accepted record re-encodes to a line that parses back to it.

#![no_main]

use libfuzzer_sys::fuzz_target;
use lr_core::position::{parse_records, PositionRecord};

fuzz_target!(|data: &[u8]| {
    let parsed = parse_records(data);
    for record in &parsed.records {
        let line = record.to_line();
        let reparsed = PositionRecord::parse_line(&line);
        assert_eq!(reparsed.as_ref(), Ok(record));
    }
});
