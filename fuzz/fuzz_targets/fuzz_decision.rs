//! Fuzz target for the retirement decision.
//!
//! Whatever the sizes and ages, a file is only ever deleted when it is old
//! enough and its size is within tolerance of the recorded offset.

#![no_main]

use arbitrary::Arbitrary;
use chrono::{Duration as ChronoDuration, Utc};
use libfuzzer_sys::fuzz_target;
use lr_config::SizePolicy;
use lr_core::{decide, FileObservation, PositionRecord, RetirementPolicy};
use std::time::Duration;

#[derive(Debug, Arbitrary)]
struct Input {
    live_size: u64,
    consumed_size: u64,
    age_secs: u32,
    min_age_secs: u32,
    tolerance_bytes: Option<u16>,
}

fuzz_target!(|input: Input| {
    let now = Utc::now();
    let size_policy = match input.tolerance_bytes {
        Some(t) => SizePolicy::Tolerant {
            tolerance_bytes: u64::from(t),
        },
        None => SizePolicy::Strict,
    };
    let policy = RetirementPolicy::new(
        Duration::from_secs(u64::from(input.min_age_secs)),
        size_policy,
    );
    let record = PositionRecord::new("/var/log/app/fuzz.log", input.consumed_size, 1);
    let observation = FileObservation {
        live_size: input.live_size,
        created_at: Some(now - ChronoDuration::seconds(i64::from(input.age_secs))),
    };

    if decide(&record, Some(&observation), &policy, now).is_delete() {
        assert!(input.age_secs >= input.min_age_secs);
        assert!(size_policy.is_consumed(input.live_size, input.consumed_size));
    }
});
