//! Log Retirement Core Library
//!
//! Decides, for every log file a collector has recorded in its position
//! file, whether the file has been fully ingested and is old enough to
//! delete, and deletes it:
//! - Position-record parsing
//! - Live file observation (size, creation time)
//! - Dev-mode path normalization
//! - The retirement decision and the pass that applies it
//!
//! The binary entry point is in `main.rs`.

pub mod decision;
pub mod exit_codes;
pub mod logging;
pub mod normalize;
pub mod observe;
pub mod position;
pub mod retire;

pub use decision::{decide, Decision, RetirementPolicy, SkipReason};
pub use observe::{observe, FileObservation, TimestampSource};
pub use position::{parse_records, read_source, ParsedSource, PositionError, PositionRecord};
pub use retire::{EntryOutcome, Retirer, RunReport, SourceReport};
