//! Retirement event log.
//!
//! Every deletion (or would-be deletion in a dry run) becomes a
//! `RetirementEvent`. When an event log directory is configured the events
//! of a run are appended, one JSON object per line, to a per-day file.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::RetireError;

/// A single retirement action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetirementEvent {
    /// When the pass made the decision.
    pub timestamp: DateTime<Utc>,

    pub run_id: String,

    /// Position file the record came from.
    pub source: String,

    /// Path as recorded by the collector.
    pub path: String,

    /// Path actually deleted on this host.
    pub resolved_path: String,

    pub live_size: u64,

    pub consumed_size: u64,

    /// Collector content hash, in its recorded hex form.
    pub content_hash: String,

    /// File age at decision time, in seconds.
    pub age_secs: u64,

    /// Whether the file was left in place.
    pub dry_run: bool,
}

/// Event log file for the day containing `now`.
pub fn event_log_path(dir: &Path, now: DateTime<Utc>) -> PathBuf {
    dir.join(format!("retirement_events_{}.jsonl", now.format("%Y%m%d")))
}

/// Append events as JSONL. Returns the file written, or None if there was
/// nothing to write.
pub fn persist_events(
    events: &[RetirementEvent],
    dir: &Path,
    now: DateTime<Utc>,
) -> Result<Option<PathBuf>, RetireError> {
    if events.is_empty() {
        return Ok(None);
    }

    fs::create_dir_all(dir)?;
    let log_path = event_log_path(dir, now);

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;
    let mut writer = BufWriter::new(file);

    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    info!(
        events = events.len(),
        path = %log_path.display(),
        "Wrote retirement events"
    );
    Ok(Some(log_path))
}
