//! Per-entry, per-source and per-run outcome reporting.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decision::SkipReason;

/// What happened to one position record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntryOutcome {
    /// File removed by this pass.
    Deleted,
    /// Dry run: the file would have been removed.
    WouldDelete,
    /// Eligible, but removed by someone else between stat and delete.
    AlreadyGone,
    /// Kept.
    Skipped { reason: SkipReason },
    /// Stat or delete failed for a reason other than not-found.
    Failed { error: String },
}

/// Outcome for one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReport {
    /// Path as recorded by the collector.
    pub path: String,
    /// Path actually touched on this host.
    pub resolved_path: PathBuf,
    #[serde(flatten)]
    pub outcome: EntryOutcome,
}

/// State of a record source after reading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Read,
    Missing,
    Unreadable,
}

/// Tally of entry outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub deleted: usize,
    pub would_delete: usize,
    pub already_gone: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
    pub failed: usize,
}

impl OutcomeCounts {
    pub fn record(&mut self, outcome: &EntryOutcome) {
        match outcome {
            EntryOutcome::Deleted => self.deleted += 1,
            EntryOutcome::WouldDelete => self.would_delete += 1,
            EntryOutcome::AlreadyGone => self.already_gone += 1,
            EntryOutcome::Skipped { reason } => *self.skipped.entry(*reason).or_default() += 1,
            EntryOutcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn merge(&mut self, other: &OutcomeCounts) {
        self.deleted += other.deleted;
        self.would_delete += other.would_delete;
        self.already_gone += other.already_gone;
        for (reason, count) in &other.skipped {
            *self.skipped.entry(*reason).or_default() += count;
        }
        self.failed += other.failed;
    }

    pub fn skipped(&self, reason: SkipReason) -> usize {
        self.skipped.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Result of processing one record source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReport {
    pub source: PathBuf,
    pub status: SourceStatus,
    pub records: usize,
    pub malformed_lines: usize,
    pub counts: OutcomeCounts,
    pub entries: Vec<EntryReport>,
}

impl SourceReport {
    pub fn new(source: PathBuf, status: SourceStatus) -> Self {
        Self {
            source,
            status,
            records: 0,
            malformed_lines: 0,
            counts: OutcomeCounts::default(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: EntryReport) {
        self.counts.record(&entry.outcome);
        self.entries.push(entry);
    }

    /// Outcome recorded for a collector path, if any.
    pub fn outcome_for(&self, path: &str) -> Option<&EntryOutcome> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| &e.outcome)
    }
}

/// Result of one full retirement pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub sources: Vec<SourceReport>,
    pub totals: OutcomeCounts,
    /// Where retirement events were written, if anywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_log: Option<PathBuf>,
}

impl RunReport {
    pub fn new(run_id: String, started_at: DateTime<Utc>, dry_run: bool) -> Self {
        Self {
            run_id,
            started_at,
            dry_run,
            sources: Vec::new(),
            totals: OutcomeCounts::default(),
            event_log: None,
        }
    }

    pub fn push(&mut self, source: SourceReport) {
        self.totals.merge(&source.counts);
        self.sources.push(source);
    }

    /// Human-readable summary for the terminal.
    pub fn render_human(&self) -> String {
        let mut out = String::new();
        let mode = if self.dry_run { " (dry run)" } else { "" };
        let _ = writeln!(out, "Retirement run {}{}", self.run_id, mode);

        for source in &self.sources {
            let _ = writeln!(out, "  {}", source.source.display());
            match source.status {
                SourceStatus::Missing => {
                    let _ = writeln!(out, "    position file not found");
                    continue;
                }
                SourceStatus::Unreadable => {
                    let _ = writeln!(out, "    position file unreadable");
                    continue;
                }
                SourceStatus::Read => {}
            }
            let _ = writeln!(
                out,
                "    {} records, {} malformed lines",
                source.records, source.malformed_lines
            );
            render_counts(&mut out, &source.counts, "    ");
        }

        let _ = writeln!(out, "Totals:");
        render_counts(&mut out, &self.totals, "  ");
        out
    }
}

fn render_counts(out: &mut String, counts: &OutcomeCounts, indent: &str) {
    let _ = writeln!(out, "{}deleted: {}", indent, counts.deleted);
    if counts.would_delete > 0 {
        let _ = writeln!(out, "{}would delete: {}", indent, counts.would_delete);
    }
    if counts.already_gone > 0 {
        let _ = writeln!(out, "{}already gone: {}", indent, counts.already_gone);
    }
    for (reason, count) in &counts.skipped {
        let _ = writeln!(out, "{}skipped ({}): {}", indent, reason, count);
    }
    if counts.failed > 0 {
        let _ = writeln!(out, "{}failed: {}", indent, counts.failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, outcome: EntryOutcome) -> EntryReport {
        EntryReport {
            path: path.to_string(),
            resolved_path: PathBuf::from(path),
            outcome,
        }
    }

    #[test]
    fn test_counts_and_merge() {
        let mut a = SourceReport::new(PathBuf::from("/pos/a.pos"), SourceStatus::Read);
        a.push(entry("/a1.log", EntryOutcome::Deleted));
        a.push(entry(
            "/a2.log",
            EntryOutcome::Skipped {
                reason: SkipReason::TooYoung,
            },
        ));

        let mut b = SourceReport::new(PathBuf::from("/pos/b.pos"), SourceStatus::Read);
        b.push(entry(
            "/b1.log",
            EntryOutcome::Skipped {
                reason: SkipReason::TooYoung,
            },
        ));
        b.push(entry(
            "/b2.log",
            EntryOutcome::Failed {
                error: "permission denied".to_string(),
            },
        ));

        let mut run = RunReport::new("run-test".to_string(), Utc::now(), false);
        run.push(a);
        run.push(b);

        assert_eq!(run.totals.deleted, 1);
        assert_eq!(run.totals.skipped(SkipReason::TooYoung), 2);
        assert_eq!(run.totals.total_skipped(), 2);
        assert_eq!(run.totals.failed, 1);
        assert_eq!(
            run.sources[0].outcome_for("/a1.log"),
            Some(&EntryOutcome::Deleted)
        );
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_value(entry(
            "/x.log",
            EntryOutcome::Skipped {
                reason: SkipReason::SizeMismatch,
            },
        ))
        .unwrap();
        assert_eq!(json["outcome"], "skipped");
        assert_eq!(json["reason"], "size_mismatch");
        assert_eq!(json["path"], "/x.log");
    }

    #[test]
    fn test_counts_serialize_reason_keys() {
        let mut counts = OutcomeCounts::default();
        counts.record(&EntryOutcome::Skipped {
            reason: SkipReason::NotFound,
        });
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["skipped"]["not_found"], 1);
    }

    #[test]
    fn test_render_human() {
        let mut source = SourceReport::new(PathBuf::from("/pos/a.pos"), SourceStatus::Read);
        source.records = 2;
        source.push(entry("/a1.log", EntryOutcome::Deleted));
        source.push(entry(
            "/a2.log",
            EntryOutcome::Skipped {
                reason: SkipReason::SizeMismatch,
            },
        ));
        let mut run = RunReport::new("run-abc".to_string(), Utc::now(), true);
        run.push(source);
        run.push(SourceReport::new(
            PathBuf::from("/pos/missing.pos"),
            SourceStatus::Missing,
        ));

        let text = run.render_human();
        assert!(text.contains("run-abc (dry run)"));
        assert!(text.contains("skipped (size mismatch): 1"));
        assert!(text.contains("position file not found"));
    }
}
