//! The retirement pass.
//!
//! For each record source: parse → for each record → normalize path →
//! observe → decide → delete or skip. Every per-line and per-entry problem
//! is contained and reported; nothing here aborts the run.
//!
//! # Example
//!
//! ```no_run
//! use lr_config::RetireConfig;
//! use lr_core::retire::Retirer;
//!
//! let config = RetireConfig::default();
//! let retirer = Retirer::from_config(&config, "run-example".to_string());
//! let report = retirer.run(&config.record_sources);
//! println!("deleted {} files", report.totals.deleted);
//! ```

pub mod events;
pub mod report;

pub use events::{persist_events, RetirementEvent};
pub use report::{EntryOutcome, EntryReport, OutcomeCounts, RunReport, SourceReport, SourceStatus};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use lr_config::{PathRewrite, RetireConfig};
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn};

use crate::decision::{decide, file_age, Decision, RetirementPolicy, SkipReason};
use crate::normalize::normalize;
use crate::observe::{observe, TimestampSource};
use crate::position::{read_source, PositionError, PositionRecord};

/// Errors from retirement operations.
#[derive(Error, Debug)]
pub enum RetireError {
    #[error("failed to stat {}: {source}", .path.display())]
    Observe {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to delete {}: {source}", .path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Applies the retirement policy to record sources.
#[derive(Debug, Clone)]
pub struct Retirer {
    policy: RetirementPolicy,
    timestamps: TimestampSource,
    rewrite: Option<PathRewrite>,
    dry_run: bool,
    event_log_dir: Option<PathBuf>,
    run_id: String,
}

impl Retirer {
    /// Create a retirer with no path rewrite, no dry run and no event log.
    pub fn new(policy: RetirementPolicy, timestamps: TimestampSource, run_id: String) -> Self {
        Self {
            policy,
            timestamps,
            rewrite: None,
            dry_run: false,
            event_log_dir: None,
            run_id,
        }
    }

    /// Build from a validated configuration.
    pub fn from_config(config: &RetireConfig, run_id: String) -> Self {
        Self::new(
            RetirementPolicy::from_config(config),
            TimestampSource::from_kind(config.timestamp_source),
            run_id,
        )
        .with_rewrite(config.active_rewrite().cloned())
        .with_dry_run(config.dry_run)
        .with_event_log_dir(config.event_log_dir.clone())
    }

    pub fn with_rewrite(mut self, rewrite: Option<PathRewrite>) -> Self {
        self.rewrite = rewrite;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_event_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.event_log_dir = dir;
        self
    }

    pub fn policy(&self) -> &RetirementPolicy {
        &self.policy
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Process every source once, using the current time.
    pub fn run(&self, sources: &[PathBuf]) -> RunReport {
        self.run_at(sources, Utc::now())
    }

    /// Process every source once, judging file ages against `now`.
    pub fn run_at(&self, sources: &[PathBuf], now: DateTime<Utc>) -> RunReport {
        let span = info_span!("retire_run", run_id = %self.run_id, dry_run = self.dry_run);
        let _enter = span.enter();

        info!(
            sources = sources.len(),
            min_age_secs = self.policy.min_age.as_secs(),
            size_policy = %self.policy.size_policy,
            timestamps = %self.timestamps,
            dev_mode = self.rewrite.is_some(),
            "Starting retirement pass"
        );

        let mut report = RunReport::new(self.run_id.clone(), now, self.dry_run);
        let mut events = Vec::new();

        for source in sources {
            report.push(self.process_source(source, now, &mut events));
        }

        if let Some(dir) = &self.event_log_dir {
            match persist_events(&events, dir, now) {
                Ok(path) => report.event_log = path,
                Err(e) => error!(dir = %dir.display(), error = %e, "Failed to write retirement events"),
            }
        }

        info!(
            deleted = report.totals.deleted,
            would_delete = report.totals.would_delete,
            already_gone = report.totals.already_gone,
            skipped = report.totals.total_skipped(),
            failed = report.totals.failed,
            "Retirement pass finished"
        );
        report
    }

    /// Process a single position file.
    pub fn process_source(
        &self,
        source: &Path,
        now: DateTime<Utc>,
        events: &mut Vec<RetirementEvent>,
    ) -> SourceReport {
        info!(source = %source.display(), "Processing position file");

        let parsed = read_source(source);
        let status = match parsed.warnings.first() {
            Some(PositionError::SourceUnavailable { .. }) => SourceStatus::Missing,
            Some(PositionError::SourceUnreadable { .. }) => SourceStatus::Unreadable,
            _ => SourceStatus::Read,
        };

        let mut report = SourceReport::new(source.to_path_buf(), status);
        report.records = parsed.records.len();
        report.malformed_lines = parsed.malformed_lines();

        for record in &parsed.records {
            let (entry, event) = self.retire_entry(source, record, now);
            if let Some(event) = event {
                events.push(event);
            }
            report.push(entry);
        }

        report
    }

    /// Decide on one record and apply the verdict.
    pub fn retire_entry(
        &self,
        source: &Path,
        record: &PositionRecord,
        now: DateTime<Utc>,
    ) -> (EntryReport, Option<RetirementEvent>) {
        let resolved = normalize(Path::new(&record.path), self.rewrite.as_ref());
        let entry = |outcome| EntryReport {
            path: record.path.clone(),
            resolved_path: resolved.clone(),
            outcome,
        };

        let observation = match observe(&resolved, self.timestamps) {
            Ok(obs) => obs,
            Err(e) => {
                let err = RetireError::Observe {
                    path: resolved.clone(),
                    source: e,
                };
                error!(error = %err, "Cannot observe log file");
                return (
                    entry(EntryOutcome::Failed {
                        error: err.to_string(),
                    }),
                    None,
                );
            }
        };

        let Some(observation) = observation else {
            self.log_skip(record, &resolved, SkipReason::NotFound, None);
            return (
                entry(EntryOutcome::Skipped {
                    reason: SkipReason::NotFound,
                }),
                None,
            );
        };

        if let Decision::Skip(reason) = decide(record, Some(&observation), &self.policy, now) {
            self.log_skip(record, &resolved, reason, Some(observation.live_size));
            return (entry(EntryOutcome::Skipped { reason }), None);
        }

        let age_secs = observation
            .created_at
            .map(|created| file_age(created, now).as_secs())
            .unwrap_or(0);
        let event = RetirementEvent {
            timestamp: now,
            run_id: self.run_id.clone(),
            source: source.display().to_string(),
            path: record.path.clone(),
            resolved_path: resolved.display().to_string(),
            live_size: observation.live_size,
            consumed_size: record.consumed_size,
            content_hash: record.content_hash_hex(),
            age_secs,
            dry_run: self.dry_run,
        };

        if self.dry_run {
            info!(
                path = %resolved.display(),
                live_size = observation.live_size,
                age_secs,
                "[DRY-RUN] Would delete fully ingested log file"
            );
            return (entry(EntryOutcome::WouldDelete), Some(event));
        }

        let outcome = remove_log_file(&resolved);
        if outcome == EntryOutcome::Deleted {
            info!(
                path = %resolved.display(),
                live_size = observation.live_size,
                age_secs,
                "Deleted fully ingested log file"
            );
            return (entry(outcome), Some(event));
        }
        (entry(outcome), None)
    }

    fn log_skip(
        &self,
        record: &PositionRecord,
        resolved: &Path,
        reason: SkipReason,
        live_size: Option<u64>,
    ) {
        match reason {
            SkipReason::NotFound => {
                info!(path = %resolved.display(), %reason, "Skipping log file")
            }
            SkipReason::AgeUnknown => {
                warn!(path = %resolved.display(), %reason, "Skipping log file")
            }
            SkipReason::TooYoung | SkipReason::SizeMismatch => debug!(
                path = %resolved.display(),
                %reason,
                consumed_size = record.consumed_size,
                live_size = ?live_size,
                "Skipping log file"
            ),
        }
    }
}

/// Remove a file judged safe to delete.
///
/// Losing a race with another deleter is success (`AlreadyGone`); any other
/// failure is contained as `Failed`.
pub fn remove_log_file(path: &Path) -> EntryOutcome {
    match fs::remove_file(path) {
        Ok(()) => EntryOutcome::Deleted,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "Log file already deleted");
            EntryOutcome::AlreadyGone
        }
        Err(e) => {
            let err = RetireError::Delete {
                path: path.to_path_buf(),
                source: e,
            };
            error!(error = %err, "Failed to delete log file");
            EntryOutcome::Failed {
                error: err.to_string(),
            }
        }
    }
}
