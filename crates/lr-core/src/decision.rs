//! Retirement decision.
//!
//! `decide` is a pure function of the position record, the live file
//! observation, the policy and the current time. It performs no I/O; the
//! retirement pass applies its verdict.
//!
//! Gates, in order:
//! 1. The file must exist.
//! 2. Its creation time must be known and at least `min_age` ago. The
//!    collector and this pass run on independent schedules, so a young
//!    file may still be mid-read.
//! 3. The recorded offset must match the live size under the size policy.

use std::time::Duration;

use chrono::{DateTime, Utc};
use lr_config::{RetireConfig, SizePolicy};
use serde::{Deserialize, Serialize};

use crate::observe::FileObservation;
use crate::position::PositionRecord;

/// Policy parameters for the decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetirementPolicy {
    pub min_age: Duration,
    pub size_policy: SizePolicy,
}

impl Default for RetirementPolicy {
    fn default() -> Self {
        Self::from_config(&RetireConfig::default())
    }
}

impl RetirementPolicy {
    pub fn new(min_age: Duration, size_policy: SizePolicy) -> Self {
        Self {
            min_age,
            size_policy,
        }
    }

    pub fn from_config(config: &RetireConfig) -> Self {
        Self::new(config.min_age(), config.size_policy)
    }
}

/// Why a file was kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NotFound,
    AgeUnknown,
    TooYoung,
    SizeMismatch,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotFound => "not found",
            SkipReason::AgeUnknown => "age unknown",
            SkipReason::TooYoung => "too young",
            SkipReason::SizeMismatch => "size mismatch",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Delete,
    Skip(SkipReason),
}

impl Decision {
    pub fn is_delete(&self) -> bool {
        matches!(self, Decision::Delete)
    }
}

/// Age of a file at `now`. A creation time in the future counts as zero.
pub fn file_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (now - created_at).to_std().unwrap_or(Duration::ZERO)
}

/// Decide whether the file behind `record` may be deleted.
///
/// `observation` is `None` when the file does not exist.
pub fn decide(
    record: &PositionRecord,
    observation: Option<&FileObservation>,
    policy: &RetirementPolicy,
    now: DateTime<Utc>,
) -> Decision {
    let Some(observation) = observation else {
        return Decision::Skip(SkipReason::NotFound);
    };

    let Some(created_at) = observation.created_at else {
        return Decision::Skip(SkipReason::AgeUnknown);
    };

    if file_age(created_at, now) < policy.min_age {
        return Decision::Skip(SkipReason::TooYoung);
    }

    if !policy
        .size_policy
        .is_consumed(observation.live_size, record.consumed_size)
    {
        return Decision::Skip(SkipReason::SizeMismatch);
    }

    Decision::Delete
}
