//! Retirement configuration types.
//!
//! Every field has a default so a partial retire.json (or none at all)
//! yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete retirement configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetireConfig {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    /// Position files to process, in order.
    #[serde(default = "default_record_sources")]
    pub record_sources: Vec<PathBuf>,

    /// Minimum file age before a fully read file may be deleted.
    #[serde(default = "default_min_age_secs")]
    pub min_age_secs: u64,

    /// How the recorded offset is compared against the live size.
    #[serde(default)]
    pub size_policy: SizePolicy,

    /// Rewrite production paths to a local layout before touching the filesystem.
    #[serde(default)]
    pub dev_mode: bool,

    /// Prefix rewrite applied when `dev_mode` is set.
    #[serde(default)]
    pub path_rewrite: PathRewrite,

    /// Which file timestamp stands in for creation time.
    #[serde(default)]
    pub timestamp_source: TimestampSourceKind,

    /// Decide but never delete.
    #[serde(default)]
    pub dry_run: bool,

    /// Directory for JSONL retirement event logs.
    #[serde(default)]
    pub event_log_dir: Option<PathBuf>,
}

fn default_schema_version() -> String {
    crate::CONFIG_SCHEMA_VERSION.to_string()
}

fn default_record_sources() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/var/log/fluentd/pos/python-logs.pos"),
        PathBuf::from("/var/log/fluentd/pos/service1-logs.pos"),
    ]
}

fn default_min_age_secs() -> u64 {
    5 * 60
}

impl Default for RetireConfig {
    fn default() -> Self {
        RetireConfig {
            schema_version: default_schema_version(),
            record_sources: default_record_sources(),
            min_age_secs: default_min_age_secs(),
            size_policy: SizePolicy::default(),
            dev_mode: false,
            path_rewrite: PathRewrite::default(),
            timestamp_source: TimestampSourceKind::default(),
            dry_run: false,
            event_log_dir: None,
        }
    }
}

impl RetireConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, crate::validate::ValidationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::validate::ValidationError::IoError(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn parse_json(json: &str) -> Result<Self, crate::validate::ValidationError> {
        serde_json::from_str(json).map_err(|e| {
            crate::validate::ValidationError::ParseError(format!("Invalid JSON: {}", e))
        })
    }

    /// Minimum age as a Duration.
    pub fn min_age(&self) -> Duration {
        Duration::from_secs(self.min_age_secs)
    }

    /// The rewrite to apply, or None when dev mode is off.
    pub fn active_rewrite(&self) -> Option<&PathRewrite> {
        self.dev_mode.then_some(&self.path_rewrite)
    }
}

/// Size comparison between the recorded offset and the live file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SizePolicy {
    /// Accept an absolute difference of up to `tolerance_bytes`.
    Tolerant { tolerance_bytes: u64 },
    /// Live size must equal the recorded offset exactly.
    Strict,
}

impl Default for SizePolicy {
    fn default() -> Self {
        SizePolicy::Tolerant {
            tolerance_bytes: 50,
        }
    }
}

impl SizePolicy {
    /// Whether a file of `live_size` counts as fully consumed at `consumed_size`.
    pub fn is_consumed(&self, live_size: u64, consumed_size: u64) -> bool {
        match *self {
            SizePolicy::Tolerant { tolerance_bytes } => {
                live_size.abs_diff(consumed_size) <= tolerance_bytes
            }
            SizePolicy::Strict => live_size == consumed_size,
        }
    }

    /// Effective tolerance in bytes.
    pub fn tolerance_bytes(&self) -> u64 {
        match *self {
            SizePolicy::Tolerant { tolerance_bytes } => tolerance_bytes,
            SizePolicy::Strict => 0,
        }
    }
}

impl std::fmt::Display for SizePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizePolicy::Tolerant { tolerance_bytes } => {
                write!(f, "tolerant (±{} bytes)", tolerance_bytes)
            }
            SizePolicy::Strict => write!(f, "strict"),
        }
    }
}

/// Production-to-local prefix substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRewrite {
    pub production_root: PathBuf,
    pub local_root: PathBuf,
}

impl Default for PathRewrite {
    fn default() -> Self {
        PathRewrite {
            production_root: PathBuf::from("/var/log/app"),
            local_root: PathBuf::from("./log"),
        }
    }
}

/// Configured creation-time source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSourceKind {
    /// Pick by host platform.
    #[default]
    Auto,
    /// File birth time.
    BirthTime,
    /// Inode status-change time (ctime).
    StatusChange,
}

impl std::str::FromStr for TimestampSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(TimestampSourceKind::Auto),
            "birth_time" | "birth" | "btime" => Ok(TimestampSourceKind::BirthTime),
            "status_change" | "ctime" => Ok(TimestampSourceKind::StatusChange),
            _ => Err(format!("unknown timestamp source: {}", s)),
        }
    }
}
