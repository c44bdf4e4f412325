//! Live file observation.
//!
//! Provides the creation-time capability the decider depends on. Where the
//! timestamp comes from is platform dependent:
//! - Windows: file birth time
//! - Unix: inode status-change time (ctime) as a proxy for creation
//!
//! The decider only ever sees `Option<DateTime<Utc>>`.

use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use lr_config::TimestampSourceKind;
use serde::{Deserialize, Serialize};

/// Which filesystem timestamp stands in for creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampSource {
    BirthTime,
    StatusChange,
}

impl TimestampSource {
    /// Source used on this host when nothing is configured.
    pub fn for_host() -> Self {
        if cfg!(windows) {
            TimestampSource::BirthTime
        } else {
            TimestampSource::StatusChange
        }
    }

    /// Resolve a configured source, `Auto` meaning the host default.
    pub fn from_kind(kind: TimestampSourceKind) -> Self {
        match kind {
            TimestampSourceKind::Auto => Self::for_host(),
            TimestampSourceKind::BirthTime => TimestampSource::BirthTime,
            TimestampSourceKind::StatusChange => TimestampSource::StatusChange,
        }
    }

    /// Creation timestamp from already fetched metadata.
    pub fn creation_time(self, metadata: &Metadata) -> Option<DateTime<Utc>> {
        match self {
            TimestampSource::BirthTime => metadata.created().ok().map(DateTime::<Utc>::from),
            TimestampSource::StatusChange => status_change_time(metadata),
        }
    }

    /// Creation timestamp of the file at `path`; `Ok(None)` when the file
    /// is missing or the platform cannot report it.
    pub fn creation_time_of(self, path: &Path) -> io::Result<Option<DateTime<Utc>>> {
        Ok(observe(path, self)?.and_then(|obs| obs.created_at))
    }
}

impl std::fmt::Display for TimestampSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimestampSource::BirthTime => write!(f, "birth time"),
            TimestampSource::StatusChange => write!(f, "status-change time"),
        }
    }
}

#[cfg(unix)]
fn status_change_time(metadata: &Metadata) -> Option<DateTime<Utc>> {
    use std::os::unix::fs::MetadataExt;

    let nanos = u32::try_from(metadata.ctime_nsec()).ok()?;
    DateTime::from_timestamp(metadata.ctime(), nanos)
}

// No ctime outside Unix; birth time is the closest available.
#[cfg(not(unix))]
fn status_change_time(metadata: &Metadata) -> Option<DateTime<Utc>> {
    metadata.created().ok().map(DateTime::<Utc>::from)
}

/// Size and creation time of a live file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileObservation {
    pub live_size: u64,
    pub created_at: Option<DateTime<Utc>>,
}

/// Stat a file. A missing file is `Ok(None)`, not an error.
pub fn observe(path: &Path, source: TimestampSource) -> io::Result<Option<FileObservation>> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(FileObservation {
            live_size: metadata.len(),
            created_at: source.creation_time(&metadata),
        })),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let obs = observe(&dir.path().join("gone.log"), TimestampSource::for_host()).unwrap();
        assert!(obs.is_none());
    }

    #[test]
    fn test_observe_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.log");
        fs::write(&path, vec![b'a'; 255]).unwrap();

        let obs = observe(&path, TimestampSource::for_host()).unwrap().unwrap();
        assert_eq!(obs.live_size, 255);
    }

    #[cfg(unix)]
    #[test]
    fn test_status_change_time_is_recent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.log");
        fs::write(&path, b"hello").unwrap();

        let created = TimestampSource::StatusChange
            .creation_time_of(&path)
            .unwrap()
            .expect("ctime available on unix");
        let skew = (Utc::now() - created).num_seconds().abs();
        assert!(skew < 60, "ctime {} too far from now", created);
    }

    #[test]
    fn test_creation_time_of_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let ts = TimestampSource::BirthTime
            .creation_time_of(&dir.path().join("gone.log"))
            .unwrap();
        assert!(ts.is_none());
    }

    #[test]
    fn test_from_kind() {
        assert_eq!(
            TimestampSource::from_kind(TimestampSourceKind::Auto),
            TimestampSource::for_host()
        );
        assert_eq!(
            TimestampSource::from_kind(TimestampSourceKind::StatusChange),
            TimestampSource::StatusChange
        );
        assert_eq!(
            TimestampSource::from_kind(TimestampSourceKind::BirthTime),
            TimestampSource::BirthTime
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_host_default_on_unix() {
        assert_eq!(TimestampSource::for_host(), TimestampSource::StatusChange);
    }
}
