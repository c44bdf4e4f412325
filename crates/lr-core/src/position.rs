//! Parser for collector position files.
//!
//! A position file holds one entry per tracked log file:
//!
//! ```text
//! <absolute-path>\t<consumed-size-hex>\t<content-hash-hex>\n
//! ```
//!
//! Malformed lines are reported and skipped; they never abort the batch.
//! A missing position file is a normal state (collector not yet run) and
//! yields an empty record set.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

/// Hex digit width fluentd writes for both numeric fields.
pub const DEFAULT_HEX_WIDTH: usize = 16;

/// Why a single record line was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    #[error("line is not valid UTF-8")]
    InvalidUtf8,

    #[error("expected 3 tab-separated fields, found {0}")]
    FieldCount(usize),

    #[error("path field is empty")]
    EmptyPath,

    #[error("{field} is not a hexadecimal integer: {value:?}")]
    InvalidHex { field: &'static str, value: String },

    #[error("{field} does not fit in 64 bits: {value:?}")]
    Overflow { field: &'static str, value: String },
}

/// Recoverable problems reading a position source.
#[derive(Error, Debug)]
pub enum PositionError {
    #[error("position file not found: {}", .path.display())]
    SourceUnavailable { path: PathBuf },

    #[error("failed to read position file {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed record at line {line_number}: {reason}")]
    MalformedLine { line_number: usize, reason: LineError },
}

/// How a numeric field was spelled: digit count and letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HexLayout {
    digits: usize,
    upper: bool,
}

impl HexLayout {
    const FLUENTD: HexLayout = HexLayout {
        digits: DEFAULT_HEX_WIDTH,
        upper: false,
    };

    fn encode(self, value: u64) -> String {
        if self.upper {
            format!("{:0width$X}", value, width = self.digits)
        } else {
            format!("{:0width$x}", value, width = self.digits)
        }
    }
}

/// One tracked file as recorded by the collector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionRecord {
    /// Path of the tracked log file, as the collector wrote it.
    pub path: String,

    /// Byte offset the collector has confirmed reading up to.
    pub consumed_size: u64,

    /// Collector's content fingerprint. Carried through, never used to decide.
    pub content_hash: u64,

    size_layout: HexLayout,
    hash_layout: HexLayout,
}

impl PositionRecord {
    /// Create a record that encodes with fluentd's 16-digit fields.
    pub fn new(path: impl Into<String>, consumed_size: u64, content_hash: u64) -> Self {
        Self {
            path: path.into(),
            consumed_size,
            content_hash,
            size_layout: HexLayout::FLUENTD,
            hash_layout: HexLayout::FLUENTD,
        }
    }

    /// Parse a single line (without its trailing newline).
    pub fn parse_line(line: &str) -> Result<Self, LineError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 3 {
            return Err(LineError::FieldCount(fields.len()));
        }

        let path = fields[0];
        if path.is_empty() {
            return Err(LineError::EmptyPath);
        }

        let (consumed_size, size_layout) = parse_hex("consumed_size", fields[1])?;
        let (content_hash, hash_layout) = parse_hex("content_hash", fields[2])?;

        Ok(Self {
            path: path.to_string(),
            consumed_size,
            content_hash,
            size_layout,
            hash_layout,
        })
    }

    /// Consumed size in the record's hex encoding.
    pub fn consumed_size_hex(&self) -> String {
        self.size_layout.encode(self.consumed_size)
    }

    /// Content hash in the record's hex encoding.
    pub fn content_hash_hex(&self) -> String {
        self.hash_layout.encode(self.content_hash)
    }

    /// Encode back to a record line (without trailing newline).
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}",
            self.path,
            self.consumed_size_hex(),
            self.content_hash_hex()
        )
    }
}

/// Decode a strictly base-16, unsigned field in a single letter case.
fn parse_hex(field: &'static str, value: &str) -> Result<(u64, HexLayout), LineError> {
    let invalid = || LineError::InvalidHex {
        field,
        value: value.to_string(),
    };

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let has_upper = value.bytes().any(|b| b.is_ascii_uppercase());
    let has_lower = value.bytes().any(|b| b.is_ascii_lowercase());
    if has_upper && has_lower {
        return Err(invalid());
    }

    let parsed = u64::from_str_radix(value, 16).map_err(|_| LineError::Overflow {
        field,
        value: value.to_string(),
    })?;
    Ok((
        parsed,
        HexLayout {
            digits: value.len(),
            upper: has_upper,
        },
    ))
}

/// Records parsed from one source plus the warnings raised on the way.
#[derive(Debug, Default)]
pub struct ParsedSource {
    pub records: Vec<PositionRecord>,
    pub warnings: Vec<PositionError>,
}

impl ParsedSource {
    /// Whether the source itself (not a line) was missing or unreadable.
    pub fn source_failed(&self) -> bool {
        self.warnings.iter().any(|w| {
            matches!(
                w,
                PositionError::SourceUnavailable { .. } | PositionError::SourceUnreadable { .. }
            )
        })
    }

    /// Number of malformed lines skipped.
    pub fn malformed_lines(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, PositionError::MalformedLine { .. }))
            .count()
    }
}

/// Parse raw position-file content. Order of well-formed lines is preserved.
pub fn parse_records(content: &[u8]) -> ParsedSource {
    let mut parsed = ParsedSource::default();

    for (idx, raw) in content.split(|b| *b == b'\n').enumerate() {
        let line_number = idx + 1;
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        // Tabs are field separators, so a tab-only line is a malformed record.
        if raw.iter().all(|b| *b == b' ') {
            continue;
        }

        let result = std::str::from_utf8(raw)
            .map_err(|_| LineError::InvalidUtf8)
            .and_then(PositionRecord::parse_line);

        match result {
            Ok(record) => parsed.records.push(record),
            Err(reason) => {
                warn!(line_number, %reason, "Skipping malformed position record");
                parsed
                    .warnings
                    .push(PositionError::MalformedLine { line_number, reason });
            }
        }
    }

    parsed
}

/// Read and parse a position file.
///
/// Never fails: a missing or unreadable source is reported as a warning
/// alongside an empty record set.
pub fn read_source(path: &Path) -> ParsedSource {
    match fs::read(path) {
        Ok(content) => {
            let parsed = parse_records(&content);
            debug!(
                source = %path.display(),
                records = parsed.records.len(),
                malformed = parsed.malformed_lines(),
                "Parsed position file"
            );
            parsed
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(source = %path.display(), "Position file not found");
            ParsedSource {
                records: Vec::new(),
                warnings: vec![PositionError::SourceUnavailable {
                    path: path.to_path_buf(),
                }],
            }
        }
        Err(e) => {
            warn!(source = %path.display(), error = %e, "Position file unreadable");
            ParsedSource {
                records: Vec::new(),
                warnings: vec![PositionError::SourceUnreadable {
                    path: path.to_path_buf(),
                    source: e,
                }],
            }
        }
    }
}
