//! Process exit codes for the lr-core CLI.
//!
//! A completed pass exits 0 whatever happened to individual entries;
//! per-entry failures go to the report and the log. Malformed arguments
//! never reach these codes: clap exits with its own usage code.

/// Exit status of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Pass completed.
    Clean = 0,

    /// Configuration missing, unparsable or invalid, including CLI overrides.
    ConfigError = 10,

    /// Run report could not be serialized.
    InternalError = 20,

    /// Run report could not be written to stdout.
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}
