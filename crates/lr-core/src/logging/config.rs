//! Log settings resolved from the environment and the command line.
//!
//! Precedence, highest first:
//! 1. CLI flags (`-q`, `-v`, `--log-format`)
//! 2. `LR_LOG`, `LR_LOG_FORMAT`, `LR_LOG_TIMESTAMPS`
//! 3. `RUST_LOG` directives, used verbatim
//! 4. Defaults: human format, `info`, timestamps on

use clap::ValueEnum;

pub const ENV_LOG_LEVEL: &str = "LR_LOG";
pub const ENV_LOG_FORMAT: &str = "LR_LOG_FORMAT";
pub const ENV_LOG_TIMESTAMPS: &str = "LR_LOG_TIMESTAMPS";

/// Encoding of log lines on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    #[default]
    #[value(alias = "console")]
    Human,
    /// One JSON object per line.
    #[value(alias = "json")]
    Jsonl,
}

/// Minimum level emitted for this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    #[value(alias = "warning")]
    Warn,
    Error,
    #[value(alias = "quiet")]
    Off,
}

impl LogLevel {
    /// Filter directive scoping this level to the retirement crates.
    pub fn directive(self) -> String {
        let level = match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        };
        format!("lr_core={level},lr_config={level}")
    }
}

/// Resolved logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
    /// Raw `RUST_LOG` directives; only kept when no explicit level was given.
    pub directives: Option<String>,
    /// Timestamps on human-format lines. JSON lines always carry one.
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LogLevel::Info,
            directives: None,
            timestamps: true,
        }
    }
}

impl LogConfig {
    /// Resolve from the process environment and CLI overrides.
    pub fn from_env(cli_level: Option<LogLevel>, cli_format: Option<LogFormat>) -> Self {
        Self::resolve(cli_level, cli_format, |key| std::env::var(key).ok())
    }

    /// Resolve against an arbitrary variable lookup.
    pub fn resolve(
        cli_level: Option<LogLevel>,
        cli_format: Option<LogFormat>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let env_level = var(ENV_LOG_LEVEL).and_then(|v| LogLevel::from_str(&v, true).ok());
        let level = cli_level.or(env_level);

        let format = cli_format
            .or_else(|| var(ENV_LOG_FORMAT).and_then(|v| LogFormat::from_str(&v, true).ok()))
            .unwrap_or_default();

        let timestamps = var(ENV_LOG_TIMESTAMPS)
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no"))
            .unwrap_or(true);

        LogConfig {
            format,
            level: level.unwrap_or_default(),
            directives: match level {
                Some(_) => None,
                None => var("RUST_LOG").filter(|d| !d.trim().is_empty()),
            },
            timestamps,
        }
    }
}
