//! Structured logging for lr-core.
//!
//! Human-readable lines for interactive runs, JSONL for scheduled ones.
//! Everything goes to stderr; stdout carries only the run report.

pub mod config;

pub use config::{LogConfig, LogFormat, LogLevel};

use std::io::IsTerminal;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter for a resolved config. Invalid `RUST_LOG` directives fall back
/// to the resolved level.
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    config
        .directives
        .as_deref()
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(config.level.directive()))
}

/// Install the global subscriber. Call once, before the first event.
pub fn init_logging(config: &LogConfig) {
    let registry = tracing_subscriber::registry().with(build_filter(config));

    match (config.format, config.timestamps) {
        (LogFormat::Jsonl, _) => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .init(),
        (LogFormat::Human, timestamps) => {
            let layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal());
            if timestamps {
                registry.with(layer).init();
            } else {
                registry.with(layer.without_time()).init();
            }
        }
    }
}

/// Run ID shared by every event of one invocation: `run-` plus 12 hex chars.
pub fn generate_run_id() -> String {
    let uuid = uuid::Uuid::new_v4().simple().to_string();
    format!("run-{}", &uuid[..12])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_generate_run_id() {
        let id1 = generate_run_id();
        let id2 = generate_run_id();

        assert!(id1.starts_with("run-"));
        assert_ne!(id1, id2);
        assert_eq!(id1.len(), 16);
        assert!(id1[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_filter_from_level() {
        let config = LogConfig {
            level: LogLevel::Error,
            ..LogConfig::default()
        };
        assert_eq!(build_filter(&config).max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn test_rust_log_directives_used() {
        let config = LogConfig {
            directives: Some("lr_core=trace".to_string()),
            ..LogConfig::default()
        };
        assert_eq!(build_filter(&config).max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_invalid_directives_fall_back_to_level() {
        let config = LogConfig {
            directives: Some("lr_core=loud".to_string()),
            level: LogLevel::Warn,
            ..LogConfig::default()
        };
        assert_eq!(build_filter(&config).max_level_hint(), Some(LevelFilter::WARN));
    }
}
