//! Log Retirement Core - retirement pass entry point
//!
//! Loads the configuration, applies command-line overrides, runs one
//! retirement pass over every position file and prints the run report.
//! Scheduling is left to cron or a systemd timer.

use clap::{Args, Parser, ValueEnum};
use lr_config::{load_config, validate_config, RetireConfig, SizePolicy, TimestampSourceKind};
use lr_core::exit_codes::ExitCode;
use lr_core::logging::{generate_run_id, init_logging, LogConfig, LogFormat, LogLevel};
use lr_core::retire::{Retirer, RunReport};
use std::io::Write;
use std::path::PathBuf;
use tracing::{error, info};

/// Delete log files a collector has fully ingested
#[derive(Parser, Debug)]
#[command(name = "lr-core")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(flatten)]
    run: RunArgs,
}

/// Output and logging options
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Path to retire.json (overrides LOG_RETIRE_CONFIG and the search path)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report format on stdout
    #[arg(long, short = 'f', value_enum, default_value_t = OutputFormat::Human)]
    format: OutputFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Log format on stderr; defaults to LR_LOG_FORMAT
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

/// Overrides for the configured retirement policy
#[derive(Args, Debug)]
struct RunArgs {
    /// Position file to process; repeat to give several (replaces configured sources)
    #[arg(long = "source", value_name = "PATH")]
    sources: Vec<PathBuf>,

    /// Minimum file age in seconds before deletion
    #[arg(long)]
    min_age_secs: Option<u64>,

    /// Accepted difference between recorded offset and live size
    #[arg(long, conflicts_with = "strict")]
    tolerance_bytes: Option<u64>,

    /// Require the live size to equal the recorded offset exactly
    #[arg(long)]
    strict: bool,

    /// Rewrite production paths to the local layout
    #[arg(long)]
    dev_mode: bool,

    /// Decide and report but never delete
    #[arg(long)]
    dry_run: bool,

    /// Creation-time source (auto, birth_time, status_change)
    #[arg(long)]
    timestamp_source: Option<TimestampSourceKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Human,
    Json,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.global.quiet {
        Some(LogLevel::Error)
    } else {
        match cli.global.verbose {
            0 => None,
            1 => Some(LogLevel::Debug),
            _ => Some(LogLevel::Trace),
        }
    };
    init_logging(&LogConfig::from_env(log_level, cli.global.log_format));

    let exit_code = run(&cli);
    std::process::exit(exit_code.as_i32());
}

fn run(cli: &Cli) -> ExitCode {
    let (mut config, resolved) = match load_config(cli.global.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            error!(code = e.code(), error = %e, "Failed to load configuration");
            eprintln!("lr-core: {}", e);
            return ExitCode::ConfigError;
        }
    };
    info!(source = %resolved.source, "Configuration loaded");

    apply_overrides(&mut config, &cli.run);
    if let Err(e) = validate_config(&config) {
        error!(code = e.code(), error = %e, "Invalid command-line override");
        eprintln!("lr-core: {}", e);
        return ExitCode::ConfigError;
    }

    let retirer = Retirer::from_config(&config, generate_run_id());
    let report = retirer.run(&config.record_sources);

    print_report(&report, cli.global.format)
}

fn apply_overrides(config: &mut RetireConfig, args: &RunArgs) {
    if !args.sources.is_empty() {
        config.record_sources = args.sources.clone();
    }
    if let Some(secs) = args.min_age_secs {
        config.min_age_secs = secs;
    }
    if args.strict {
        config.size_policy = SizePolicy::Strict;
    } else if let Some(tolerance_bytes) = args.tolerance_bytes {
        config.size_policy = SizePolicy::Tolerant { tolerance_bytes };
    }
    if let Some(kind) = args.timestamp_source {
        config.timestamp_source = kind;
    }
    config.dev_mode |= args.dev_mode;
    config.dry_run |= args.dry_run;
}

fn print_report(report: &RunReport, format: OutputFormat) -> ExitCode {
    let rendered = match format {
        OutputFormat::Human => report.render_human(),
        OutputFormat::Json => match serde_json::to_string_pretty(report) {
            Ok(json) => json + "\n",
            Err(e) => {
                error!(error = %e, "Failed to serialize run report");
                return ExitCode::InternalError;
            }
        },
    };

    match write_stdout(&rendered) {
        Ok(()) => ExitCode::Clean,
        Err(e) => {
            error!(error = %e, "Failed to write run report");
            ExitCode::IoError
        }
    }
}

fn write_stdout(rendered: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(rendered.as_bytes())?;
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("lr-core").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let cli = parse(&[]);
        let mut config = RetireConfig::default();
        apply_overrides(&mut config, &cli.run);
        assert_eq!(config, RetireConfig::default());
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = parse(&[
            "--source",
            "/tmp/a.pos",
            "--source",
            "/tmp/b.pos",
            "--min-age-secs",
            "0",
            "--tolerance-bytes",
            "7",
            "--dev-mode",
            "--dry-run",
            "--timestamp-source",
            "ctime",
        ]);
        let mut config = RetireConfig::default();
        apply_overrides(&mut config, &cli.run);

        assert_eq!(
            config.record_sources,
            vec![PathBuf::from("/tmp/a.pos"), PathBuf::from("/tmp/b.pos")]
        );
        assert_eq!(config.min_age_secs, 0);
        assert_eq!(config.size_policy, SizePolicy::Tolerant { tolerance_bytes: 7 });
        assert!(config.dev_mode);
        assert!(config.dry_run);
        assert_eq!(config.timestamp_source, TimestampSourceKind::StatusChange);
    }

    #[test]
    fn test_strict_override() {
        let cli = parse(&["--strict"]);
        let mut config = RetireConfig::default();
        apply_overrides(&mut config, &cli.run);
        assert_eq!(config.size_policy, SizePolicy::Strict);
    }

    #[test]
    fn test_strict_conflicts_with_tolerance() {
        let result = Cli::try_parse_from(["lr-core", "--strict", "--tolerance-bytes", "5"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_dry_run_survives_absent_flag() {
        let cli = parse(&[]);
        let mut config = RetireConfig {
            dry_run: true,
            ..RetireConfig::default()
        };
        apply_overrides(&mut config, &cli.run);
        assert!(config.dry_run);
    }
}
