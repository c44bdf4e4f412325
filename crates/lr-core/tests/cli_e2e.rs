//! End-to-end tests for the lr-core binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Base command with logging and config lookup isolated from the host.
fn lr_core(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("lr-core").unwrap();
    cmd.env_remove("LOG_RETIRE_CONFIG")
        .env_remove("LOG_RETIRE_CONFIG_DIR")
        .env_remove("LR_LOG")
        .env_remove("LR_LOG_FORMAT")
        .env_remove("LR_LOG_TIMESTAMPS")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config);
    cmd
}

/// A log file of `size` bytes, a position file recording `consumed_hex`
/// for it, and a config pointing at that position file.
struct Fixture {
    dir: TempDir,
    log: PathBuf,
    config: PathBuf,
}

impl Fixture {
    fn new(size: usize, consumed_hex: &str, extra_config: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("app.log");
        fs::write(&log, vec![b'x'; size]).unwrap();

        let pos = dir.path().join("app.pos");
        fs::write(
            &pos,
            format!("{}\t{}\t0001\n", log.display(), consumed_hex),
        )
        .unwrap();

        let config = dir.path().join("retire.json");
        let sources = serde_json::to_string(&[&pos]).unwrap();
        fs::write(
            &config,
            format!(
                r#"{{"record_sources": {}, "min_age_secs": 0{}}}"#,
                sources, extra_config
            ),
        )
        .unwrap();

        Fixture { dir, log, config }
    }
}

#[test]
fn deletes_fully_consumed_file() {
    let fx = Fixture::new(255, "00ff", "");

    let output = lr_core(&fx.config)
        .args(["--format", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert!(!fx.log.exists());
    let report: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(report["totals"]["deleted"], 1);
    assert_eq!(report["dry_run"], false);
    assert!(report["run_id"].as_str().unwrap().starts_with("run-"));
}

#[test]
fn size_mismatch_keeps_file() {
    let fx = Fixture::new(300, "00ff", "");

    lr_core(&fx.config)
        .arg("--strict")
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped (size mismatch): 1"));

    assert!(fx.log.exists());
}

#[test]
fn young_file_is_kept() {
    let fx = Fixture::new(255, "00ff", "");

    lr_core(&fx.config)
        .args(["--min-age-secs", "3600"])
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped (too young): 1"));

    assert!(fx.log.exists());
}

#[test]
fn dry_run_keeps_file() {
    let fx = Fixture::new(255, "00ff", "");

    lr_core(&fx.config)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("(dry run)"))
        .stdout(predicate::str::contains("would delete: 1"));

    assert!(fx.log.exists());
}

#[test]
fn second_run_reports_not_found() {
    let fx = Fixture::new(255, "00ff", "");

    lr_core(&fx.config).assert().success();
    assert!(!fx.log.exists());

    lr_core(&fx.config)
        .assert()
        .success()
        .stdout(predicate::str::contains("skipped (not found): 1"));
}

#[test]
fn missing_position_file_still_exits_clean() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("retire.json");
    let missing = dir.path().join("nope.pos");
    fs::write(
        &config,
        format!(
            r#"{{"record_sources": {}}}"#,
            serde_json::to_string(&[&missing]).unwrap()
        ),
    )
    .unwrap();

    lr_core(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("position file not found"));
}

#[test]
fn source_flag_replaces_configured_sources() {
    let fx = Fixture::new(255, "00ff", "");
    let other = fx.dir.path().join("other.pos");
    fs::write(&other, "").unwrap();

    lr_core(&fx.config)
        .arg("--source")
        .arg(&other)
        .assert()
        .success();

    assert!(fx.log.exists());
}

#[test]
fn event_log_written_for_deletions() {
    let dir = tempfile::tempdir().unwrap();
    let events = dir.path().join("events");
    let extra = format!(
        r#", "event_log_dir": {}"#,
        serde_json::to_string(&events).unwrap()
    );
    let fx = Fixture::new(255, "00ff", &extra);

    lr_core(&fx.config).assert().success();

    let written: Vec<_> = fs::read_dir(&events).unwrap().collect();
    assert_eq!(written.len(), 1);
}

#[test]
fn missing_config_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();

    lr_core(&dir.path().join("absent.json"))
        .assert()
        .code(10)
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn malformed_config_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("retire.json");
    fs::write(&config, "{not json").unwrap();

    lr_core(&config).assert().code(10);
}

#[test]
fn invalid_override_is_config_error() {
    let fx = Fixture::new(255, "00ff", "");

    lr_core(&fx.config)
        .args(["--tolerance-bytes", "99999999"])
        .assert()
        .code(10);
}

#[test]
fn quiet_flag_silences_info_even_with_rust_log() {
    let fx = Fixture::new(255, "00ff", "");

    lr_core(&fx.config)
        .env("RUST_LOG", "debug")
        .arg("-q")
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn unknown_flag_is_rejected() {
    let dir = tempfile::tempdir().unwrap();

    lr_core(&dir.path().join("retire.json"))
        .arg("--frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--frobnicate"));
}
