//! Integration tests for the `gpioled` binary.
//!
//! These tests exercise the CLI binary via `assert_cmd`. Nothing here needs
//! real GPIO hardware: line commands are pointed at a chip that doesn't exist.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("gpioled")
}

/// CLI with `--config` pointed at a fresh temp path (never the user's file).
fn cli_isolated() -> (assert_cmd::Command, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = cli();
    cmd.arg("--config").arg(dir.path().join("config.toml"));
    (cmd, dir)
}

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("gpioled"));
}

#[test]
fn cli_version_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_config_json_produces_valid_json() {
    let (mut cmd, _dir) = cli_isolated();
    let output = cmd
        .args(["--json", "config"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("config --json should produce valid JSON");
    assert!(
        json["settings"].is_object(),
        "JSON output should contain 'settings' object"
    );
    assert_eq!(json["config_file_exists"], false);
    assert_eq!(json["settings"]["polarity"], "active-high");
    assert_eq!(json["address"], "/dev/gpiochip0:27");
}

#[test]
fn cli_config_reflects_overrides() {
    let (mut cmd, _dir) = cli_isolated();
    cmd.args(["config", "--pin", "17", "--polarity", "active-low"])
        .assert()
        .success()
        .stdout(predicate::str::contains("legacy pin"))
        .stdout(predicate::str::contains("active-low"));
}

#[test]
fn cli_config_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "chip = \"/dev/gpiochip4\"\nline = 3\n").unwrap();
    let output = cli()
        .arg("--config")
        .arg(&path)
        .args(["--json", "config"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["config_file_exists"], true);
    assert_eq!(json["address"], "/dev/gpiochip4:3");
}

#[test]
fn cli_config_init_writes_file_then_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    cli()
        .arg("--config")
        .arg(&path)
        .args(["config", "--init", "--chip", "/dev/gpiochip1", "--line", "12"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Wrote"));
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("# gpioled configuration"));
    assert!(contents.contains("/dev/gpiochip1"));

    let output = cli()
        .arg("--config")
        .arg(&path)
        .args(["--json", "config"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["address"], "/dev/gpiochip1:12");

    cli()
        .arg("--config")
        .arg(&path)
        .args(["config", "--init"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
    cli()
        .arg("--config")
        .arg(&path)
        .args(["config", "--init", "--force", "--line", "13"])
        .assert()
        .success();
    assert!(std::fs::read_to_string(&path).unwrap().contains("line = 13"));
}

#[test]
fn cli_config_force_requires_init() {
    let (mut cmd, _dir) = cli_isolated();
    cmd.args(["config", "--force"]).assert().failure();
}

// ── --verbose flag ──

#[test]
fn cli_verbose_flag_accepted() {
    let (mut cmd, _dir) = cli_isolated();
    cmd.args(["-v", "config"]).assert().success();
}

#[test]
fn cli_verbose_long_flag_accepted() {
    let (mut cmd, _dir) = cli_isolated();
    cmd.args(["--verbose", "config"]).assert().success();
}

// ── Subcommand help ──

#[test]
fn cli_subcommand_help() {
    for sub in ["on", "pattern", "blink", "config"] {
        cli()
            .args([sub, "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage"));
    }
}

// ── Argument validation ──

#[test]
fn cli_unknown_pattern_rejected() {
    cli()
        .args(["pattern", "disco"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown pattern"));
}

#[test]
fn cli_unknown_polarity_rejected() {
    cli()
        .args(["config", "--polarity", "sideways"])
        .assert()
        .failure();
}

#[test]
fn cli_pin_conflicts_with_line() {
    cli()
        .args(["config", "--pin", "4", "--line", "4"])
        .assert()
        .failure();
}

// ── Line errors ──

#[test]
fn cli_missing_chip_fails() {
    let (mut cmd, _dir) = cli_isolated();
    cmd.args([
        "pattern",
        "init",
        "--chip",
        "/dev/gpiochip-does-not-exist",
        "--line",
        "0",
    ])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Error:"));
}

#[test]
fn cli_blink_missing_chip_fails() {
    let (mut cmd, _dir) = cli_isolated();
    cmd.args([
        "blink",
        "--duration-ms",
        "100",
        "--cycles",
        "1",
        "--chip",
        "/dev/gpiochip-does-not-exist",
    ])
    .assert()
    .code(1)
    .stderr(predicate::str::contains("Error:"));
}

#[test]
fn cli_out_of_range_pin_fails() {
    let (mut cmd, _dir) = cli_isolated();
    cmd.args(["on", "--hold-ms", "10", "--pin", "31"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("out of range"));
}
