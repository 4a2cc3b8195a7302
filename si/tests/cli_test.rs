//! CLI tests for the `si` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `si` isolated from the user's home, config and logs
fn si(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("si").expect("si binary should build");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("XDG_DATA_HOME", home.path().join(".local/share"))
        .env("NO_COLOR", "1")
        .env_remove("ANTHROPIC_API_KEY");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().expect("Failed to create temp dir");
    si(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("repl"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn test_version() {
    let home = TempDir::new().expect("Failed to create temp dir");
    si(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_info_reports_missing_key() {
    let home = TempDir::new().expect("Failed to create temp dir");
    si(&home)
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("missing"))
        .stdout(predicate::str::contains("ANTHROPIC_API_KEY"))
        .stdout(predicate::str::contains("functional"));
}

#[test]
fn test_info_reports_configured_key() {
    let home = TempDir::new().expect("Failed to create temp dir");
    si(&home)
        .arg("info")
        .env("ANTHROPIC_API_KEY", "sk-test")
        .assert()
        .success()
        .stdout(predicate::str::contains("configured"));
}

#[test]
fn test_info_uses_local_config() {
    let home = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(home.path().join(".speciterator.yml"), "output:\n  format: json\n").expect("Failed to write config");
    si(&home)
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Output format: json"));
}

#[test]
fn test_repl_without_key_fails() {
    let home = TempDir::new().expect("Failed to create temp dir");
    si(&home)
        .args(["repl", "Build a CRM"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ANTHROPIC_API_KEY"));
}

#[test]
fn test_bad_config_path_fails() {
    let home = TempDir::new().expect("Failed to create temp dir");
    si(&home)
        .args(["--config", "does-not-exist.yml", "info"])
        .assert()
        .failure();
}
