//! Integration tests for the `tshirts` binary.
//!
//! These cover argument parsing and the failures that happen before any
//! network or AI call is made.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A `tshirts` command isolated from the caller's environment and config
fn tshirts_in(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tshirts").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env_remove("GITHUB_TOKEN")
        .env_remove("TSHIRTS_REPO")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    tshirts_in(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("estimate"))
        .stdout(predicate::str::contains("breakdown"))
        .stdout(predicate::str::contains("new"))
        .stdout(predicate::str::contains("groom"))
        .stdout(predicate::str::contains("close"));
}

#[test]
fn test_refine_alias_is_advertised() {
    let dir = TempDir::new().unwrap();
    tshirts_in(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("refine"));
}

#[test]
fn test_missing_token_fails_early() {
    let dir = TempDir::new().unwrap();
    tshirts_in(&dir)
        .args(["--repo", "owner/repo", "estimate"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("GITHUB_TOKEN"));
}

#[test]
fn test_non_numeric_issue_is_rejected() {
    let dir = TempDir::new().unwrap();
    tshirts_in(&dir)
        .args(["breakdown", "forty-two"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_bad_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".tshirts.toml"), "[ai]\nflavour = \"spicy\"\n").unwrap();
    tshirts_in(&dir)
        .env("GITHUB_TOKEN", "token")
        .args(["--repo", "owner/repo", "groom"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(".tshirts.toml"));
}
