//! Integration tests for the `deno-install` command line.
//!
//! None of these reach the network: each case fails (or exits) before the
//! first request is made.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn deno_install(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("deno-install").unwrap();
    cmd.env("HOME", home.path())
        .env_remove("DENO_INSTALL_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_exits_zero() {
    let home = TempDir::new().unwrap();
    deno_install(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("VERSION"))
        .stdout(predicate::str::contains("--no-link"));
}

#[test]
fn test_version_flag_exits_zero() {
    let home = TempDir::new().unwrap();
    deno_install(&home)
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_invalid_tag_exits_one() {
    let home = TempDir::new().unwrap();
    deno_install(&home)
        .arg("1.4.0")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[deno-install error]"))
        .stderr(predicate::str::contains("Invalid release tag '1.4.0'"));

    assert!(!home.path().join(".deno").exists());
}

#[test]
fn test_unknown_flag_exits_one() {
    let home = TempDir::new().unwrap();
    deno_install(&home).arg("--frobnicate").assert().code(1);
}

#[test]
fn test_broken_config_exits_one() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("install.toml");
    fs::write(&config, "max_requests = 0\n").unwrap();

    deno_install(&home)
        .arg("--config")
        .arg(&config)
        .arg("v1.4.0")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[deno-install error]"))
        .stderr(predicate::str::contains("max_requests"));
}

#[test]
fn test_missing_config_from_env_exits_one() {
    let home = TempDir::new().unwrap();
    deno_install(&home)
        .env("DENO_INSTALL_CONFIG", home.path().join("absent.toml"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read installer config"));
}
