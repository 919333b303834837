//! Corruption recovery tests for fitlog.
//!
//! These tests verify the system can handle:
//! - Corrupted journal lines
//! - Partial journal writes
//! - Empty files
//! - A corrupted user registry

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;
use tempfile::TempDir;

const SQUAT: &str = "#Legs;#Squat;#3 sets 10 reps;#80kg;#30min";

/// Command pointed at `data_dir`, isolated from the user's own config
fn cli(data_dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("fitlog"));
    cmd.env("XDG_CONFIG_HOME", data_dir.join("config"))
        .env("HOME", data_dir)
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn register(data_dir: &Path) -> String {
    let output = cli(data_dir)
        .arg("register")
        .args(["--name", "Ada", "--email", "ada@example.com"])
        .output()
        .expect("Failed to run register");
    assert!(output.status.success());
    String::from_utf8(output.stdout).unwrap().trim().to_string()
}

fn total_workouts(data_dir: &Path, owner: &str) -> serde_json::Value {
    let output = cli(data_dir)
        .arg("dashboard")
        .args(["--owner", owner, "--at", "2024-03-10T20:00:00", "--json"])
        .output()
        .expect("Failed to run dashboard");
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    json["totalWorkouts"].clone()
}

fn log_squat(data_dir: &Path, owner: &str) {
    cli(data_dir)
        .arg("log")
        .args(["--owner", owner, "--at", "2024-03-10T09:00:00", SQUAT])
        .assert()
        .success();
}

#[test]
fn test_corrupted_journal_lines_ignored() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let owner = register(data_dir);

    fs::create_dir_all(data_dir.join("journal")).unwrap();
    fs::write(
        data_dir.join("journal/workouts.jsonl"),
        "{ invalid json }\n{ more invalid }\n",
    )
    .expect("Failed to write corrupted journal");

    log_squat(data_dir, &owner);

    assert_eq!(total_workouts(data_dir, &owner), 1);
}

#[test]
fn test_partial_journal_line() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let owner = register(data_dir);
    log_squat(data_dir, &owner);

    // Simulate a crash mid-write on a journal without rollback
    let mut file = fs::OpenOptions::new()
        .append(true)
        .open(data_dir.join("journal/workouts.jsonl"))
        .unwrap();
    write!(file, r#"{{"id":"partial"#).unwrap();
    drop(file);

    assert_eq!(total_workouts(data_dir, &owner), 1);
}

#[test]
fn test_empty_journal() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();
    let owner = register(data_dir);

    fs::create_dir_all(data_dir.join("journal")).unwrap();
    fs::write(data_dir.join("journal/workouts.jsonl"), "").unwrap();

    assert_eq!(total_workouts(data_dir, &owner), 0);

    cli(data_dir)
        .arg("rollup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 0 workouts"));
}

#[test]
fn test_corrupted_user_registry_is_reported() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    fs::write(data_dir.join("users.json"), "{ not valid json at all }")
        .expect("Failed to write corrupted registry");

    cli(data_dir)
        .arg("log")
        .args(["--owner", "anyone", SQUAT])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON error"));

    assert!(!data_dir.join("journal").exists());
}
