//! Basic CLI E2E tests.
//!
//! Tests run the built binary against a throwaway data directory and
//! verify outputs.

use std::path::Path;
use std::process::Command;

use serde_json::Value;

/// Run a CLI command against `home` and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_rewardbox"))
        .args(args)
        .env("REWARDBOX_HOME", home)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command and expect success.
fn run_cli_success(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args);
    assert_eq!(code, 0, "CLI command {args:?} failed: {stderr}");
    stdout
}

fn board(home: &Path) -> Vec<Value> {
    let stdout = run_cli_success(home, &["board", "--json"]);
    serde_json::from_str(&stdout).expect("board output is JSON")
}

fn statuses(home: &Path) -> Vec<String> {
    board(home)
        .iter()
        .map(|card| card["status"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_board_has_seven_days() {
    let home = tempfile::tempdir().unwrap();
    let cards = board(home.path());
    assert_eq!(cards.len(), 7);
    assert!(cards.iter().all(|c| c["status"] != "claimed"));
    assert!(cards.iter().all(|c| c["reward"].is_null()));
}

#[test]
fn test_board_text() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["board"]);
    assert!(stdout.starts_with("Unlocked through day"));
    assert_eq!(stdout.lines().filter(|l| l.starts_with("Day ")).count(), 7);
}

#[test]
fn test_status_snapshot() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["status"]);
    let snapshot: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(snapshot["type"], "StateSnapshot");
    assert!(snapshot["unlocked_day"].as_u64().unwrap() <= 7);
    assert!(snapshot["reference_time"].as_str().unwrap().ends_with("-06:00"));
}

#[test]
fn test_open_invalid_day_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["open", "8"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error: Day 8 does not exist"));
}

#[test]
fn test_config_get_set() {
    let home = tempfile::tempdir().unwrap();
    let value = run_cli_success(home.path(), &["config", "get", "hold.duration_ms"]);
    assert_eq!(value.trim(), "5000");

    run_cli_success(home.path(), &["config", "set", "hold.duration_ms", "3000"]);
    let value = run_cli_success(home.path(), &["config", "get", "hold.duration_ms"]);
    assert_eq!(value.trim(), "3000");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "hold.tick_ms", "0"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_eq!(code, 1);
}

#[test]
fn test_unreadable_database_is_not_fatal() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join("rewardbox.db"),
        "not a database, just some bytes\n".repeat(64),
    )
    .unwrap();

    let cards = board(home.path());
    assert_eq!(cards.len(), 7);

    let (stdout, stderr, code) = run_cli(home.path(), &["status"]);
    assert_eq!(code, 0, "status failed: {stderr}");
    assert!(stdout.contains("StateSnapshot"));
    assert!(stderr.contains("storage unavailable"));
}

#[test]
fn test_config_path_is_in_home() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["config", "path"]);
    assert_eq!(Path::new(stdout.trim()), home.path().join("config.toml"));
}

#[cfg(feature = "admin")]
#[test]
fn test_open_holds_and_claims() {
    let home = tempfile::tempdir().unwrap();
    run_cli_success(home.path(), &["debug", "set-day", "3"]);
    run_cli_success(home.path(), &["config", "set", "hold.reveal_delay_ms", "0"]);

    let stdout = run_cli_success(home.path(), &["open", "3", "--hold-ms", "1"]);
    assert!(stdout.contains("\"type\":\"HoldStarted\""));
    assert!(stdout.contains("\"type\":\"RewardRevealed\""));
    assert_eq!(
        statuses(home.path()),
        vec!["available", "available", "claimed", "locked", "locked", "locked", "locked"]
    );

    // A claimed day opens read-only.
    let stdout = run_cli_success(home.path(), &["open", "3"]);
    assert!(stdout.starts_with("Already claimed:"));
}

#[cfg(feature = "admin")]
#[test]
fn test_open_locked_day_fails() {
    let home = tempfile::tempdir().unwrap();
    run_cli_success(home.path(), &["debug", "set-day", "2"]);
    let (_, stderr, code) = run_cli(home.path(), &["open", "5"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("locked"));
}

#[cfg(feature = "admin")]
#[test]
fn test_debug_claim_all_and_reset() {
    let home = tempfile::tempdir().unwrap();
    let stdout = run_cli_success(home.path(), &["debug", "claim-all"]);
    assert!(stdout.contains("AllClaimed"));
    assert!(statuses(home.path()).iter().all(|s| s == "claimed"));

    run_cli_success(home.path(), &["debug", "reset"]);
    assert!(statuses(home.path()).iter().all(|s| s != "claimed"));
}
