//! Integration tests for the setlog binary.
//!
//! These tests verify end-to-end behavior including:
//! - Catalog seeding idempotency
//! - Scripted session workflow and persistence
//! - History listing and CSV export

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("setlog"))
}

fn store_json(data_dir: &Path) -> serde_json::Value {
    let contents = fs::read_to_string(data_dir.join("log.json")).expect("Failed to read store");
    serde_json::from_str(&contents).expect("Store is not valid JSON")
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Personal workout logging system"));
}

#[test]
fn test_seed_populates_catalog() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("seed")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Seeded"));

    let store = store_json(&data_dir);
    let exercises = store["exercises"].as_array().expect("exercises array");
    assert!(exercises.len() >= 40);
}

#[test]
fn test_second_seed_is_noop() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli().arg("seed").arg("--data-dir").arg(&data_dir).assert().success();

    let before = store_json(&data_dir)["exercises"].as_array().unwrap().len();

    cli()
        .arg("seed")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("already seeded"));

    let after = store_json(&data_dir)["exercises"].as_array().unwrap().len();
    assert_eq!(before, after);
}

#[test]
fn test_exercises_lists_grouped_catalog() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("exercises")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Chest"))
        .stdout(predicate::str::contains("Bench Press"));
}

#[test]
fn test_exercises_search_filter() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("exercises")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--search")
        .arg("deadlift")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deadlift"))
        .stdout(predicate::str::contains("Bench Press").not());
}

#[test]
fn test_scripted_session_persists_workout() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("session")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--script")
        .arg("a Bench Press; w 0 0 100; r 0 0 5; c 0 0; skip; f")
        .assert()
        .success()
        .stdout(predicate::str::contains("WORKOUT SAVED"))
        .stdout(predicate::str::contains("Completed sets: 1"))
        .stdout(predicate::str::contains("Logged volume:  500"));

    let store = store_json(&data_dir);
    let workouts = store["workouts"].as_array().unwrap();
    assert_eq!(workouts.len(), 1);
    assert!(!workouts[0]["completed_at"].is_null());

    // Default set count applies: three sets for the one exercise
    let sets = store["sets"].as_array().unwrap();
    assert_eq!(sets.len(), 3);
}

#[test]
fn test_session_delete_renumbers_sets() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("session")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--script")
        .arg("a Back Squat; d 0 1; f")
        .assert()
        .success();

    let store = store_json(&data_dir);
    let sets = store["sets"].as_array().unwrap();
    assert_eq!(sets.len(), 2);

    let mut orders: Vec<u64> = sets
        .iter()
        .map(|s| s["set_order"].as_u64().unwrap())
        .collect();
    orders.sort_unstable();
    assert_eq!(orders, vec![0, 1]);
}

#[test]
fn test_unknown_exercise_becomes_custom() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("session")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--script")
        .arg("a Yoke Carry Invitational; f")
        .assert()
        .success()
        .stdout(predicate::str::contains("Added Yoke Carry Invitational"));
}

#[test]
fn test_history_lists_finished_workout() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("session")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--script")
        .arg("a Bench Press; c 0 0; skip; f")
        .assert()
        .success();

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("done"))
        .stdout(predicate::str::contains("1 sets"));
}

#[test]
fn test_history_empty_store() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("history")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No workouts"));
}

#[test]
fn test_export_writes_csv() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .arg("session")
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--script")
        .arg("a Bench Press; f")
        .assert()
        .success();

    cli()
        .arg("export")
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 1 workouts"));

    let csv = fs::read_to_string(data_dir.join("history.csv")).unwrap();
    assert!(csv.starts_with("id,started_at,"));
    assert_eq!(csv.lines().count(), 2);
}
