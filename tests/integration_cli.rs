//! End-to-end runs of the binary.

use std::fs;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lt-switchover-sim"))
        .args(args)
        .env("RUST_LOG", "warn")
        .output()
        .expect("lt-switchover-sim process should run")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("stdout should be valid UTF-8")
}

#[test]
fn default_run_prints_total_failure_report() {
    let output = run(&[]);
    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let text = stdout(&output);
    assert!(text.contains("--- Drill Report: total_eb_fail ---"), "{text}");
    assert!(text.contains("Backfeed violations: 0"));
    assert!(text.contains("DG-1 via Bus Coupler"));
}

#[test]
fn drill_file_with_exports() {
    let dir = tempfile::tempdir().expect("temp dir");
    let events = dir.path().join("events.csv");
    let timeline = dir.path().join("timeline.csv");

    let output = run(&[
        "--drill",
        "drills/night_shift.toml",
        "--events-out",
        events.to_str().expect("utf-8 path"),
        "--timeline-out",
        timeline.to_str().expect("utf-8 path"),
    ]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("night_shift"));

    let rows = fs::read_to_string(&timeline).expect("timeline written");
    assert_eq!(rows.lines().count(), 302);
    let log = fs::read_to_string(&events).expect("events written");
    assert!(log.contains("DG-2 starting..."));
}

#[test]
fn soak_passes_and_is_reported() {
    let output = run(&["--soak", "500", "--seed", "3"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("Seed:                3"));
    assert!(text.contains("Result:              PASS"));
}

#[test]
fn bad_arguments_exit_non_zero() {
    assert!(!run(&["--preset", "flood"]).status.success());
    assert!(!run(&["--drill", "drills/does_not_exist.toml"]).status.success());
    assert!(!run(&["--seed", "4"]).status.success());
    assert!(!run(&["--bogus"]).status.success());
}
