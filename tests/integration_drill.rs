//! Integration tests for drill files, presets and CSV exports.

use std::fs;
use std::path::Path;

use lt_switchover_sim::config::DrillConfig;
use lt_switchover_sim::drill::{self, DrillError};
use lt_switchover_sim::io::export::{
    EVENTS_HEADER, TIMELINE_HEADER, export_events_csv, export_timeline_csv,
};
use lt_switchover_sim::sim::state::{StateStore, SwitchState};
use lt_switchover_sim::sim::topology::GeneratorId;

fn load(path: &str) -> DrillConfig {
    DrillConfig::from_toml_file(Path::new(path))
        .unwrap_or_else(|e| panic!("{path} should parse: {e}"))
}

#[test]
fn every_preset_runs_without_backfeed() {
    for name in DrillConfig::PRESETS {
        let cfg = DrillConfig::from_preset(name).expect("preset exists");
        let report = drill::run(&cfg).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert!(report.backfeed_violations.is_empty(), "{name}");
        assert_eq!(report.timeline.len() as u64, cfg.run.duration_secs + 1);
        assert_eq!(report.rejected(), 0, "{name}: {:?}", report.commands);
    }
}

#[test]
fn full_dg_cycle_returns_to_normal_on_dg2() {
    let report = drill::run(&DrillConfig::full_dg_cycle()).expect("preset runs");
    let at = |t: usize| &report.timeline[t];

    assert_eq!(at(28).dg2, SwitchState::Closed);
    assert_eq!(at(28).lt1_source, "DG-2 via Bus Coupler");
    assert_eq!(at(28).dg1, SwitchState::Open);
    // Restoration triggered at 40 ends at 40 + 193.
    assert!(at(232).simulating);
    assert!(!at(233).simulating);
    assert_eq!(at(233).eb1, SwitchState::Closed);
    assert_eq!(at(233).lt2_source, "EB-2");
    assert_eq!(report.final_snapshot.selected_generator, GeneratorId::Dg2);
}

#[test]
fn events_survive_sequence_ending_reset() {
    let report = drill::run(&DrillConfig::eb1_fail_and_restore()).expect("preset runs");
    let messages: Vec<&str> = report.events.iter().map(|e| e.message.as_str()).collect();

    assert!(messages.contains(&"EB-1 failure simulation started."));
    assert!(messages.contains(&"EB restoration complete. System back to normal operation."));
    assert!(
        report
            .events
            .windows(2)
            .all(|w| w[0].seq < w[1].seq && w[0].at_secs <= w[1].at_secs)
    );
    // The final snapshot only holds what the reset left behind.
    assert_eq!(report.final_snapshot.event_log.len(), 1);
}

#[test]
fn night_shift_drill_file_runs() {
    let cfg = load("drills/night_shift.toml");
    assert_eq!(cfg.session.selected_generator, GeneratorId::Dg2);

    let report = drill::run(&cfg).expect("drill runs");
    assert_eq!(report.name, "night_shift");
    assert_eq!(report.accepted(), 4);
    assert!(report.backfeed_violations.is_empty());
    assert!(report.timeline.iter().any(|r| r.lt1_source == "DG-2 via Bus Coupler"));
    assert!(!report.final_snapshot.simulating);
    assert!(
        report
            .final_snapshot
            .panels
            .iter()
            .zip(StateStore::initial().panels())
            .all(|(view, (_, status))| view.source_label == status.source_label)
    );
}

#[test]
fn operator_errors_drill_rejects_out_of_order_inputs() {
    let report = drill::run(&load("drills/operator_errors.toml")).expect("drill runs");
    assert_eq!(report.accepted(), 1);
    assert_eq!(report.rejected(), 5);
    let accepted: Vec<&str> = report
        .commands
        .iter()
        .filter(|c| c.accepted)
        .map(|c| c.command.as_str())
        .collect();
    assert_eq!(accepted, vec!["scenario eb1_fail"]);
}

#[test]
fn invalid_drill_reports_every_error() {
    let toml = r#"
        [run]
        duration_secs = 10

        [[command]]
        at_secs = 20
        kind = "scenario"
        name = "flood"

        [[command]]
        at_secs = 1
        kind = "select"
    "#;
    let cfg = DrillConfig::from_toml_str(toml).expect("syntax is fine");
    match drill::run(&cfg) {
        Err(DrillError::Invalid(errors)) => {
            assert!(errors.len() >= 3, "{errors:?}");
            assert!(errors.iter().any(|e| e.field.starts_with("command[0]")));
            assert!(errors.iter().any(|e| e.field.starts_with("command[1]")));
        }
        other => panic!("expected invalid drill, got {other:?}"),
    }
}

#[test]
fn csv_exports_write_headers_and_rows() {
    let report = drill::run(&DrillConfig::eb2_fail()).expect("preset runs");
    let dir = tempfile::tempdir().expect("temp dir");
    let events = dir.path().join("events.csv");
    let timeline = dir.path().join("timeline.csv");

    export_events_csv(&report.events, &events).expect("events written");
    export_timeline_csv(&report.timeline, &timeline).expect("timeline written");

    let events = fs::read_to_string(events).expect("events readable");
    let lines: Vec<&str> = events.lines().collect();
    assert_eq!(lines[0], EVENTS_HEADER);
    assert_eq!(lines.len(), report.events.len() + 1);
    assert!(lines[1].starts_with("0,00:00:00,info,"));

    let timeline = fs::read_to_string(timeline).expect("timeline readable");
    let lines: Vec<&str> = timeline.lines().collect();
    assert_eq!(lines[0], TIMELINE_HEADER);
    assert_eq!(lines.len(), 22);
    assert!(lines[21].ends_with("EB-1,EB-1 via Bus Coupler"), "{}", lines[21]);
}

#[test]
fn export_to_missing_directory_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("missing").join("events.csv");
    assert!(export_events_csv(&[], &path).is_err());
}
