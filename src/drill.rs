//! Headless drill runner.
//!
//! Replays a [`DrillConfig`] against a fresh session one simulated second at
//! a time, recording the switchboard timeline, every event-log entry (even
//! those later cleared by a reset) and any backfeed the store reports.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{Command, ConfigError, DrillConfig};
use crate::sim::event_log::LogEntry;
use crate::sim::session::SimulationSession;
use crate::sim::snapshot::Snapshot;
use crate::sim::state::{StateStore, SwitchState};
use crate::sim::topology::{ElementId, PanelId};

/// Errors from loading, running or exporting a drill.
#[derive(Debug, Error)]
pub enum DrillError {
    #[error("invalid drill: {}", join_errors(.0))]
    Invalid(Vec<ConfigError>),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Switchboard state at one simulated second.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineRow {
    pub at_secs: u64,
    pub simulating: bool,
    pub eb1: SwitchState,
    pub eb2: SwitchState,
    pub dg1: SwitchState,
    pub dg2: SwitchState,
    pub bc1: SwitchState,
    pub bc2: SwitchState,
    pub lt1_source: String,
    pub lt2_source: String,
}

impl TimelineRow {
    fn capture(at_secs: u64, simulating: bool, store: &StateStore) -> Self {
        Self {
            at_secs,
            simulating,
            eb1: store.state(ElementId::Eb1),
            eb2: store.state(ElementId::Eb2),
            dg1: store.state(ElementId::Dg1),
            dg2: store.state(ElementId::Dg2),
            bc1: store.state(ElementId::Bc1),
            bc2: store.state(ElementId::Bc2),
            lt1_source: store.panel(PanelId::Lt1).source_label.clone(),
            lt2_source: store.panel(PanelId::Lt2).source_label.clone(),
        }
    }
}

/// What happened to one drill command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutcome {
    pub at_secs: u64,
    pub command: String,
    pub accepted: bool,
}

/// A panel found fed by more than one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BackfeedViolation {
    pub at_secs: u64,
    pub panel: PanelId,
}

/// Everything a finished drill produced.
#[derive(Debug, Clone, Serialize)]
pub struct DrillReport {
    pub name: String,
    pub duration_secs: u64,
    /// One row per simulated second, `0..=duration_secs`.
    pub timeline: Vec<TimelineRow>,
    /// Every event-log entry in recording order.
    pub events: Vec<LogEntry>,
    pub commands: Vec<CommandOutcome>,
    pub backfeed_violations: Vec<BackfeedViolation>,
    pub final_snapshot: Snapshot,
}

impl DrillReport {
    pub fn accepted(&self) -> usize {
        self.commands.iter().filter(|c| c.accepted).count()
    }

    pub fn rejected(&self) -> usize {
        self.commands.len() - self.accepted()
    }
}

impl fmt::Display for DrillReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Drill Report: {} ---", self.name)?;
        writeln!(f, "Duration:            {} s", self.duration_secs)?;
        writeln!(
            f,
            "Commands:            {} accepted, {} rejected",
            self.accepted(),
            self.rejected()
        )?;
        writeln!(f, "Event log entries:   {}", self.events.len())?;
        writeln!(f, "Backfeed violations: {}", self.backfeed_violations.len())?;
        for panel in &self.final_snapshot.panels {
            writeln!(f, "{:<20} {}", format!("{}:", panel.id), panel.source_label)?;
        }
        Ok(())
    }
}

/// Runs a drill to completion.
///
/// # Errors
///
/// Returns [`DrillError::Invalid`] with every validation error when the
/// configuration is rejected; the session is never started in that case.
pub fn run(cfg: &DrillConfig) -> Result<DrillReport, DrillError> {
    let errors = cfg.validate();
    if !errors.is_empty() {
        return Err(DrillError::Invalid(errors));
    }
    let schedule = cfg.schedule().map_err(DrillError::Invalid)?;
    let duration = cfg.run.duration_secs;
    info!(drill = %cfg.run.name, duration, commands = schedule.len(), "drill started");

    let mut session = SimulationSession::new();
    session.select_generator(cfg.session.selected_generator);

    let mut events: Vec<LogEntry> = session.event_log().chronological().cloned().collect();
    let mut timeline = Vec::with_capacity(usize::try_from(duration).unwrap_or(0) + 1);
    let mut outcomes = Vec::with_capacity(schedule.len());
    let mut violations = Vec::new();
    let mut pending = schedule.into_iter().peekable();

    for t in 0..=duration {
        while let Some((_, command)) = pending.next_if(|(at, _)| *at == t) {
            let first_seq = session.event_log().next_seq();
            let accepted = issue(&mut session, command);
            debug!(at_secs = t, ?command, accepted, "drill command");
            events.extend(session.event_log().since(first_seq).cloned());
            outcomes.push(CommandOutcome {
                at_secs: t,
                command: describe(command),
                accepted,
            });
            note_backfeed(&session, t, &mut violations);
        }

        timeline.push(TimelineRow::capture(t, session.is_simulating(), session.store()));

        if t < duration {
            events.extend(session.tick());
            note_backfeed(&session, t + 1, &mut violations);
        }
    }

    let report = DrillReport {
        name: cfg.run.name.clone(),
        duration_secs: duration,
        timeline,
        events,
        commands: outcomes,
        backfeed_violations: violations,
        final_snapshot: session.snapshot(),
    };
    info!(
        drill = %report.name,
        accepted = report.accepted(),
        rejected = report.rejected(),
        "drill finished"
    );
    Ok(report)
}

fn issue(session: &mut SimulationSession, command: Command) -> bool {
    match command {
        Command::Trigger(scenario, g) => session.trigger_scenario(scenario, g),
        Command::Manual(action, g) => {
            let g = g.unwrap_or(session.selected_generator());
            session.manual_action(action, g)
        }
        Command::Reset => {
            session.reset();
            true
        }
        Command::Select(g) => session.select_generator(g),
    }
}

fn describe(command: Command) -> String {
    match command {
        Command::Trigger(scenario, Some(g)) => format!("scenario {} ({g})", scenario.name()),
        Command::Trigger(scenario, None) => format!("scenario {}", scenario.name()),
        Command::Manual(action, Some(g)) => format!("manual {action} ({g})"),
        Command::Manual(action, None) => format!("manual {action}"),
        Command::Reset => "reset".to_string(),
        Command::Select(g) => format!("select {g}"),
    }
}

fn note_backfeed(session: &SimulationSession, at_secs: u64, out: &mut Vec<BackfeedViolation>) {
    for &panel in session.store().backfeed_violations() {
        warn!(at_secs, %panel, "backfeed detected");
        out.push(BackfeedViolation { at_secs, panel });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_drill_is_rejected_before_running() {
        let mut cfg = DrillConfig::eb1_fail();
        cfg.run.duration_secs = 0;
        match run(&cfg) {
            Err(DrillError::Invalid(errors)) => {
                assert!(errors.iter().any(|e| e.field == "run.duration_secs"));
            }
            other => panic!("expected invalid drill, got {other:?}"),
        }
    }

    #[test]
    fn timeline_has_one_row_per_second() {
        let report = run(&DrillConfig::eb1_fail()).expect("preset runs");
        assert_eq!(report.timeline.len(), 21);
        assert_eq!(report.timeline[0].eb1, SwitchState::TrippedOpen);
        assert!(report.timeline[0].simulating);
        assert!(!report.timeline[12].simulating);
        assert_eq!(report.timeline[12].lt1_source, "EB-2 via Bus Coupler");
    }

    #[test]
    fn report_display_lists_panels() {
        let report = run(&DrillConfig::eb2_fail()).expect("preset runs");
        let text = report.to_string();
        assert!(text.contains("eb2_fail"));
        assert!(text.contains("LT-2:"));
        assert!(text.contains("EB-1 via Bus Coupler"));
    }

    #[test]
    fn drill_error_display_joins_errors() {
        let err = DrillError::Invalid(vec![
            ConfigError {
                field: "a".into(),
                message: "x".into(),
            },
            ConfigError {
                field: "b".into(),
                message: "y".into(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "invalid drill: config error: a: x; config error: b: y"
        );
    }
}
