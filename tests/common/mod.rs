//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use lt_switchover_sim::sim::choreography::Scenario;
use lt_switchover_sim::sim::session::SimulationSession;
use lt_switchover_sim::sim::state::StateStore;
use lt_switchover_sim::sim::topology::{GeneratorId, PanelId};

/// Upper bound on ticks for any single sequence (longest is 193 s).
pub const IDLE_LIMIT: u64 = 400;

/// Fresh session with `scenario` triggered on `g` and run to completion.
pub fn session_after(scenario: Scenario, g: GeneratorId) -> SimulationSession {
    let mut session = SimulationSession::new();
    assert!(
        session.trigger_scenario(scenario, Some(g)),
        "{scenario} should be accepted on a fresh session"
    );
    session.run_until_idle(IDLE_LIMIT);
    session
}

/// Source label of panel `p`.
pub fn label(session: &SimulationSession, p: PanelId) -> String {
    session.store().panel(p).source_label.clone()
}

/// Asserts that the store is back in normal operation and nothing is pending.
pub fn assert_normal_operation(session: &SimulationSession) {
    assert!(!session.is_simulating(), "sequence still running");
    assert!(session.snapshot().timers.is_empty(), "timers still pending");
    assert_eq!(session.store(), &StateStore::initial());
}

/// Every event-log message, oldest first.
pub fn messages(session: &SimulationSession) -> Vec<String> {
    session
        .event_log()
        .chronological()
        .map(|e| e.message.clone())
        .collect()
}
