//! Integration tests for manual-mode operation and its interlocks.

mod common;

use lt_switchover_sim::sim::choreography::Scenario;
use lt_switchover_sim::sim::manual::ManualAction;
use lt_switchover_sim::sim::session::SimulationSession;
use lt_switchover_sim::sim::state::{GensetPhase, SwitchState};
use lt_switchover_sim::sim::topology::{CouplerId, ElementId, GeneratorId, PanelId};

const DG1: GeneratorId = GeneratorId::Dg1;

/// Operator drops both utilities and starts DG-1, waiting for it to settle.
fn dg1_idling() -> SimulationSession {
    let mut session = SimulationSession::new();
    assert!(session.manual_action(ManualAction::OpenEbAll, DG1));
    assert!(session.manual_action(ManualAction::StartGen, DG1));
    session.run_until_idle(common::IDLE_LIMIT);
    assert_eq!(session.store().genset(DG1), GensetPhase::Running);
    session
}

#[test]
fn manual_changeover_to_generator_and_back() {
    let mut session = dg1_idling();
    assert_eq!(
        session.store().element(ElementId::Dg1).text,
        "OPEN (DG-1 RUNNING)"
    );

    for action in [
        ManualAction::CloseGenIncomer,
        ManualAction::CloseCoupler1,
        ManualAction::CloseCoupler2,
    ] {
        assert!(session.manual_action(action, DG1), "{action}");
    }
    assert_eq!(common::label(&session, PanelId::Lt1), "DG-1");
    assert_eq!(common::label(&session, PanelId::Lt2), "DG-1 via Bus Coupler");

    for action in [
        ManualAction::RestoreEbSupply,
        ManualAction::OpenCoupler2,
        ManualAction::OpenCoupler1,
        ManualAction::OpenGenIncomer,
        ManualAction::CloseEb1,
        ManualAction::CloseEb2,
        ManualAction::StopGen,
    ] {
        assert!(session.manual_action(action, DG1), "{action}");
        assert!(session.store().backfeed_violations().is_empty(), "{action}");
    }
    common::assert_normal_operation(&session);
}

#[test]
fn manual_messages_are_tagged() {
    let mut session = SimulationSession::new();
    session.manual_action(ManualAction::OpenEbAll, DG1);
    let messages = common::messages(&session);
    assert!(messages.len() > 1);
    assert!(messages[1..].iter().all(|m| m.ends_with("(manual)")), "{messages:?}");
}

#[test]
fn generator_start_locks_out_other_actions() {
    let mut session = SimulationSession::new();
    session.manual_action(ManualAction::OpenEbAll, DG1);
    assert!(session.manual_action(ManualAction::StartGen, DG1));
    assert!(session.is_simulating());
    assert_eq!(session.store().state(ElementId::Dg1), SwitchState::Starting);

    assert!(!session.manual_action(ManualAction::CloseGenIncomer, DG1));
    session.advance(9);
    assert!(!session.manual_action(ManualAction::CloseGenIncomer, DG1));
    session.advance(1);
    assert!(!session.is_simulating());
    assert!(session.manual_action(ManualAction::CloseGenIncomer, DG1));
}

#[test]
fn start_gen_requires_every_utility_open() {
    let mut session = SimulationSession::new();
    assert!(!session.can_manual(ManualAction::StartGen, DG1));
    assert!(!session.manual_action(ManualAction::StartGen, DG1));
    assert_eq!(session.store().genset(DG1), GensetPhase::Stopped);
}

#[test]
fn coupler_closes_only_from_a_live_side() {
    let mut session = dg1_idling();
    // Both panels dead: nothing to bridge from.
    assert!(!session.manual_action(ManualAction::CloseCoupler2, DG1));
    assert!(!session.manual_action(ManualAction::CloseCoupler1, DG1));

    session.manual_action(ManualAction::CloseGenIncomer, DG1);
    // BC-2 sits on the dead side and its partner is still open.
    assert!(!session.manual_action(ManualAction::CloseCoupler2, DG1));
    assert!(session.manual_action(ManualAction::CloseCoupler1, DG1));
    assert!(session.manual_action(ManualAction::CloseCoupler2, DG1));
}

#[test]
fn couplers_never_bridge_two_utilities() {
    let mut session = SimulationSession::new();
    assert!(session.manual_action(ManualAction::CloseCoupler1, DG1));
    assert!(!session.manual_action(ManualAction::CloseCoupler2, DG1));
    assert!(session.store().backfeed_violations().is_empty());
}

#[test]
fn coupler_open_refused_when_it_would_strand_a_panel() {
    let mut session = dg1_idling();
    for action in [
        ManualAction::CloseGenIncomer,
        ManualAction::CloseCoupler1,
        ManualAction::CloseCoupler2,
    ] {
        session.manual_action(action, DG1);
    }

    // LT-2 would go dark with EB-2 still unavailable.
    assert!(!session.manual_action(ManualAction::OpenCoupler2, DG1));
    assert!(session.store().is_closed(CouplerId::Bc2));

    assert!(session.manual_action(ManualAction::RestoreEbSupply, DG1));
    assert!(session.manual_action(ManualAction::OpenCoupler2, DG1));
}

#[test]
fn gen_incomer_stays_closed_while_couplers_closed() {
    let mut session = dg1_idling();
    session.manual_action(ManualAction::CloseGenIncomer, DG1);
    session.manual_action(ManualAction::CloseCoupler1, DG1);

    assert!(!session.manual_action(ManualAction::OpenGenIncomer, DG1));
    assert!(!session.manual_action(ManualAction::StopGen, DG1));
    assert!(session.store().is_closed(DG1));
}

#[test]
fn manual_actions_rejected_during_automatic_sequence() {
    let mut session = SimulationSession::new();
    session.trigger_scenario(Scenario::TotalEbFail, Some(DG1));
    for action in ManualAction::ALL {
        assert!(!session.manual_action(action, DG1), "{action}");
    }
}
