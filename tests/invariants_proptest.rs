//! Property tests: safety invariants over random operator input.

use proptest::prelude::*;

use lt_switchover_sim::sim::choreography::Scenario;
use lt_switchover_sim::sim::manual::ManualAction;
use lt_switchover_sim::sim::session::SimulationSession;
use lt_switchover_sim::sim::state::StateStore;
use lt_switchover_sim::sim::topology::GeneratorId;

#[derive(Debug, Clone, Copy)]
enum Input {
    Trigger(Scenario, Option<GeneratorId>),
    Manual(ManualAction, GeneratorId),
    Select(GeneratorId),
    Reset,
    Wait(u64),
}

fn generator() -> impl Strategy<Value = GeneratorId> {
    prop::sample::select(GeneratorId::ALL.to_vec())
}

fn input() -> impl Strategy<Value = Input> {
    prop_oneof![
        2 => (prop::sample::select(Scenario::ALL.to_vec()), prop::option::of(generator()))
            .prop_map(|(s, g)| Input::Trigger(s, g)),
        4 => (prop::sample::select(ManualAction::ALL.to_vec()), generator())
            .prop_map(|(a, g)| Input::Manual(a, g)),
        1 => generator().prop_map(Input::Select),
        1 => Just(Input::Reset),
        3 => (1u64..40).prop_map(Input::Wait),
    ]
}

fn apply(session: &mut SimulationSession, input: Input) {
    match input {
        Input::Trigger(s, g) => {
            session.trigger_scenario(s, g);
        }
        Input::Manual(a, g) => {
            session.manual_action(a, g);
        }
        Input::Select(g) => {
            session.select_generator(g);
        }
        Input::Reset => session.reset(),
        Input::Wait(secs) => session.advance(secs),
    }
}

proptest! {
    #[test]
    fn no_panel_is_ever_backfed(inputs in prop::collection::vec(input(), 1..80)) {
        let mut session = SimulationSession::new();
        for input in inputs {
            apply(&mut session, input);
            prop_assert!(
                session.store().backfeed_violations().is_empty(),
                "backfeed after {:?}", input
            );
        }
    }

    #[test]
    fn utility_never_closes_beside_a_generator(inputs in prop::collection::vec(input(), 1..80)) {
        let mut session = SimulationSession::new();
        for input in inputs {
            apply(&mut session, input);
            if session.store().carrying_generator().is_some() {
                for g in GeneratorId::ALL {
                    prop_assert!(!session.can_manual(ManualAction::CloseEb1, g));
                    prop_assert!(!session.can_manual(ManualAction::CloseEb2, g));
                }
            }
        }
    }

    #[test]
    fn reset_always_returns_to_initial(inputs in prop::collection::vec(input(), 0..40)) {
        let mut session = SimulationSession::new();
        for input in inputs {
            apply(&mut session, input);
        }
        session.reset();
        prop_assert!(!session.is_simulating());
        prop_assert!(session.snapshot().timers.is_empty());
        prop_assert_eq!(session.store(), &StateStore::initial());
        prop_assert_eq!(session.event_log().len(), 1);
    }

    #[test]
    fn sequences_always_finish(inputs in prop::collection::vec(input(), 0..40)) {
        let mut session = SimulationSession::new();
        for input in inputs {
            apply(&mut session, input);
        }
        session.run_until_idle(400);
        prop_assert!(!session.is_simulating());
        prop_assert!(session.snapshot().timers.is_empty());
    }
}
