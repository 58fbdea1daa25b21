//! Structural interlocks.
//!
//! These are the rules the switchgear itself enforces, whoever is operating
//! it: no incomer closes onto a live panel and no coupler bridges two live
//! panels. Choreography steps are checked against these only; manual
//! actions add their own operator guards on top (see [`super::manual`]).

use thiserror::Error;

use super::state::{GensetPhase, StateStore};
use super::topology::{CouplerId, GeneratorId, UtilityId};

/// A requested change whose precondition does not hold.
///
/// Never fatal: callers treat it as a silent rejection (manual actions) or
/// an aborted run (choreographies).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("precondition not met: {0}")]
pub struct PreconditionNotMet(pub &'static str);

pub type Interlock = Result<(), PreconditionNotMet>;

pub(crate) fn require(condition: bool, reason: &'static str) -> Interlock {
    if condition {
        Ok(())
    } else {
        Err(PreconditionNotMet(reason))
    }
}

/// Utility incomer `u` may close onto its panel.
pub fn close_utility(store: &StateStore, u: UtilityId) -> Interlock {
    require(store.utility_available(u), "utility supply not available")?;
    require(!store.panel_live(u.home_panel()), "destination panel already live")
}

/// Generator incomer `g` may close onto its panel.
pub fn close_generator_incomer(store: &StateStore, g: GeneratorId) -> Interlock {
    require(store.genset(g).can_carry_load(), "generator not running")?;
    require(!store.panel_live(g.home_panel()), "destination panel already live")
}

/// Coupler `c` may close.
///
/// One of its sides (home panel or tie section) must be live, and when the
/// partner is already closed the two panels must not both be live.
pub fn close_coupler(store: &StateStore, c: CouplerId) -> Interlock {
    let home_live = store.panel_live(c.home_panel());
    let partner = c.partner();
    let partner_closed = store.is_closed(partner);
    let tie_live = partner_closed && store.panel_live(partner.home_panel());

    require(home_live || tie_live, "no live side to bridge from")?;
    require(
        !(home_live && tie_live),
        "would bridge two independently sourced panels",
    )
}

/// Genset `g` may be stopped.
pub fn stop_generator(store: &StateStore, g: GeneratorId) -> Interlock {
    require(!store.is_closed(g), "generator incomer still closed")
}

/// Genset `g` may be put into cool-down.
pub fn cool_down_generator(store: &StateStore, g: GeneratorId) -> Interlock {
    require(
        store.genset(g) == GensetPhase::Running,
        "generator not running",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::SwitchState;
    use crate::sim::topology::ElementId;

    #[test]
    fn utility_cannot_close_onto_live_panel() {
        let mut store = StateStore::initial();
        store.set_state(ElementId::Eb1, SwitchState::Open);
        assert!(close_utility(&store, UtilityId::Eb1).is_ok());

        store.set_state(ElementId::Bc1, SwitchState::Closed);
        store.set_state(ElementId::Bc2, SwitchState::Closed);
        assert_eq!(
            close_utility(&store, UtilityId::Eb1),
            Err(PreconditionNotMet("destination panel already live"))
        );
    }

    #[test]
    fn utility_needs_supply() {
        let mut store = StateStore::initial();
        store.set_state(ElementId::Eb2, SwitchState::TrippedOpen);
        store.set_feeder_healthy(UtilityId::Eb2, false);
        assert!(close_utility(&store, UtilityId::Eb2).is_err());
    }

    #[test]
    fn generator_incomer_needs_running_genset_and_dead_panel() {
        let mut store = StateStore::initial();
        assert!(close_generator_incomer(&store, GeneratorId::Dg1).is_err());

        store.set_genset(GeneratorId::Dg1, GensetPhase::Running);
        assert!(close_generator_incomer(&store, GeneratorId::Dg1).is_err());

        store.set_state(ElementId::Eb1, SwitchState::TrippedOpen);
        assert!(close_generator_incomer(&store, GeneratorId::Dg1).is_ok());
    }

    #[test]
    fn coupler_needs_a_live_side() {
        let mut store = StateStore::initial();
        store.set_grid_available(false);
        assert_eq!(
            close_coupler(&store, CouplerId::Bc1),
            Err(PreconditionNotMet("no live side to bridge from"))
        );
    }

    #[test]
    fn second_coupler_cannot_bridge_two_live_panels() {
        let mut store = StateStore::initial();
        assert!(close_coupler(&store, CouplerId::Bc1).is_ok());
        store.set_state(ElementId::Bc1, SwitchState::Closed);
        assert!(close_coupler(&store, CouplerId::Bc2).is_err());

        store.set_state(ElementId::Eb2, SwitchState::TrippedOpen);
        assert!(close_coupler(&store, CouplerId::Bc2).is_ok());
    }

    #[test]
    fn generator_stop_needs_open_incomer() {
        let mut store = StateStore::initial();
        store.set_genset(GeneratorId::Dg2, GensetPhase::Running);
        store.set_state(ElementId::Dg2, SwitchState::Closed);
        assert!(stop_generator(&store, GeneratorId::Dg2).is_err());
        store.set_state(ElementId::Dg2, SwitchState::Open);
        assert!(stop_generator(&store, GeneratorId::Dg2).is_ok());
    }
}
