//! Primitive switching operations.
//!
//! Every mutation of the state store made by a choreography or a manual
//! action goes through an [`Op`]: it is checked, applied, and logged here.

use std::fmt;

use super::event_log::{EventLog, Severity};
use super::interlock::{self, PreconditionNotMet};
use super::state::{GensetPhase, StateStore, SwitchState};
use super::topology::{CouplerId, ElementId, GeneratorId, UtilityId};

/// Who asked for an operation; manual ones are tagged in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Sequence,
    Manual,
}

/// Result of checking an operation against the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Ready,
    /// The element is already where the operation would put it.
    AlreadySatisfied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// HT supply lost: transformer and splitters go dark.
    LoseGrid,
    TripUtility(UtilityId),
    /// Feeder fault on one utility; trips its incomer.
    FeederFailure(UtilityId),
    /// Grid and every feeder back; no incomer is closed.
    RestoreSupply,
    CloseUtility(UtilityId),
    StartGenerator(GeneratorId),
    GeneratorReady(GeneratorId),
    CloseGeneratorIncomer(GeneratorId),
    OpenGeneratorIncomer(GeneratorId),
    CloseCoupler(CouplerId),
    OpenCoupler(CouplerId),
    CoolDownGenerator(GeneratorId),
    StopGenerator(GeneratorId),
    /// Terminal step handing control back to the session for a full reset.
    ResetSession,
}

impl Op {
    /// Element this operation acts on, if any.
    pub fn target(self) -> Option<ElementId> {
        match self {
            Self::TripUtility(u) | Self::FeederFailure(u) | Self::CloseUtility(u) => {
                Some(u.element())
            }
            Self::StartGenerator(g)
            | Self::GeneratorReady(g)
            | Self::CloseGeneratorIncomer(g)
            | Self::OpenGeneratorIncomer(g)
            | Self::CoolDownGenerator(g)
            | Self::StopGenerator(g) => Some(g.element()),
            Self::CloseCoupler(c) | Self::OpenCoupler(c) => Some(c.element()),
            Self::LoseGrid | Self::RestoreSupply => Some(ElementId::Transformer),
            Self::ResetSession => None,
        }
    }

    /// Transitional label shown on the target while this operation waits.
    pub fn pending_text(self) -> Option<&'static str> {
        match self {
            Self::CloseUtility(_) | Self::CloseGeneratorIncomer(_) | Self::CloseCoupler(_) => {
                Some("CLOSING...")
            }
            Self::OpenCoupler(_) => Some("OPENING..."),
            _ => None,
        }
    }

    /// Checks structural preconditions without mutating anything.
    pub fn check(self, store: &StateStore) -> Result<Check, PreconditionNotMet> {
        use Check::{AlreadySatisfied, Ready};

        let satisfied_if = |done: bool| if done { AlreadySatisfied } else { Ready };

        match self {
            Self::LoseGrid => Ok(satisfied_if(!store.grid_available())),
            Self::TripUtility(u) => Ok(satisfied_if(
                store.state(u.element()) == SwitchState::TrippedOpen,
            )),
            Self::FeederFailure(u) => Ok(satisfied_if(
                !store.feeder_healthy(u) && !store.is_closed(u),
            )),
            Self::RestoreSupply => Ok(satisfied_if(store.all_supply_available())),
            Self::CloseUtility(u) => {
                if store.is_closed(u) {
                    return Ok(AlreadySatisfied);
                }
                interlock::close_utility(store, u).map(|()| Ready)
            }
            Self::StartGenerator(g) => Ok(satisfied_if(store.genset(g).is_running())),
            Self::GeneratorReady(g) => match store.genset(g) {
                GensetPhase::Starting { .. } => Ok(Ready),
                GensetPhase::Stopped => Err(PreconditionNotMet("generator not started")),
                GensetPhase::Running | GensetPhase::CoolingDown => Ok(AlreadySatisfied),
            },
            Self::CloseGeneratorIncomer(g) => {
                if store.is_closed(g) {
                    return Ok(AlreadySatisfied);
                }
                interlock::close_generator_incomer(store, g).map(|()| Ready)
            }
            Self::OpenGeneratorIncomer(g) => Ok(satisfied_if(!store.is_closed(g))),
            Self::CloseCoupler(c) => {
                if store.is_closed(c) {
                    return Ok(AlreadySatisfied);
                }
                interlock::close_coupler(store, c).map(|()| Ready)
            }
            Self::OpenCoupler(c) => Ok(satisfied_if(!store.is_closed(c))),
            Self::CoolDownGenerator(g) => {
                if store.genset(g) == GensetPhase::CoolingDown {
                    return Ok(AlreadySatisfied);
                }
                interlock::cool_down_generator(store, g).map(|()| Ready)
            }
            Self::StopGenerator(g) => {
                if !store.genset(g).is_running() {
                    return Ok(AlreadySatisfied);
                }
                interlock::stop_generator(store, g).map(|()| Ready)
            }
            Self::ResetSession => Ok(Ready),
        }
    }

    /// Mutates the store and records what happened.
    ///
    /// Callers check first; `apply` does not re-validate.
    pub fn apply(self, store: &mut StateStore, log: &mut EventLog, now: u64, origin: Origin) {
        let (message, severity) = match self {
            Self::LoseGrid => {
                store.set_grid_available(false);
                (
                    "EB grid supply lost. Transformer POWER OFF.".to_string(),
                    Severity::Error,
                )
            }
            Self::TripUtility(u) => {
                store.set_state(u.element(), SwitchState::TrippedOpen);
                (
                    format!(
                        "{u} incomer TRIPPED OPEN. {} NO SUPPLY.",
                        u.home_panel()
                    ),
                    Severity::Error,
                )
            }
            Self::FeederFailure(u) => {
                store.set_feeder_healthy(u, false);
                store.set_state(u.element(), SwitchState::TrippedOpen);
                (
                    format!(
                        "{u} supply failure. {u} incomer TRIPPED OPEN, {} NO SUPPLY.",
                        u.home_panel()
                    ),
                    Severity::Error,
                )
            }
            Self::RestoreSupply => {
                store.set_grid_available(true);
                for u in UtilityId::ALL {
                    store.set_feeder_healthy(u, true);
                }
                (
                    "EB supply restored. Transformer POWER ON.".to_string(),
                    Severity::Success,
                )
            }
            Self::CloseUtility(u) => {
                store.set_state(u.element(), SwitchState::Closed);
                (
                    format!("{u} incomer CLOSED. {} fed from {u}.", u.home_panel()),
                    Severity::Success,
                )
            }
            Self::StartGenerator(g) => {
                store.set_genset(g, GensetPhase::Starting { elapsed: 0 });
                store.set_state(g.element(), SwitchState::Starting);
                (format!("{g} starting..."), Severity::Info)
            }
            Self::GeneratorReady(g) => {
                store.set_genset(g, GensetPhase::Running);
                store.set_state(g.element(), SwitchState::Open);
                (
                    format!("{g} running at 415V / 50Hz. Incomer OPEN."),
                    Severity::Success,
                )
            }
            Self::CloseGeneratorIncomer(g) => {
                store.set_state(g.element(), SwitchState::Closed);
                (
                    format!("{g} incomer CLOSED. {} fed from {g}.", g.home_panel()),
                    Severity::Success,
                )
            }
            Self::OpenGeneratorIncomer(g) => {
                store.set_state(g.element(), SwitchState::Open);
                (
                    format!("{g} incomer OPENED. {} off {g}.", g.home_panel()),
                    Severity::Info,
                )
            }
            Self::CloseCoupler(c) => {
                store.set_state(c.element(), SwitchState::Closed);
                (format!("{c} CLOSED."), Severity::Success)
            }
            Self::OpenCoupler(c) => {
                store.set_state(c.element(), SwitchState::Open);
                (format!("{c} OPENED."), Severity::Info)
            }
            Self::CoolDownGenerator(g) => {
                store.set_genset(g, GensetPhase::CoolingDown);
                (format!("{g} cool-down started."), Severity::Info)
            }
            Self::StopGenerator(g) => {
                store.set_genset(g, GensetPhase::Stopped);
                (format!("{g} stopped."), Severity::Info)
            }
            Self::ResetSession => return,
        };

        let message = match origin {
            Origin::Sequence => message,
            Origin::Manual => format!("{message} (manual)"),
        };
        log.record(now, message, severity);
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoseGrid => write!(f, "lose grid"),
            Self::TripUtility(u) => write!(f, "trip {u}"),
            Self::FeederFailure(u) => write!(f, "fail {u} feeder"),
            Self::RestoreSupply => write!(f, "restore supply"),
            Self::CloseUtility(u) => write!(f, "close {u}"),
            Self::StartGenerator(g) => write!(f, "start {g}"),
            Self::GeneratorReady(g) => write!(f, "{g} ready"),
            Self::CloseGeneratorIncomer(g) => write!(f, "close {g} incomer"),
            Self::OpenGeneratorIncomer(g) => write!(f, "open {g} incomer"),
            Self::CloseCoupler(c) => write!(f, "close {c}"),
            Self::OpenCoupler(c) => write!(f, "open {c}"),
            Self::CoolDownGenerator(g) => write!(f, "cool down {g}"),
            Self::StopGenerator(g) => write!(f, "stop {g}"),
            Self::ResetSession => write!(f, "reset"),
        }
    }
}
