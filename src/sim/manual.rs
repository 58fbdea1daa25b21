//! Manual-mode operator actions.
//!
//! Each action is guarded by the operator rules of the switchboard on top of
//! the structural interlocks, then either applied immediately or, for a
//! generator start, handed to the sequencer.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::choreography::{self, Choreography};
use super::interlock::{self, Interlock, require};
use super::ops::Op;
use super::state::{GensetPhase, StateStore, SwitchState};
use super::topology::{CouplerId, GeneratorId, UtilityId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualAction {
    StartGen,
    CloseGenIncomer,
    OpenGenIncomer,
    #[serde(rename = "close_coupler_1")]
    CloseCoupler1,
    #[serde(rename = "open_coupler_1")]
    OpenCoupler1,
    #[serde(rename = "close_coupler_2")]
    CloseCoupler2,
    #[serde(rename = "open_coupler_2")]
    OpenCoupler2,
    #[serde(rename = "close_eb1")]
    CloseEb1,
    #[serde(rename = "close_eb2")]
    CloseEb2,
    OpenEbAll,
    StopGen,
    RestoreEbSupply,
}

/// How an accepted action takes effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualPlan {
    Immediate(Vec<Op>),
    Sequence(Choreography),
}

impl ManualAction {
    pub const ALL: [ManualAction; 12] = [
        ManualAction::StartGen,
        ManualAction::CloseGenIncomer,
        ManualAction::OpenGenIncomer,
        ManualAction::CloseCoupler1,
        ManualAction::OpenCoupler1,
        ManualAction::CloseCoupler2,
        ManualAction::OpenCoupler2,
        ManualAction::CloseEb1,
        ManualAction::CloseEb2,
        ManualAction::OpenEbAll,
        ManualAction::StopGen,
        ManualAction::RestoreEbSupply,
    ];

    /// Drill-file name, e.g. `"close_coupler_1"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::StartGen => "start_gen",
            Self::CloseGenIncomer => "close_gen_incomer",
            Self::OpenGenIncomer => "open_gen_incomer",
            Self::CloseCoupler1 => "close_coupler_1",
            Self::OpenCoupler1 => "open_coupler_1",
            Self::CloseCoupler2 => "close_coupler_2",
            Self::OpenCoupler2 => "open_coupler_2",
            Self::CloseEb1 => "close_eb1",
            Self::CloseEb2 => "close_eb2",
            Self::OpenEbAll => "open_eb_all",
            Self::StopGen => "stop_gen",
            Self::RestoreEbSupply => "restore_eb_supply",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Operator rules for this action; `g` is the selected generator.
    pub fn guard(self, store: &StateStore, g: GeneratorId) -> Interlock {
        match self {
            Self::StartGen => {
                require(
                    store.running_generator().is_none(),
                    "a generator is already running",
                )?;
                require(
                    UtilityId::ALL.iter().all(|&u| !store.is_closed(u)),
                    "a utility incomer is still closed",
                )
            }
            Self::CloseGenIncomer => {
                require(
                    store.genset(g) == GensetPhase::Running,
                    "generator not running",
                )?;
                require(
                    store.state(g.element()) == SwitchState::Open,
                    "generator incomer not open",
                )?;
                interlock::close_generator_incomer(store, g)
            }
            Self::OpenGenIncomer => {
                require(store.is_closed(g), "generator incomer not closed")?;
                require(
                    CouplerId::ALL.iter().all(|&c| !store.is_closed(c)),
                    "open both bus couplers first",
                )
            }
            Self::CloseCoupler1 => close_coupler(store, CouplerId::Bc1),
            Self::CloseCoupler2 => close_coupler(store, CouplerId::Bc2),
            Self::OpenCoupler1 => open_coupler(store, CouplerId::Bc1),
            Self::OpenCoupler2 => open_coupler(store, CouplerId::Bc2),
            Self::CloseEb1 => close_utility(store, UtilityId::Eb1),
            Self::CloseEb2 => close_utility(store, UtilityId::Eb2),
            Self::OpenEbAll => {
                require(
                    UtilityId::ALL.iter().all(|&u| store.is_closed(u)),
                    "both utility incomers must be closed",
                )?;
                no_generator_incomer_closed(store)
            }
            Self::StopGen => {
                require(store.genset(g).is_running(), "generator not running")?;
                interlock::stop_generator(store, g)
            }
            Self::RestoreEbSupply => require(
                !store.all_supply_available(),
                "utility supply already available",
            ),
        }
    }

    /// What accepting the action does; `g` is the selected generator.
    pub fn plan(self, g: GeneratorId) -> ManualPlan {
        let ops = match self {
            Self::StartGen => return ManualPlan::Sequence(choreography::generator_start(g)),
            Self::CloseGenIncomer => vec![Op::CloseGeneratorIncomer(g)],
            Self::OpenGenIncomer => vec![Op::OpenGeneratorIncomer(g)],
            Self::CloseCoupler1 => vec![Op::CloseCoupler(CouplerId::Bc1)],
            Self::OpenCoupler1 => vec![Op::OpenCoupler(CouplerId::Bc1)],
            Self::CloseCoupler2 => vec![Op::CloseCoupler(CouplerId::Bc2)],
            Self::OpenCoupler2 => vec![Op::OpenCoupler(CouplerId::Bc2)],
            Self::CloseEb1 => vec![Op::CloseUtility(UtilityId::Eb1)],
            Self::CloseEb2 => vec![Op::CloseUtility(UtilityId::Eb2)],
            Self::OpenEbAll => vec![
                Op::LoseGrid,
                Op::TripUtility(UtilityId::Eb1),
                Op::TripUtility(UtilityId::Eb2),
            ],
            Self::StopGen => vec![Op::StopGenerator(g)],
            Self::RestoreEbSupply => vec![Op::RestoreSupply],
        };
        ManualPlan::Immediate(ops)
    }
}

impl fmt::Display for ManualAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn no_generator_incomer_closed(store: &StateStore) -> Interlock {
    require(
        store.carrying_generator().is_none(),
        "a generator incomer is closed",
    )
}

fn close_coupler(store: &StateStore, c: CouplerId) -> Interlock {
    require(!store.is_closed(c), "coupler already closed")?;
    interlock::close_coupler(store, c)
}

/// Opening must not strand a panel that has no supply of its own to go to.
fn open_coupler(store: &StateStore, c: CouplerId) -> Interlock {
    require(store.is_closed(c), "coupler not closed")?;

    let mut after = store.clone();
    after.set_state(c.element(), SwitchState::Open);
    let stranded = super::topology::PanelId::ALL.into_iter().any(|p| {
        store.panel_live(p) && !after.panel_live(p) && !store.utility_available(p.utility())
    });
    require(!stranded, "opposite supply path not established")
}

fn close_utility(store: &StateStore, u: UtilityId) -> Interlock {
    require(!store.is_closed(u), "utility incomer already closed")?;
    no_generator_incomer_closed(store)?;
    interlock::close_utility(store, u)
}
