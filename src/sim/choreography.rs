//! Scripted switching sequences as data.
//!
//! A choreography is an ordered list of [`Step`]s; the [`Sequencer`] walks it
//! and parks on a timer wherever a step carries a delay.
//!
//! [`Sequencer`]: super::sequencer::Sequencer

use std::fmt;

use serde::{Deserialize, Serialize};

use super::event_log::Severity;
use super::interlock::{PreconditionNotMet, require};
use super::ops::{Op, Origin};
use super::state::StateStore;
use super::topology::{CouplerId, GeneratorId, PanelId, UtilityId};

/// Start-up and voltage/frequency stabilisation of a generator.
pub const GENERATOR_STABILISE_SECS: u32 = 10;
/// Pause between generator incomer and each coupler on a total failure.
pub const COUPLER_STAGGER_SECS: u32 = 9;
/// Pause before bridging a panel after a single utility failure.
pub const BRIDGE_DELAY_SECS: u32 = 10;
/// Pause between the two couplers after a single utility failure.
pub const SECOND_COUPLER_DELAY_SECS: u32 = 2;
pub const RESTORE_FIRST_COUPLER_SECS: u32 = 4;
pub const RESTORE_SECOND_COUPLER_SECS: u32 = 2;
pub const RESTORE_UTILITY_SECS: u32 = 5;
/// Off-load run of a generator before its incomer opens.
pub const GENERATOR_COOL_DOWN_SECS: u32 = 180;
pub const FINAL_UTILITY_SECS: u32 = 2;
pub const SIMPLE_RESTORE_SECS: u32 = 5;

/// Externally triggerable automatic sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    TotalEbFail,
    Eb1Fail,
    Eb2Fail,
    EbRestore,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::TotalEbFail,
        Scenario::Eb1Fail,
        Scenario::Eb2Fail,
        Scenario::EbRestore,
    ];

    /// Drill-file name, e.g. `"total_eb_fail"`.
    pub fn name(self) -> &'static str {
        match self {
            Self::TotalEbFail => "total_eb_fail",
            Self::Eb1Fail => "eb1_fail",
            Self::Eb2Fail => "eb2_fail",
            Self::EbRestore => "eb_restore",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TotalEbFail => f.write_str("Total EB failure"),
            Self::Eb1Fail => f.write_str("EB-1 failure"),
            Self::Eb2Fail => f.write_str("EB-2 failure"),
            Self::EbRestore => f.write_str("EB restoration"),
        }
    }
}

/// What a sequencer run is doing, for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum RunKind {
    Scenario(Scenario),
    GeneratorStart(GeneratorId),
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scenario(s) => s.fmt(f),
            Self::GeneratorStart(g) => write!(f, "{g} start"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub op: Op,
    /// Seconds to wait after this step before the next one.
    pub delay_after: u32,
}

const fn step(op: Op, delay_after: u32) -> Step {
    Step { op, delay_after }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choreography {
    pub kind: RunKind,
    pub origin: Origin,
    /// Logged when the run starts.
    pub opening: Option<(String, Severity)>,
    pub steps: Vec<Step>,
    /// Logged when the last step has been applied.
    pub closing: Option<String>,
}

impl Choreography {
    /// Sum of all step delays.
    pub fn duration_secs(&self) -> u32 {
        self.steps.iter().map(|s| s.delay_after).sum()
    }
}

/// Checks the scenario's entry condition and builds its step list.
pub fn for_scenario(
    scenario: Scenario,
    generator: GeneratorId,
    store: &StateStore,
) -> Result<Choreography, PreconditionNotMet> {
    match scenario {
        Scenario::TotalEbFail => {
            failure_precondition(store)?;
            Ok(total_utility_failure(generator))
        }
        Scenario::Eb1Fail => {
            failure_precondition(store)?;
            Ok(single_utility_failure(UtilityId::Eb1))
        }
        Scenario::Eb2Fail => {
            failure_precondition(store)?;
            Ok(single_utility_failure(UtilityId::Eb2))
        }
        Scenario::EbRestore => {
            require(
                UtilityId::ALL.iter().any(|&u| !store.is_closed(u)),
                "every utility incomer is already closed",
            )?;
            Ok(restoration(store))
        }
    }
}

fn failure_precondition(store: &StateStore) -> Result<(), PreconditionNotMet> {
    require(
        UtilityId::ALL.iter().all(|&u| store.is_closed(u)),
        "both utility incomers must be closed",
    )?;
    require(
        store.running_generator().is_none(),
        "a generator is already running",
    )
}

/// Grid lost, both utilities tripped, generator `g` picks up both panels.
pub fn total_utility_failure(g: GeneratorId) -> Choreography {
    let home = g.home_panel().coupler();
    Choreography {
        kind: RunKind::Scenario(Scenario::TotalEbFail),
        origin: Origin::Sequence,
        opening: Some((
            format!("Total EB failure simulation started. {g} selected."),
            Severity::Error,
        )),
        steps: vec![
            step(Op::LoseGrid, 0),
            step(Op::TripUtility(UtilityId::Eb1), 0),
            step(Op::TripUtility(UtilityId::Eb2), 0),
            step(Op::StartGenerator(g), GENERATOR_STABILISE_SECS),
            step(Op::GeneratorReady(g), 0),
            step(Op::CloseGeneratorIncomer(g), COUPLER_STAGGER_SECS),
            step(Op::CloseCoupler(home), COUPLER_STAGGER_SECS),
            step(Op::CloseCoupler(home.partner()), 0),
        ],
        closing: Some(format!(
            "Total EB failure sequence complete. LT-1 and LT-2 fed from {g}."
        )),
    }
}

/// One utility's feeder fails; the healthy utility picks up both panels.
pub fn single_utility_failure(u: UtilityId) -> Choreography {
    let failed = u.home_panel();
    let healthy = failed.other();
    let scenario = match u {
        UtilityId::Eb1 => Scenario::Eb1Fail,
        UtilityId::Eb2 => Scenario::Eb2Fail,
    };
    Choreography {
        kind: RunKind::Scenario(scenario),
        origin: Origin::Sequence,
        opening: Some((format!("{u} failure simulation started."), Severity::Error)),
        steps: vec![
            step(Op::FeederFailure(u), BRIDGE_DELAY_SECS),
            step(Op::CloseCoupler(healthy.coupler()), SECOND_COUPLER_DELAY_SECS),
            step(Op::CloseCoupler(failed.coupler()), 0),
        ],
        closing: Some(format!(
            "{u} failure sequence complete. {failed} fed from {} via Bus Coupler.",
            healthy.utility()
        )),
    }
}

/// Returns both panels to their own utilities.
///
/// With a generator carrying load the bus is split first, the generator is
/// cooled down on its home panel and handed back last. Otherwise the tie is
/// opened and the open utilities are re-closed.
pub fn restoration(store: &StateStore) -> Choreography {
    let steps = match store.carrying_generator() {
        Some(g) => generator_restoration_steps(g),
        None => simple_restoration_steps(store),
    };
    Choreography {
        kind: RunKind::Scenario(Scenario::EbRestore),
        origin: Origin::Sequence,
        opening: Some(("EB restoration sequence started.".to_string(), Severity::Info)),
        steps,
        closing: Some("EB restoration complete. System back to normal operation.".to_string()),
    }
}

fn generator_restoration_steps(g: GeneratorId) -> Vec<Step> {
    let home = g.home_panel();
    let other = home.other();
    vec![
        step(Op::RestoreSupply, RESTORE_FIRST_COUPLER_SECS),
        step(Op::OpenCoupler(other.coupler()), RESTORE_SECOND_COUPLER_SECS),
        step(Op::OpenCoupler(home.coupler()), RESTORE_UTILITY_SECS),
        step(Op::CloseUtility(other.utility()), 0),
        step(Op::CoolDownGenerator(g), GENERATOR_COOL_DOWN_SECS),
        step(Op::OpenGeneratorIncomer(g), FINAL_UTILITY_SECS),
        step(Op::CloseUtility(home.utility()), 0),
        step(Op::StopGenerator(g), 0),
        step(Op::ResetSession, 0),
    ]
}

fn simple_restoration_steps(store: &StateStore) -> Vec<Step> {
    let failed = UtilityId::ALL
        .into_iter()
        .find(|&u| !store.is_closed(u))
        .map_or(PanelId::Lt1, UtilityId::home_panel);
    let first: CouplerId = failed.coupler();

    let mut steps = vec![
        step(Op::RestoreSupply, 0),
        step(Op::OpenCoupler(first), 0),
        step(Op::OpenCoupler(first.partner()), SIMPLE_RESTORE_SECS),
    ];
    steps.extend(
        UtilityId::ALL
            .into_iter()
            .filter(|&u| !store.is_closed(u))
            .map(|u| step(Op::CloseUtility(u), 0)),
    );
    steps.push(step(Op::ResetSession, 0));
    steps
}

/// Operator-initiated generator start: crank, stabilise, then idle with the
/// incomer open.
pub fn generator_start(g: GeneratorId) -> Choreography {
    Choreography {
        kind: RunKind::GeneratorStart(g),
        origin: Origin::Manual,
        opening: None,
        steps: vec![
            step(Op::StartGenerator(g), GENERATOR_STABILISE_SECS),
            step(Op::GeneratorReady(g), 0),
        ],
        closing: None,
    }
}
