//! Randomised soak run.
//!
//! Drives one session with seeded random operator input, a scenario
//! trigger, manual action, selector change or reset on some ticks, and
//! checks the no-backfeed invariant after every mutation.

use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;
use tracing::{info, warn};

use crate::drill::BackfeedViolation;
use crate::sim::choreography::Scenario;
use crate::sim::manual::ManualAction;
use crate::sim::session::SimulationSession;
use crate::sim::topology::GeneratorId;

/// Percent chance per tick that the operator does anything at all.
const ACTION_PERCENT: u32 = 30;
/// Percent chance that an operator input is a full reset.
const RESET_PERCENT: u32 = 2;

/// Totals from a soak run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SoakReport {
    pub seed: u64,
    pub ticks: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub resets: u64,
    pub violations: Vec<BackfeedViolation>,
}

impl SoakReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for SoakReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Soak Report ---")?;
        writeln!(f, "Seed:                {}", self.seed)?;
        writeln!(f, "Ticks:               {}", self.ticks)?;
        writeln!(
            f,
            "Operator inputs:     {} accepted, {} rejected, {} resets",
            self.accepted, self.rejected, self.resets
        )?;
        writeln!(f, "Backfeed violations: {}", self.violations.len())?;
        write!(f, "Result:              {}", if self.passed() { "PASS" } else { "FAIL" })
    }
}

/// Runs `ticks` simulated seconds of random operation.
pub fn run(ticks: u64, seed: u64) -> SoakReport {
    info!(ticks, seed, "soak started");
    let mut rng = StdRng::seed_from_u64(seed);
    let mut session = SimulationSession::new();
    let mut report = SoakReport {
        seed,
        ticks,
        ..SoakReport::default()
    };

    for _ in 0..ticks {
        if rng.random_range(0..100) < ACTION_PERCENT {
            act(&mut session, &mut rng, &mut report);
            check(&session, &mut report);
        }
        session.tick();
        check(&session, &mut report);
    }

    info!(
        accepted = report.accepted,
        rejected = report.rejected,
        violations = report.violations.len(),
        "soak finished"
    );
    report
}

fn act(session: &mut SimulationSession, rng: &mut StdRng, report: &mut SoakReport) {
    if rng.random_range(0..100) < RESET_PERCENT {
        session.reset();
        report.resets += 1;
        return;
    }

    let g = random_generator(rng);
    let accepted = match rng.random_range(0..3) {
        0 => {
            let scenario = Scenario::ALL[rng.random_range(0..Scenario::ALL.len())];
            let explicit = rng.random_bool(0.5).then_some(g);
            session.trigger_scenario(scenario, explicit)
        }
        1 => session.select_generator(g),
        _ => {
            let action = ManualAction::ALL[rng.random_range(0..ManualAction::ALL.len())];
            session.manual_action(action, g)
        }
    };
    if accepted {
        report.accepted += 1;
    } else {
        report.rejected += 1;
    }
}

fn random_generator(rng: &mut StdRng) -> GeneratorId {
    GeneratorId::ALL[rng.random_range(0..GeneratorId::ALL.len())]
}

fn check(session: &SimulationSession, report: &mut SoakReport) {
    for &panel in session.store().backfeed_violations() {
        warn!(at_secs = session.now(), %panel, "backfeed during soak");
        report.violations.push(BackfeedViolation {
            at_secs: session.now(),
            panel,
        });
    }
}
