//! Live session wrapper and TUI application state.

use std::time::Instant;

use crate::sim::choreography::{self, Scenario};
use crate::sim::manual::ManualAction;
use crate::sim::session::SimulationSession;
use crate::sim::snapshot::Snapshot;

/// Real milliseconds per simulated second (slowest → fastest).
const SPEED_LEVELS_MS: [u64; 6] = [1000, 500, 250, 100, 20, 5];

/// Default speed index (real time).
const DEFAULT_SPEED_IDX: usize = 0;

/// Which key set the operator is using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMode {
    /// Scenario triggers.
    Auto,
    /// Individual breaker and genset actions.
    Manual,
}

impl ControlMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Auto => "AUTO",
            Self::Manual => "MANUAL",
        }
    }
}

/// TUI application state.
pub struct App {
    session: SimulationSession,
    /// Whether simulated time is frozen.
    pub paused: bool,
    /// Current index into `SPEED_LEVELS_MS`.
    pub speed_idx: usize,
    /// Whether the user has requested quit.
    pub quit: bool,
    /// When the last simulated second was executed.
    pub last_tick: Instant,
    pub mode: ControlMode,
    /// Outcome of the last operator input.
    pub status: String,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            session: SimulationSession::new(),
            paused: false,
            speed_idx: DEFAULT_SPEED_IDX,
            quit: false,
            last_tick: Instant::now(),
            mode: ControlMode::Auto,
            status: String::from("Ready."),
        }
    }

    pub fn session(&self) -> &SimulationSession {
        &self.session
    }

    pub fn snapshot(&self) -> Snapshot {
        self.session.snapshot()
    }

    /// Advances the session by one simulated second unless paused.
    pub fn tick(&mut self) {
        if self.paused {
            return;
        }
        self.session.tick();
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Increases simulation speed (shorter tick interval).
    pub fn speed_up(&mut self) {
        if self.speed_idx + 1 < SPEED_LEVELS_MS.len() {
            self.speed_idx += 1;
        }
    }

    /// Decreases simulation speed (longer tick interval).
    pub fn speed_down(&mut self) {
        if self.speed_idx > 0 {
            self.speed_idx -= 1;
        }
    }

    pub fn tick_interval_ms(&self) -> u64 {
        SPEED_LEVELS_MS[self.speed_idx]
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            ControlMode::Auto => ControlMode::Manual,
            ControlMode::Manual => ControlMode::Auto,
        };
        self.status = format!("{} mode.", self.mode.label());
    }

    /// Flips the DG selector between DG-1 and DG-2.
    pub fn toggle_generator(&mut self) {
        let next = self.session.selected_generator().other();
        self.status = if self.session.select_generator(next) {
            format!("{next} selected.")
        } else {
            String::from("Selector locked while a sequence runs.")
        };
    }

    pub fn trigger(&mut self, scenario: Scenario) {
        let selected = self.session.selected_generator();
        let reason = self.busy_reason().or_else(|| {
            choreography::for_scenario(scenario, selected, self.session.store())
                .err()
                .map(|e| e.to_string())
        });
        if self.session.trigger_scenario(scenario, None) {
            self.status = format!("{scenario} started.");
        } else {
            self.status = format!("{scenario} rejected: {}.", reason.unwrap_or_default());
        }
    }

    pub fn manual(&mut self, action: ManualAction) {
        let g = self.session.selected_generator();
        let reason = self.busy_reason().or_else(|| {
            action
                .guard(self.session.store(), g)
                .err()
                .map(|e| e.to_string())
        });
        if self.session.manual_action(action, g) {
            self.status = format!("{action} accepted.");
        } else {
            self.status = format!("{action} rejected: {}.", reason.unwrap_or_default());
        }
    }

    /// Returns every element to its initial state and clears the log.
    pub fn reset(&mut self) {
        self.session.reset();
        self.status = String::from("Session reset.");
    }

    fn busy_reason(&self) -> Option<String> {
        self.session
            .is_simulating()
            .then(|| String::from("sequence in progress"))
    }
}
