//! Simulation session: the single entry point hosts talk to.

use tracing::{debug, info};

use super::choreography::{self, Choreography, Scenario};
use super::clock::Clock;
use super::event_log::{EventLog, LogEntry, Severity};
use super::manual::{ManualAction, ManualPlan};
use super::ops::{Check, Origin};
use super::sequencer::{DriveOutcome, Machinery, PendingStep, Sequencer, SequencerState};
use super::snapshot::{ElementView, GeneratorMeter, PanelView, Snapshot, TimerView};
use super::state::StateStore;
use super::timer::{TimerEvent, TimerHandle, TimerService};
use super::topology::GeneratorId;

const INITIALIZED_MESSAGE: &str =
    "System initialized in normal operation mode. All supplies are active.";

/// One operator's simulator: topology state, pending timers, the running
/// sequence and the event log.
///
/// Time only moves when the host calls [`tick`](Self::tick).
///
/// # Examples
///
/// ```
/// use lt_switchover_sim::sim::session::SimulationSession;
/// use lt_switchover_sim::sim::choreography::Scenario;
/// use lt_switchover_sim::sim::topology::PanelId;
///
/// let mut session = SimulationSession::new();
/// assert!(session.trigger_scenario(Scenario::Eb1Fail, None));
/// session.advance(12);
/// assert_eq!(
///     session.store().panel(PanelId::Lt1).source_label,
///     "EB-2 via Bus Coupler"
/// );
/// ```
#[derive(Debug)]
pub struct SimulationSession {
    clock: Clock,
    store: StateStore,
    timers: TimerService<PendingStep>,
    sequencer: Sequencer,
    log: EventLog,
    selected: GeneratorId,
}

impl Default for SimulationSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationSession {
    pub fn new() -> Self {
        let mut session = Self {
            clock: Clock::new(),
            store: StateStore::initial(),
            timers: TimerService::new(),
            sequencer: Sequencer::new(),
            log: EventLog::new(),
            selected: GeneratorId::Dg1,
        };
        session.log.record(0, INITIALIZED_MESSAGE, Severity::Info);
        session
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    pub fn event_log(&self) -> &EventLog {
        &self.log
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// `true` while a sequence holds the sequencer.
    pub fn is_simulating(&self) -> bool {
        self.sequencer.is_running()
    }

    pub fn sequencer_state(&self) -> SequencerState {
        self.sequencer.state()
    }

    pub fn selected_generator(&self) -> GeneratorId {
        self.selected
    }

    /// Changes the DG selector. Ignored while simulating.
    pub fn select_generator(&mut self, g: GeneratorId) -> bool {
        if self.is_simulating() {
            return false;
        }
        self.selected = g;
        true
    }

    /// `true` when [`trigger_scenario`](Self::trigger_scenario) would accept.
    pub fn can_trigger(&self, scenario: Scenario) -> bool {
        !self.is_simulating()
            && choreography::for_scenario(scenario, self.selected, &self.store).is_ok()
    }

    /// `true` when [`manual_action`](Self::manual_action) would accept.
    pub fn can_manual(&self, action: ManualAction, g: GeneratorId) -> bool {
        !self.is_simulating() && action.guard(&self.store, g).is_ok()
    }

    /// Starts an automatic sequence.
    ///
    /// `generator` overrides the selector for this run and becomes the new
    /// selection. Returns `false`, changing nothing, while simulating or when
    /// the scenario's entry condition does not hold.
    pub fn trigger_scenario(&mut self, scenario: Scenario, generator: Option<GeneratorId>) -> bool {
        if self.is_simulating() {
            debug!(%scenario, "trigger ignored, sequence in progress");
            return false;
        }
        let g = generator.unwrap_or(self.selected);
        let choreo = match choreography::for_scenario(scenario, g, &self.store) {
            Ok(choreo) => choreo,
            Err(err) => {
                debug!(%scenario, %err, "trigger rejected");
                return false;
            }
        };
        self.selected = g;
        let outcome = self.start_sequence(choreo);
        self.settle(outcome);
        true
    }

    /// Performs one manual-mode action on generator `g` (ignored by actions
    /// that do not involve a generator).
    ///
    /// Returns `false`, changing nothing, while simulating or when the
    /// action's guard does not hold.
    pub fn manual_action(&mut self, action: ManualAction, g: GeneratorId) -> bool {
        if self.is_simulating() {
            debug!(%action, "manual action ignored, sequence in progress");
            return false;
        }
        if let Err(err) = action.guard(&self.store, g) {
            debug!(%action, %g, %err, "manual action rejected");
            return false;
        }

        match action.plan(g) {
            ManualPlan::Immediate(ops) => {
                let now = self.clock.now();
                for op in ops {
                    match op.check(&self.store) {
                        Ok(Check::Ready) => {
                            op.apply(&mut self.store, &mut self.log, now, Origin::Manual);
                        }
                        Ok(Check::AlreadySatisfied) => {}
                        Err(err) => {
                            self.log.record(
                                now,
                                format!("Manual {action} stopped: {err}."),
                                Severity::Error,
                            );
                            break;
                        }
                    }
                }
            }
            ManualPlan::Sequence(choreo) => {
                let outcome = self.start_sequence(choreo);
                self.settle(outcome);
            }
        }
        true
    }

    /// Cancels every timer, drops any running sequence and returns to the
    /// initial configuration with a fresh event log.
    pub fn reset(&mut self) {
        let cancelled = self.timers.cancel_all();
        self.sequencer.abandon();
        self.store = StateStore::initial();
        self.log.clear();
        self.log.record(self.clock.now(), INITIALIZED_MESSAGE, Severity::Info);
        info!(cancelled_timers = cancelled, "session reset");
    }

    /// Advances simulated time by one second.
    ///
    /// # Returns
    ///
    /// The log entries recorded during this second, oldest first, including
    /// any that a sequence-ending reset cleared from the log.
    pub fn tick(&mut self) -> Vec<LogEntry> {
        let first_seq = self.log.next_seq();
        self.clock.tick();
        self.store.advance_gensets();

        let mut reset_requested = false;
        for event in self.timers.advance() {
            if let TimerEvent::Completed { handle, .. } = event {
                let outcome = self.resume_sequence(handle);
                reset_requested |= outcome == Some(DriveOutcome::ResetRequested);
            }
        }

        let mut recorded: Vec<LogEntry> = self.log.since(first_seq).cloned().collect();
        if reset_requested {
            let reset_seq = self.log.next_seq();
            self.reset();
            recorded.extend(self.log.since(reset_seq).cloned());
        }
        recorded
    }

    pub fn advance(&mut self, secs: u64) {
        for _ in 0..secs {
            self.tick();
        }
    }

    /// Ticks until no sequence is running, at most `limit` times.
    ///
    /// # Returns
    ///
    /// The number of ticks taken.
    pub fn run_until_idle(&mut self, limit: u64) -> u64 {
        let mut taken = 0;
        while self.is_simulating() && taken < limit {
            self.tick();
            taken += 1;
        }
        taken
    }

    pub fn snapshot(&self) -> Snapshot {
        let running = match self.sequencer.state() {
            SequencerState::Idle => None,
            SequencerState::Running { kind, .. } => Some(kind),
        };
        Snapshot {
            at_secs: self.clock.now(),
            simulating: self.is_simulating(),
            running,
            selected_generator: self.selected,
            elements: self
                .store
                .elements()
                .map(|(id, status)| ElementView {
                    id,
                    kind: id.kind(),
                    state: status.state,
                    light: status.light,
                    text: status.text.clone(),
                })
                .collect(),
            panels: self
                .store
                .panels()
                .map(|(id, panel)| PanelView {
                    id,
                    energized: panel.energized,
                    source: panel.source,
                    source_label: panel.source_label.clone(),
                })
                .collect(),
            timers: self
                .timers
                .pending()
                .map(|(_, remaining, pending)| TimerView {
                    element: pending.target,
                    remaining_secs: remaining,
                })
                .collect(),
            event_log: self.log.entries().cloned().collect(),
            generator_meter: self
                .store
                .starting_generator()
                .map(|(g, elapsed)| GeneratorMeter::ramp(g, elapsed)),
        }
    }

    fn start_sequence(&mut self, choreo: Choreography) -> DriveOutcome {
        let mut m = Machinery {
            store: &mut self.store,
            timers: &mut self.timers,
            log: &mut self.log,
            now: self.clock.now(),
        };
        self.sequencer.start(choreo, &mut m)
    }

    fn resume_sequence(&mut self, handle: TimerHandle) -> Option<DriveOutcome> {
        let mut m = Machinery {
            store: &mut self.store,
            timers: &mut self.timers,
            log: &mut self.log,
            now: self.clock.now(),
        };
        self.sequencer.on_timer_completed(handle, &mut m)
    }

    fn settle(&mut self, outcome: DriveOutcome) {
        if outcome == DriveOutcome::ResetRequested {
            self.reset();
        }
    }
}
