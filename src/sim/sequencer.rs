//! Choreography driver.
//!
//! One run at a time. The driver applies consecutive zero-delay steps
//! immediately and parks on a timer for a non-zero delay; the timer's
//! completion resumes it at the next step.

use tracing::{debug, info, warn};

use super::choreography::{Choreography, RunKind};
use super::event_log::{EventLog, Severity};
use super::ops::{Check, Op};
use super::state::StateStore;
use super::timer::{TimerHandle, TimerService};
use super::topology::ElementId;

/// Timer payload: the element the next step will act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingStep {
    pub target: Option<ElementId>,
}

/// Mutable session parts a step may touch.
pub struct Machinery<'a> {
    pub store: &'a mut StateStore,
    pub timers: &'a mut TimerService<PendingStep>,
    pub log: &'a mut EventLog,
    pub now: u64,
}

/// Where the driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveOutcome {
    /// Waiting for a timer.
    Parked,
    /// Last step applied; the sequencer is idle again.
    Finished,
    /// A step was blocked; the sequencer is idle, nothing rolled back.
    Aborted,
    /// The run ended on a reset step; the session must reset.
    ResetRequested,
}

/// Public view of the sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running { kind: RunKind, step: usize },
}

#[derive(Debug)]
struct ActiveRun {
    choreography: Choreography,
    next: usize,
    timer: Option<TimerHandle>,
}

#[derive(Debug, Default)]
pub struct Sequencer {
    run: Option<ActiveRun>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SequencerState {
        match &self.run {
            None => SequencerState::Idle,
            Some(run) => SequencerState::Running {
                kind: run.choreography.kind,
                step: run.next,
            },
        }
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Starts a run and drives it up to its first delay.
    ///
    /// The caller guarantees the sequencer is idle.
    pub fn start(&mut self, choreography: Choreography, m: &mut Machinery<'_>) -> DriveOutcome {
        debug_assert!(self.run.is_none(), "sequencer already running");
        info!(run = %choreography.kind, steps = choreography.steps.len(), "sequence started");
        if let Some((message, severity)) = &choreography.opening {
            m.log.record(m.now, message.clone(), *severity);
        }
        self.run = Some(ActiveRun {
            choreography,
            next: 0,
            timer: None,
        });
        self.drive(m)
    }

    /// Resumes the run when its timer completes. Foreign handles are ignored.
    pub fn on_timer_completed(
        &mut self,
        handle: TimerHandle,
        m: &mut Machinery<'_>,
    ) -> Option<DriveOutcome> {
        let run = self.run.as_mut()?;
        if run.timer != Some(handle) {
            return None;
        }
        run.timer = None;
        Some(self.drive(m))
    }

    /// Drops the current run without touching the store.
    pub fn abandon(&mut self) {
        if let Some(run) = self.run.take() {
            debug!(run = %run.choreography.kind, step = run.next, "sequence abandoned");
        }
    }

    fn drive(&mut self, m: &mut Machinery<'_>) -> DriveOutcome {
        loop {
            let Some(run) = self.run.as_mut() else {
                return DriveOutcome::Finished;
            };
            let Some(step) = run.choreography.steps.get(run.next).copied() else {
                return self.finish(m, DriveOutcome::Finished);
            };

            if step.op == Op::ResetSession {
                return self.finish(m, DriveOutcome::ResetRequested);
            }

            match step.op.check(m.store) {
                Ok(Check::Ready) => {
                    step.op.apply(m.store, m.log, m.now, run.choreography.origin);
                }
                Ok(Check::AlreadySatisfied) => {
                    debug!(op = %step.op, "step already satisfied, skipped");
                    if let Some(target) = step.op.target() {
                        m.store.refresh_display(target);
                    }
                }
                Err(err) => {
                    warn!(run = %run.choreography.kind, op = %step.op, %err, "sequence aborted");
                    m.log.record(
                        m.now,
                        format!("{} aborted at '{}': {err}.", run.choreography.kind, step.op),
                        Severity::Error,
                    );
                    if let Some(target) = step.op.target() {
                        m.store.refresh_display(target);
                    }
                    self.run = None;
                    return DriveOutcome::Aborted;
                }
            }

            run.next += 1;
            if step.delay_after > 0 {
                let next = run.choreography.steps.get(run.next).map(|s| s.op);
                let target = next.and_then(Op::target);
                if let (Some(id), Some(text)) = (target, next.and_then(Op::pending_text)) {
                    m.store.mark_pending(id, text);
                }
                let handle = m.timers.schedule(step.delay_after, PendingStep { target });
                debug!(op = %step.op, delay = step.delay_after, "sequence parked");
                run.timer = Some(handle);
                return DriveOutcome::Parked;
            }
        }
    }

    fn finish(&mut self, m: &mut Machinery<'_>, outcome: DriveOutcome) -> DriveOutcome {
        if let Some(run) = self.run.take() {
            if let Some(closing) = run.choreography.closing {
                m.log.record(m.now, closing, Severity::Success);
            }
            info!(run = %run.choreography.kind, "sequence finished");
        }
        outcome
    }
}
