//! Count-down timer service with one-second granularity.
//!
//! Timers carry an arbitrary payload that is handed back on completion, so
//! the caller decides what a firing means instead of registering closures.
//! This is the only suspension point of a sequencer run.

use serde::Serialize;

/// Opaque handle identifying one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimerHandle(u64);

/// Something that happened to a timer during [`TimerService::advance`].
#[derive(Debug, Clone, PartialEq)]
pub enum TimerEvent<T> {
    /// The timer counted down and still has `remaining` seconds to go.
    Tick { handle: TimerHandle, remaining: u32 },
    /// The count reached zero; emitted exactly once per timer.
    Completed { handle: TimerHandle, payload: T },
}

#[derive(Debug, Clone)]
struct Timer<T> {
    handle: TimerHandle,
    remaining: u32,
    payload: T,
}

/// Pending count-down timers in scheduling order.
#[derive(Debug, Clone)]
pub struct TimerService<T> {
    next_id: u64,
    timers: Vec<Timer<T>>,
}

impl<T> Default for TimerService<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerService<T> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            timers: Vec::new(),
        }
    }

    /// Schedules a timer that completes after `duration` calls to
    /// [`advance`](Self::advance).
    ///
    /// A zero duration completes on the next advance.
    pub fn schedule(&mut self, duration: u32, payload: T) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            handle,
            remaining: duration.max(1),
            payload,
        });
        handle
    }

    /// Stops a timer before it completes.
    ///
    /// # Returns
    ///
    /// `false` when the handle is unknown or already completed (a no-op).
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    /// Drops every pending timer without completing any of them.
    ///
    /// # Returns
    ///
    /// The number of timers cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.timers.len();
        self.timers.clear();
        n
    }

    /// Advances every pending timer by one second.
    ///
    /// Emits a `Tick` for each timer still counting and a `Completed` for each
    /// timer whose count reached zero, in scheduling order.
    pub fn advance(&mut self) -> Vec<TimerEvent<T>> {
        let mut events = Vec::with_capacity(self.timers.len());
        let mut still_pending = Vec::with_capacity(self.timers.len());

        for mut timer in self.timers.drain(..) {
            timer.remaining -= 1;
            if timer.remaining == 0 {
                events.push(TimerEvent::Completed {
                    handle: timer.handle,
                    payload: timer.payload,
                });
            } else {
                events.push(TimerEvent::Tick {
                    handle: timer.handle,
                    remaining: timer.remaining,
                });
                still_pending.push(timer);
            }
        }

        self.timers = still_pending;
        events
    }

    /// Remaining seconds of a pending timer.
    pub fn remaining(&self, handle: TimerHandle) -> Option<u32> {
        self.timers
            .iter()
            .find(|t| t.handle == handle)
            .map(|t| t.remaining)
    }

    /// Pending timers as `(handle, remaining, payload)`.
    pub fn pending(&self) -> impl Iterator<Item = (TimerHandle, u32, &T)> {
        self.timers.iter().map(|t| (t.handle, t.remaining, &t.payload))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
