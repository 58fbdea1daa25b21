/// Simulated session clock with one-second resolution.
///
/// The `Clock` never reads wall time: hosts advance it explicitly, which keeps
/// every run deterministic. Event-log timestamps are taken from it.
///
/// # Examples
///
/// ```
/// use lt_switchover_sim::sim::clock::Clock;
///
/// let mut clock = Clock::new();
/// clock.tick();
/// clock.tick();
/// assert_eq!(clock.now(), 2);
/// assert_eq!(Clock::hms(3725), "01:02:05");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Clock {
    /// Seconds since the session was created.
    now: u64,
}

impl Clock {
    /// Creates a clock at second zero.
    pub fn new() -> Self {
        Self { now: 0 }
    }

    /// Advances the clock by one simulated second.
    ///
    /// # Returns
    ///
    /// The new current second.
    pub fn tick(&mut self) -> u64 {
        self.now += 1;
        self.now
    }

    /// Current simulated second.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Formats a second count as `HH:MM:SS`. Hours are not wrapped.
    pub fn hms(secs: u64) -> String {
        format!(
            "{:02}:{:02}:{:02}",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock() {
        let clock = Clock::new();
        assert_eq!(clock.now(), 0);
    }

    #[test]
    fn test_tick() {
        let mut clock = Clock::new();
        assert_eq!(clock.tick(), 1);
        assert_eq!(clock.tick(), 2);
        assert_eq!(clock.now(), 2);
    }

    #[test]
    fn test_hms() {
        assert_eq!(Clock::hms(0), "00:00:00");
        assert_eq!(Clock::hms(59), "00:00:59");
        assert_eq!(Clock::hms(180), "00:03:00");
        assert_eq!(Clock::hms(90_061), "25:01:01");
    }
}
