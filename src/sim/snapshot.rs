//! Read-only view of a session for hosts.

use serde::Serialize;

use super::choreography::RunKind;
use super::event_log::LogEntry;
use super::state::{Light, SwitchState};
use super::topology::{ElementId, ElementKind, GeneratorId, PanelId, SourceId};

/// Voltage ramp of a starting generator, volts per second.
pub const METER_VOLTS_PER_SEC: f64 = 41.5;
pub const METER_RATED_VOLTS: f64 = 415.0;
/// Frequency ramp of a starting generator, hertz per second.
pub const METER_HZ_PER_SEC: f64 = 5.0;
pub const METER_RATED_HZ: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementView {
    pub id: ElementId,
    pub kind: ElementKind,
    pub state: SwitchState,
    pub light: Light,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelView {
    pub id: PanelId,
    pub energized: bool,
    pub source: Option<SourceId>,
    pub source_label: String,
}

/// Countdown of a pending timer, keyed by the element it will act on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimerView {
    pub element: Option<ElementId>,
    pub remaining_secs: u32,
}

/// Synthetic voltage/frequency readout while a generator runs up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorMeter {
    pub generator: GeneratorId,
    pub voltage_v: f64,
    pub frequency_hz: f64,
}

impl GeneratorMeter {
    pub fn ramp(generator: GeneratorId, elapsed_secs: u32) -> Self {
        let t = f64::from(elapsed_secs);
        Self {
            generator,
            voltage_v: (METER_VOLTS_PER_SEC * t).min(METER_RATED_VOLTS),
            frequency_hz: (METER_HZ_PER_SEC * t).min(METER_RATED_HZ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub at_secs: u64,
    pub simulating: bool,
    pub running: Option<RunKind>,
    pub selected_generator: GeneratorId,
    pub elements: Vec<ElementView>,
    pub panels: Vec<PanelView>,
    pub timers: Vec<TimerView>,
    /// Newest first.
    pub event_log: Vec<LogEntry>,
    pub generator_meter: Option<GeneratorMeter>,
}

impl Snapshot {
    pub fn element(&self, id: ElementId) -> Option<&ElementView> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn panel(&self, id: PanelId) -> Option<&PanelView> {
        self.panels.iter().find(|p| p.id == id)
    }

    /// Remaining seconds of the timer acting on `id`, if any.
    pub fn countdown(&self, id: ElementId) -> Option<u32> {
        self.timers
            .iter()
            .find(|t| t.element == Some(id))
            .map(|t| t.remaining_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_ramps_then_saturates() {
        let m = GeneratorMeter::ramp(GeneratorId::Dg1, 4);
        assert!((m.voltage_v - 166.0).abs() < 1e-9);
        assert!((m.frequency_hz - 20.0).abs() < 1e-9);

        let m = GeneratorMeter::ramp(GeneratorId::Dg1, 12);
        assert_eq!(m.voltage_v, 415.0);
        assert_eq!(m.frequency_hz, 50.0);
    }
}
