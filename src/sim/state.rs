//! Breaker and source state store.
//!
//! One indexed map of element records keyed by [`ElementId`], plus genset
//! phases and upstream supply availability. Panel energisation and source
//! attribution are never set directly: they are re-derived from the topology
//! and element states after every mutation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::topology::{
    CouplerId, ElementId, ElementKind, FIXED_NODES, GeneratorId, PanelId, SourceId, UtilityId,
};

/// Operational state of a switching element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwitchState {
    Open,
    Closed,
    TrippedOpen,
    Starting,
    NoSupply,
}

impl SwitchState {
    /// Upper-case name as shown on the switchboard, e.g. `"TRIPPED_OPEN"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
            Self::TrippedOpen => "TRIPPED_OPEN",
            Self::Starting => "STARTING",
            Self::NoSupply => "NO_SUPPLY",
        }
    }
}

/// Status-light colour shown next to an element's label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Light {
    On,
    Standby,
    Off,
}

/// Current record of one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ElementStatus {
    pub state: SwitchState,
    pub light: Light,
    pub text: String,
}

/// Engine phase of a diesel generator, independent of its incomer breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum GensetPhase {
    Stopped,
    /// Cranking and ramping up; `elapsed` counts seconds since start.
    Starting { elapsed: u32 },
    Running,
    /// Running down before stop; still able to carry its panel.
    CoolingDown,
}

impl GensetPhase {
    /// `true` for any phase other than `Stopped`.
    pub fn is_running(self) -> bool {
        !matches!(self, Self::Stopped)
    }

    /// `true` when the engine can deliver stable power to its incomer.
    pub fn can_carry_load(self) -> bool {
        matches!(self, Self::Running | Self::CoolingDown)
    }
}

/// Derived status of one LT panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PanelStatus {
    pub energized: bool,
    /// Ultimate source feeding the panel.
    pub source: Option<SourceId>,
    /// `true` when the source reaches the panel through the closed tie.
    pub via_coupler: bool,
    /// `"EB-1"`, `"DG-2"`, `"EB-1 via Bus Coupler"` or `"NO SUPPLY"`.
    pub source_label: String,
}

impl PanelStatus {
    fn dead() -> Self {
        Self::fed(None, false)
    }

    fn fed(source: Option<SourceId>, via_coupler: bool) -> Self {
        let source_label = match (source, via_coupler) {
            (None, _) => "NO SUPPLY".to_string(),
            (Some(s), false) => s.to_string(),
            (Some(s), true) => format!("{s} via Bus Coupler"),
        };
        Self {
            energized: source.is_some(),
            source,
            via_coupler,
            source_label,
        }
    }
}

/// Complete operational state of the switchboard.
///
/// Two stores compare equal when every element record, genset phase, supply
/// flag and derived panel is equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateStore {
    elements: BTreeMap<ElementId, ElementStatus>,
    gensets: BTreeMap<GeneratorId, GensetPhase>,
    grid_available: bool,
    feeders_healthy: BTreeMap<UtilityId, bool>,
    panels: BTreeMap<PanelId, PanelStatus>,
    backfeed: Vec<PanelId>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::initial()
    }
}

impl StateStore {
    /// Normal operation: both utilities closed onto their own panels, both
    /// generators stopped with incomers open, both couplers open.
    pub fn initial() -> Self {
        let mut store = Self {
            elements: BTreeMap::new(),
            gensets: GeneratorId::ALL
                .iter()
                .map(|&g| (g, GensetPhase::Stopped))
                .collect(),
            grid_available: true,
            feeders_healthy: UtilityId::ALL.iter().map(|&u| (u, true)).collect(),
            panels: BTreeMap::new(),
            backfeed: Vec::new(),
        };

        for u in UtilityId::ALL {
            store.put_state(u.element(), SwitchState::Closed);
        }
        for g in GeneratorId::ALL {
            store.put_state(g.element(), SwitchState::Open);
        }
        for c in CouplerId::ALL {
            store.put_state(c.element(), SwitchState::Open);
        }
        store.derive();
        store
    }

    /// Record of one element.
    pub fn element(&self, id: ElementId) -> &ElementStatus {
        // Every id is inserted by `initial()` and never removed.
        &self.elements[&id]
    }

    pub fn state(&self, id: ElementId) -> SwitchState {
        self.element(id).state
    }

    pub fn is_closed(&self, id: impl Into<ElementId>) -> bool {
        self.state(id.into()) == SwitchState::Closed
    }

    /// All element records in id order.
    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &ElementStatus)> {
        self.elements.iter().map(|(id, status)| (*id, status))
    }

    /// Sets an element's state with its standard label, then re-derives panels.
    pub fn set_state(&mut self, id: ElementId, state: SwitchState) {
        self.put_state(id, state);
        self.derive();
    }

    /// Sets an element's state, light and label in one step, then re-derives
    /// panels.
    pub fn set_state_labelled(
        &mut self,
        id: ElementId,
        state: SwitchState,
        light: Light,
        text: &str,
    ) {
        self.elements.insert(
            id,
            ElementStatus {
                state,
                light,
                text: text.to_string(),
            },
        );
        self.derive();
    }

    /// Shows a transitional label (`CLOSING...`) without changing state.
    pub fn mark_pending(&mut self, id: ElementId, text: &str) {
        let state = self.state(id);
        self.set_state_labelled(id, state, Light::Standby, text);
    }

    /// Restores the standard label for an element's current state.
    ///
    /// Fixed nodes take their display from supply availability.
    pub fn refresh_display(&mut self, id: ElementId) {
        if id.kind() == ElementKind::FixedNode {
            self.derive_fixed_nodes();
            return;
        }
        let state = self.state(id);
        self.put_state(id, state);
    }

    pub fn genset(&self, g: GeneratorId) -> GensetPhase {
        self.gensets
            .get(&g)
            .copied()
            .unwrap_or(GensetPhase::Stopped)
    }

    /// Changes a genset's phase, refreshing its incomer label.
    pub fn set_genset(&mut self, g: GeneratorId, phase: GensetPhase) {
        self.gensets.insert(g, phase);
        self.refresh_display(g.element());
        self.derive();
    }

    /// First generator whose engine is not stopped.
    pub fn running_generator(&self) -> Option<GeneratorId> {
        GeneratorId::ALL
            .into_iter()
            .find(|&g| self.genset(g).is_running())
    }

    /// First generator whose incomer is closed onto its panel.
    pub fn carrying_generator(&self) -> Option<GeneratorId> {
        GeneratorId::ALL.into_iter().find(|&g| self.is_closed(g))
    }

    /// Generator currently in its start-up ramp, with elapsed seconds.
    pub fn starting_generator(&self) -> Option<(GeneratorId, u32)> {
        self.gensets.iter().find_map(|(&g, phase)| match phase {
            GensetPhase::Starting { elapsed } => Some((g, *elapsed)),
            _ => None,
        })
    }

    /// Advances start-up ramps by one second.
    pub(crate) fn advance_gensets(&mut self) {
        for phase in self.gensets.values_mut() {
            if let GensetPhase::Starting { elapsed } = phase {
                *elapsed = elapsed.saturating_add(1);
            }
        }
    }

    pub fn grid_available(&self) -> bool {
        self.grid_available
    }

    pub fn feeder_healthy(&self, u: UtilityId) -> bool {
        self.feeders_healthy.get(&u).copied().unwrap_or(false)
    }

    /// `true` when utility power is present up to the incomer `u`.
    pub fn utility_available(&self, u: UtilityId) -> bool {
        self.grid_available && self.feeder_healthy(u)
    }

    /// `true` when grid and every feeder are available.
    pub fn all_supply_available(&self) -> bool {
        UtilityId::ALL.iter().all(|&u| self.utility_available(u))
    }

    pub fn set_grid_available(&mut self, available: bool) {
        self.grid_available = available;
        self.derive();
    }

    pub fn set_feeder_healthy(&mut self, u: UtilityId, healthy: bool) {
        self.feeders_healthy.insert(u, healthy);
        self.derive();
    }

    pub fn panel(&self, p: PanelId) -> &PanelStatus {
        &self.panels[&p]
    }

    pub fn panels(&self) -> impl Iterator<Item = (PanelId, &PanelStatus)> {
        self.panels.iter().map(|(id, status)| (*id, status))
    }

    pub fn panel_live(&self, p: PanelId) -> bool {
        self.panel(p).energized
    }

    /// `true` when the panels are bridged through both couplers.
    pub fn tie_closed(&self) -> bool {
        CouplerId::ALL.iter().all(|&c| self.is_closed(c))
    }

    /// `true` when the tie section between the couplers carries voltage.
    pub fn tie_live(&self) -> bool {
        CouplerId::ALL
            .iter()
            .any(|&c| self.is_closed(c) && self.panel_live(c.home_panel()))
    }

    /// `true` when `source` is closed and actually delivering power.
    pub fn delivering(&self, source: SourceId) -> bool {
        match source {
            SourceId::Utility(u) => self.is_closed(u) && self.utility_available(u),
            SourceId::Generator(g) => self.is_closed(g) && self.genset(g).can_carry_load(),
        }
    }

    /// Sources feeding `p` through its own incomers.
    pub fn direct_sources(&self, p: PanelId) -> Vec<SourceId> {
        [SourceId::from(p.utility()), SourceId::from(p.generator())]
            .into_iter()
            .filter(|&s| self.delivering(s))
            .collect()
    }

    /// Panels currently attributed to more than one ultimate source.
    ///
    /// Empty whenever the no-backfeed invariant holds.
    pub fn backfeed_violations(&self) -> &[PanelId] {
        &self.backfeed
    }

    fn put_state(&mut self, id: ElementId, state: SwitchState) {
        let text = self.standard_text(id, state);
        self.elements.insert(
            id,
            ElementStatus {
                state,
                light: default_light(state),
                text,
            },
        );
    }

    fn standard_text(&self, id: ElementId, state: SwitchState) -> String {
        let generator = match id {
            ElementId::Dg1 => Some(GeneratorId::Dg1),
            ElementId::Dg2 => Some(GeneratorId::Dg2),
            _ => None,
        };
        if let Some(g) = generator {
            return match (state, self.genset(g)) {
                (SwitchState::Starting, _) => "STARTING...".to_string(),
                (SwitchState::Closed, GensetPhase::CoolingDown) => "CLOSED (COOL-DOWN)".to_string(),
                (SwitchState::Closed, _) => "CLOSED".to_string(),
                (_, GensetPhase::Stopped) => format!("OPEN ({g} STOP)"),
                (_, GensetPhase::CoolingDown) => format!("OPEN ({g} IDLE COOL-DOWN)"),
                (_, _) => format!("OPEN ({g} RUNNING)"),
            };
        }
        match state {
            SwitchState::Open => "OPEN",
            SwitchState::Closed => "CLOSED",
            SwitchState::TrippedOpen => "TRIPPED OPEN",
            SwitchState::Starting => "STARTING...",
            SwitchState::NoSupply => "NO SUPPLY",
        }
        .to_string()
    }

    fn derive(&mut self) {
        self.derive_fixed_nodes();
        self.backfeed.clear();

        let direct: BTreeMap<PanelId, Vec<SourceId>> = PanelId::ALL
            .iter()
            .map(|&p| (p, self.direct_sources(p)))
            .collect();

        if self.tie_closed() {
            let all: Vec<SourceId> = direct.values().flatten().copied().collect();
            if all.len() > 1 {
                self.backfeed.extend(PanelId::ALL);
            }
            for p in PanelId::ALL {
                let status = match direct[&p].first() {
                    Some(&own) => PanelStatus::fed(Some(own), false),
                    None => match all.first() {
                        Some(&bridged) => PanelStatus::fed(Some(bridged), true),
                        None => PanelStatus::dead(),
                    },
                };
                self.panels.insert(p, status);
            }
        } else {
            for p in PanelId::ALL {
                let own = &direct[&p];
                if own.len() > 1 {
                    self.backfeed.push(p);
                }
                let status = match own.first() {
                    Some(&s) => PanelStatus::fed(Some(s), false),
                    None => PanelStatus::dead(),
                };
                self.panels.insert(p, status);
            }
        }
    }

    fn derive_fixed_nodes(&mut self) {
        for id in FIXED_NODES {
            debug_assert_eq!(id.kind(), ElementKind::FixedNode);
            let status = if self.grid_available {
                let text = match id {
                    ElementId::HtVcb => "VCB CLOSED",
                    ElementId::Transformer => "POWER ON",
                    _ => "ACB CLOSED",
                };
                ElementStatus {
                    state: SwitchState::Closed,
                    light: Light::On,
                    text: text.to_string(),
                }
            } else {
                match id {
                    ElementId::HtVcb => ElementStatus {
                        state: SwitchState::Closed,
                        light: Light::Standby,
                        text: "VCB CLOSED (NO SUPPLY)".to_string(),
                    },
                    ElementId::Transformer => ElementStatus {
                        state: SwitchState::NoSupply,
                        light: Light::Off,
                        text: "POWER OFF".to_string(),
                    },
                    _ => ElementStatus {
                        state: SwitchState::NoSupply,
                        light: Light::Standby,
                        text: "ACB CLOSED (NO SUPPLY)".to_string(),
                    },
                }
            };
            self.elements.insert(id, status);
        }
    }
}

fn default_light(state: SwitchState) -> Light {
    match state {
        SwitchState::Closed => Light::On,
        SwitchState::Starting => Light::Standby,
        SwitchState::Open | SwitchState::TrippedOpen | SwitchState::NoSupply => Light::Off,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_configuration_has_both_panels_on_their_utilities() {
        let store = StateStore::initial();
        assert_eq!(store.panel(PanelId::Lt1).source_label, "EB-1");
        assert_eq!(store.panel(PanelId::Lt2).source_label, "EB-2");
        assert!(store.is_closed(UtilityId::Eb1));
        assert!(store.is_closed(UtilityId::Eb2));
        assert_eq!(store.state(ElementId::Dg1), SwitchState::Open);
        assert_eq!(store.element(ElementId::Dg1).text, "OPEN (DG-1 STOP)");
        assert_eq!(store.state(ElementId::Bc1), SwitchState::Open);
        assert_eq!(store.element(ElementId::Transformer).text, "POWER ON");
        assert!(store.backfeed_violations().is_empty());
        assert_eq!(store.elements().count(), ElementId::ALL.len());
    }

    #[test]
    fn tripping_a_utility_kills_its_panel_only() {
        let mut store = StateStore::initial();
        store.set_state(ElementId::Eb1, SwitchState::TrippedOpen);
        assert!(!store.panel_live(PanelId::Lt1));
        assert_eq!(store.panel(PanelId::Lt1).source_label, "NO SUPPLY");
        assert_eq!(store.panel(PanelId::Lt2).source_label, "EB-2");
        assert_eq!(store.element(ElementId::Eb1).text, "TRIPPED OPEN");
        assert_eq!(store.element(ElementId::Eb1).light, Light::Off);
    }

    #[test]
    fn closed_tie_bridges_dead_panel_from_live_one() {
        let mut store = StateStore::initial();
        store.set_state(ElementId::Eb1, SwitchState::TrippedOpen);
        store.set_state(ElementId::Bc2, SwitchState::Closed);
        assert!(!store.panel_live(PanelId::Lt1));
        assert!(store.tie_live());

        store.set_state(ElementId::Bc1, SwitchState::Closed);
        let lt1 = store.panel(PanelId::Lt1);
        assert!(lt1.energized);
        assert!(lt1.via_coupler);
        assert_eq!(lt1.source_label, "EB-2 via Bus Coupler");
        assert!(store.backfeed_violations().is_empty());
    }

    #[test]
    fn bridging_two_live_utilities_is_reported_as_backfeed() {
        let mut store = StateStore::initial();
        store.set_state(ElementId::Bc1, SwitchState::Closed);
        store.set_state(ElementId::Bc2, SwitchState::Closed);
        assert_eq!(store.backfeed_violations(), &[PanelId::Lt1, PanelId::Lt2]);
    }

    #[test]
    fn generator_incomer_needs_a_running_genset_to_deliver() {
        let mut store = StateStore::initial();
        store.set_state(ElementId::Eb1, SwitchState::TrippedOpen);
        store.set_state(ElementId::Dg1, SwitchState::Closed);
        assert!(!store.panel_live(PanelId::Lt1));

        store.set_genset(GeneratorId::Dg1, GensetPhase::Running);
        assert_eq!(store.panel(PanelId::Lt1).source_label, "DG-1");
        assert_eq!(store.carrying_generator(), Some(GeneratorId::Dg1));
    }

    #[test]
    fn grid_loss_blacks_out_fixed_nodes_and_utilities() {
        let mut store = StateStore::initial();
        store.set_grid_available(false);
        assert_eq!(store.element(ElementId::Transformer).text, "POWER OFF");
        assert_eq!(store.element(ElementId::MainIncomer).light, Light::Standby);
        assert!(!store.panel_live(PanelId::Lt1));
        assert!(!store.utility_available(UtilityId::Eb2));

        store.set_grid_available(true);
        assert_eq!(store, StateStore::initial());
    }

    #[test]
    fn pending_label_does_not_change_state() {
        let mut store = StateStore::initial();
        store.mark_pending(ElementId::Bc1, "CLOSING...");
        assert_eq!(store.state(ElementId::Bc1), SwitchState::Open);
        assert_eq!(store.element(ElementId::Bc1).light, Light::Standby);

        store.refresh_display(ElementId::Bc1);
        assert_eq!(store, StateStore::initial());
    }

    #[test]
    fn refreshing_a_fixed_node_keeps_supply_label() {
        let mut store = StateStore::initial();
        store.refresh_display(ElementId::Transformer);
        assert_eq!(store.element(ElementId::Transformer).text, "POWER ON");
        assert_eq!(store, StateStore::initial());

        store.set_grid_available(false);
        store.refresh_display(ElementId::Transformer);
        assert_eq!(store.element(ElementId::Transformer).text, "POWER OFF");
        assert_eq!(store.state(ElementId::Transformer), SwitchState::NoSupply);
    }

    #[test]
    fn labelled_state_rederives_panels() {
        let mut store = StateStore::initial();
        store.set_state_labelled(ElementId::Eb1, SwitchState::TrippedOpen, Light::Off, "TRIPPED");
        let eb1 = store.element(ElementId::Eb1);
        assert_eq!((eb1.light, eb1.text.as_str()), (Light::Off, "TRIPPED"));
        assert!(!store.panel_live(PanelId::Lt1));
    }

    #[test]
    fn genset_labels_follow_phase() {
        let mut store = StateStore::initial();
        store.set_genset(GeneratorId::Dg2, GensetPhase::Running);
        assert_eq!(store.element(ElementId::Dg2).text, "OPEN (DG-2 RUNNING)");
        store.set_genset(GeneratorId::Dg2, GensetPhase::Starting { elapsed: 0 });
        store.advance_gensets();
        assert_eq!(store.starting_generator(), Some((GeneratorId::Dg2, 1)));
    }
}
