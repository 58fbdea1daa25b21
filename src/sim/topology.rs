//! Static description of the LT power-room switching topology.
//!
//! Two LT panels, each fed by one utility (EB) incomer and one generator (DG)
//! incomer, joined by a tie of two bus couplers in series: BC-1 sits in LT
//! Panel-1, BC-2 in LT Panel-2, and the panels are bridged only while both
//! are closed. The upstream HT/transformer/splitter chain is display-only.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every switching element or fixed node with a status light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ElementId {
    #[serde(rename = "HT-VCB")]
    HtVcb,
    #[serde(rename = "TRANSFORMER")]
    Transformer,
    #[serde(rename = "MAIN-IC")]
    MainIncomer,
    #[serde(rename = "SPLITTER-1")]
    Splitter1,
    #[serde(rename = "SPLITTER-2")]
    Splitter2,
    #[serde(rename = "EB-1")]
    Eb1,
    #[serde(rename = "EB-2")]
    Eb2,
    #[serde(rename = "DG-1")]
    Dg1,
    #[serde(rename = "DG-2")]
    Dg2,
    #[serde(rename = "BC-1")]
    Bc1,
    #[serde(rename = "BC-2")]
    Bc2,
}

/// Broad class of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Utility or generator incomer breaker.
    Incomer,
    /// Bus coupler breaker.
    Coupler,
    /// Upstream node modelled for display only.
    FixedNode,
}

/// Utility (EB) incomers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum UtilityId {
    #[serde(rename = "EB-1")]
    Eb1,
    #[serde(rename = "EB-2")]
    Eb2,
}

/// Diesel generators, each with its own incomer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GeneratorId {
    #[serde(rename = "DG-1")]
    Dg1,
    #[serde(rename = "DG-2")]
    Dg2,
}

/// Bus couplers forming the tie between the panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CouplerId {
    #[serde(rename = "BC-1")]
    Bc1,
    #[serde(rename = "BC-2")]
    Bc2,
}

/// LT load panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PanelId {
    #[serde(rename = "LT-1")]
    Lt1,
    #[serde(rename = "LT-2")]
    Lt2,
}

/// An incomer that can be the ultimate source of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceId {
    Utility(UtilityId),
    Generator(GeneratorId),
}

/// Feeds of one LT panel.
#[derive(Debug, Clone, Copy)]
pub struct PanelFeeds {
    pub panel: PanelId,
    pub utility: UtilityId,
    pub generator: GeneratorId,
    pub coupler: CouplerId,
}

/// Panel feed table; index 0 is LT-1.
pub static PANEL_FEEDS: [PanelFeeds; 2] = [
    PanelFeeds {
        panel: PanelId::Lt1,
        utility: UtilityId::Eb1,
        generator: GeneratorId::Dg1,
        coupler: CouplerId::Bc1,
    },
    PanelFeeds {
        panel: PanelId::Lt2,
        utility: UtilityId::Eb2,
        generator: GeneratorId::Dg2,
        coupler: CouplerId::Bc2,
    },
];

/// Upstream chain from the HT breaker down to the splitters.
pub const FIXED_NODES: [ElementId; 5] = [
    ElementId::HtVcb,
    ElementId::Transformer,
    ElementId::MainIncomer,
    ElementId::Splitter1,
    ElementId::Splitter2,
];

impl ElementId {
    /// All elements in display order.
    pub const ALL: [ElementId; 11] = [
        ElementId::HtVcb,
        ElementId::Transformer,
        ElementId::MainIncomer,
        ElementId::Splitter1,
        ElementId::Splitter2,
        ElementId::Eb1,
        ElementId::Dg1,
        ElementId::Bc1,
        ElementId::Eb2,
        ElementId::Dg2,
        ElementId::Bc2,
    ];

    pub fn kind(self) -> ElementKind {
        match self {
            Self::Eb1 | Self::Eb2 | Self::Dg1 | Self::Dg2 => ElementKind::Incomer,
            Self::Bc1 | Self::Bc2 => ElementKind::Coupler,
            Self::HtVcb
            | Self::Transformer
            | Self::MainIncomer
            | Self::Splitter1
            | Self::Splitter2 => ElementKind::FixedNode,
        }
    }

    /// Short tag, e.g. `"EB-1"`.
    pub fn tag(self) -> &'static str {
        match self {
            Self::HtVcb => "HT-VCB",
            Self::Transformer => "TRANSFORMER",
            Self::MainIncomer => "MAIN-IC",
            Self::Splitter1 => "SPLITTER-1",
            Self::Splitter2 => "SPLITTER-2",
            Self::Eb1 => "EB-1",
            Self::Eb2 => "EB-2",
            Self::Dg1 => "DG-1",
            Self::Dg2 => "DG-2",
            Self::Bc1 => "BC-1",
            Self::Bc2 => "BC-2",
        }
    }

    /// Nameplate shown by hosts.
    pub fn nameplate(self) -> &'static str {
        match self {
            Self::HtVcb => "11kV HT Panel (VCB 400A)",
            Self::Transformer => "Transformer (11/0.433kV 1000kVA)",
            Self::MainIncomer => "Main LT 0.433kV I/C (ACB 1600A)",
            Self::Splitter1 => "Splitter Panel-I (ACB 1600A)",
            Self::Splitter2 => "Splitter Panel-II (ACB 1600A)",
            Self::Eb1 => "EB-1 Incomer (ACB 1600A)",
            Self::Eb2 => "EB-2 Incomer (ACB 1600A)",
            Self::Dg1 => "DG-1 Incomer (ACB 1600A)",
            Self::Dg2 => "DG-2 Incomer (ACB 1600A)",
            Self::Bc1 => "Bus Coupler-1 (ACB 1600A)",
            Self::Bc2 => "Bus Coupler-2 (ACB 1600A)",
        }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl UtilityId {
    pub const ALL: [UtilityId; 2] = [UtilityId::Eb1, UtilityId::Eb2];

    pub fn home_panel(self) -> PanelId {
        feeds_where(|f| f.utility == self).panel
    }

    pub fn element(self) -> ElementId {
        ElementId::from(self)
    }
}

impl GeneratorId {
    pub const ALL: [GeneratorId; 2] = [GeneratorId::Dg1, GeneratorId::Dg2];

    pub fn home_panel(self) -> PanelId {
        feeds_where(|f| f.generator == self).panel
    }

    pub fn element(self) -> ElementId {
        ElementId::from(self)
    }

    /// The other generator, used by hosts to toggle the DG selector.
    pub fn other(self) -> GeneratorId {
        match self {
            Self::Dg1 => Self::Dg2,
            Self::Dg2 => Self::Dg1,
        }
    }
}

impl CouplerId {
    pub const ALL: [CouplerId; 2] = [CouplerId::Bc1, CouplerId::Bc2];

    pub fn home_panel(self) -> PanelId {
        feeds_where(|f| f.coupler == self).panel
    }

    /// The coupler on the other side of the tie section.
    pub fn partner(self) -> CouplerId {
        self.home_panel().other().coupler()
    }

    pub fn element(self) -> ElementId {
        ElementId::from(self)
    }
}

impl PanelId {
    pub const ALL: [PanelId; 2] = [PanelId::Lt1, PanelId::Lt2];

    pub fn feeds(self) -> &'static PanelFeeds {
        feeds_where(|f| f.panel == self)
    }

    pub fn utility(self) -> UtilityId {
        self.feeds().utility
    }

    pub fn generator(self) -> GeneratorId {
        self.feeds().generator
    }

    pub fn coupler(self) -> CouplerId {
        self.feeds().coupler
    }

    pub fn other(self) -> PanelId {
        match self {
            Self::Lt1 => Self::Lt2,
            Self::Lt2 => Self::Lt1,
        }
    }

    /// Panel number as printed on the switchboard ("1" or "2").
    pub fn number(self) -> u8 {
        match self {
            Self::Lt1 => 1,
            Self::Lt2 => 2,
        }
    }
}

impl SourceId {
    pub fn home_panel(self) -> PanelId {
        match self {
            Self::Utility(u) => u.home_panel(),
            Self::Generator(g) => g.home_panel(),
        }
    }

    pub fn element(self) -> ElementId {
        match self {
            Self::Utility(u) => u.element(),
            Self::Generator(g) => g.element(),
        }
    }
}

fn feeds_where(pred: impl Fn(&PanelFeeds) -> bool) -> &'static PanelFeeds {
    // The table covers every id of each enum, so a lookup always hits.
    PANEL_FEEDS
        .iter()
        .find(|f| pred(f))
        .unwrap_or(&PANEL_FEEDS[0])
}

impl From<UtilityId> for ElementId {
    fn from(u: UtilityId) -> Self {
        match u {
            UtilityId::Eb1 => Self::Eb1,
            UtilityId::Eb2 => Self::Eb2,
        }
    }
}

impl From<GeneratorId> for ElementId {
    fn from(g: GeneratorId) -> Self {
        match g {
            GeneratorId::Dg1 => Self::Dg1,
            GeneratorId::Dg2 => Self::Dg2,
        }
    }
}

impl From<CouplerId> for ElementId {
    fn from(c: CouplerId) -> Self {
        match c {
            CouplerId::Bc1 => Self::Bc1,
            CouplerId::Bc2 => Self::Bc2,
        }
    }
}

impl From<UtilityId> for SourceId {
    fn from(u: UtilityId) -> Self {
        Self::Utility(u)
    }
}

impl From<GeneratorId> for SourceId {
    fn from(g: GeneratorId) -> Self {
        Self::Generator(g)
    }
}

impl fmt::Display for UtilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.element().fmt(f)
    }
}

impl fmt::Display for GeneratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.element().fmt(f)
    }
}

impl fmt::Display for CouplerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            Self::Bc1 => 1,
            Self::Bc2 => 2,
        };
        write!(f, "Bus Coupler-{n}")
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LT-{}", self.number())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.element().fmt(f)
    }
}
