//! Junction and connector payloads carried by the network slots.

use pn_core::{Pressure, Real, VolumeRate, m3ps};
use pn_graph::Network;
use serde::{Deserialize, Serialize};

/// Classification of a junction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Junction,
    Source,
    Sink,
    Entry,
    Exit,
}

impl NodeKind {
    /// Kinds that feed gas into the network.
    pub fn is_supply(self) -> bool {
        matches!(self, NodeKind::Source | NodeKind::Entry)
    }

    /// Kinds that take gas out of the network.
    pub fn is_demand(self) -> bool {
        matches!(self, NodeKind::Sink | NodeKind::Exit)
    }
}

/// Physical element type of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    Pipe,
    ShortPipe,
    Valve,
    ControlValve,
    Resistor,
    Compressor,
    #[default]
    Unknown,
}

impl ConnectorKind {
    /// Passive elements that may be merged with parallel siblings.
    pub fn is_parallel_combinable(self) -> bool {
        matches!(
            self,
            ConnectorKind::Pipe | ConnectorKind::ShortPipe | ConnectorKind::Unknown
        )
    }

    /// Elements that may be dropped together with a dangling leaf junction.
    pub fn is_leaf_removable(self) -> bool {
        matches!(
            self,
            ConnectorKind::Pipe
                | ConnectorKind::ShortPipe
                | ConnectorKind::Resistor
                | ConnectorKind::Valve
        )
    }

    /// Kind given to a connector synthesized from two combinable ones in series.
    pub fn in_series_with(self, other: ConnectorKind) -> ConnectorKind {
        if self == other { self } else { ConnectorKind::Pipe }
    }
}

/// Flow-rate bound of a junction (positive = injection into the network).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FlowBound {
    #[default]
    Free,
    Fixed(VolumeRate),
    Range {
        lower: Option<VolumeRate>,
        upper: Option<VolumeRate>,
    },
}

impl FlowBound {
    /// Both limits present.
    pub fn range(lower: VolumeRate, upper: VolumeRate) -> Self {
        FlowBound::Range {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    /// Collapse equal limits into a fixed value.
    pub fn from_limits(lower: VolumeRate, upper: VolumeRate) -> Self {
        if lower == upper {
            FlowBound::Fixed(lower)
        } else {
            FlowBound::range(lower, upper)
        }
    }

    /// Lower limit, zero when absent.
    pub fn lower(&self) -> VolumeRate {
        match *self {
            FlowBound::Free => m3ps(0.0),
            FlowBound::Fixed(v) => v,
            FlowBound::Range { lower, .. } => lower.unwrap_or_else(|| m3ps(0.0)),
        }
    }

    /// Upper limit, zero when absent.
    pub fn upper(&self) -> VolumeRate {
        match *self {
            FlowBound::Free => m3ps(0.0),
            FlowBound::Fixed(v) => v,
            FlowBound::Range { upper, .. } => upper.unwrap_or_else(|| m3ps(0.0)),
        }
    }

    /// Whether an explicit limit is present.
    pub fn is_bounded(&self) -> bool {
        match self {
            FlowBound::Free => false,
            FlowBound::Fixed(_) => true,
            FlowBound::Range { lower, upper } => lower.is_some() || upper.is_some(),
        }
    }
}

/// Balance, flow and pressure data of a junction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeBounds {
    /// Net injection
    pub balance: VolumeRate,
    pub flow: FlowBound,
    pub pressure_lower: Option<Pressure>,
    pub pressure_upper: Option<Pressure>,
}

impl Default for NodeBounds {
    fn default() -> Self {
        Self {
            balance: m3ps(0.0),
            flow: FlowBound::Free,
            pressure_lower: None,
            pressure_upper: None,
        }
    }
}

/// Diagram category of a junction. Presentation only; never read by the
/// reduction rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Junction,
    Supply,
    Demand,
    /// Supply and demand folded into one junction
    Mixed,
}

impl Category {
    pub fn of(kind: NodeKind) -> Self {
        if kind.is_supply() {
            Category::Supply
        } else if kind.is_demand() {
            Category::Demand
        } else {
            Category::Junction
        }
    }

    /// Category of a junction that absorbed another one.
    pub fn combine(self, other: Category) -> Category {
        match (self, other) {
            (a, b) if a == b => a,
            (Category::Junction, b) => b,
            (a, Category::Junction) => a,
            _ => Category::Mixed,
        }
    }
}

/// Node payload.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Junction {
    pub kind: NodeKind,
    pub bounds: NodeBounds,
    /// Category recorded when this junction absorbed eliminated leaves
    pub style: Option<Category>,
}

impl Junction {
    pub fn new(kind: NodeKind, bounds: NodeBounds) -> Self {
        Self {
            kind,
            bounds,
            style: None,
        }
    }

    /// Recorded category, falling back to the one implied by the kind.
    pub fn category(&self) -> Category {
        self.style.unwrap_or_else(|| Category::of(self.kind))
    }
}

/// Edge payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub kind: ConnectorKind,
    /// Resistance coefficient β in Δ(p²) = β·m·|m| (Pa²·s²/kg²)
    pub parameter: Real,
}

impl Connector {
    pub fn new(kind: ConnectorKind, parameter: Real) -> Self {
        Self { kind, parameter }
    }
}

/// The network the reduction rules operate on.
pub type GasNetwork = Network<Junction, Connector>;
