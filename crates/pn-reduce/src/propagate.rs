//! Folding an eliminated leaf junction's constraints onto its neighbour.
//!
//! Flow limits add up across the merge. Pressure limits travel through the
//! pipe relation `p_start² - p_end² = β·m·|m|`, using the leaf's own flow
//! limits converted to mass flow at normal density. Propagated pressure
//! limits only ever tighten the neighbour's.

use pn_core::{EdgeId, NodeId, Pressure, Real, ensure_finite, pa, signed_square};
use pn_graph::GraphError;
use tracing::debug;

use crate::config::ReduceConfig;
use crate::error::{ReduceError, ReduceResult};
use crate::model::{Category, FlowBound, GasNetwork, Junction, NodeKind};

/// The neighbour's new state after absorbing a leaf.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Propagation {
    pub kind: NodeKind,
    pub flow: FlowBound,
    pub balance: pn_core::VolumeRate,
    pub pressure_lower: Option<Pressure>,
    pub pressure_upper: Option<Pressure>,
    pub style: Category,
}

impl Propagation {
    fn apply(self, junction: &mut Junction) {
        junction.kind = self.kind;
        junction.bounds.flow = self.flow;
        junction.bounds.balance = self.balance;
        junction.bounds.pressure_lower = self.pressure_lower;
        junction.bounds.pressure_upper = self.pressure_upper;
        junction.style = Some(self.style);
    }
}

/// Folds leaf constraints onto the surviving neighbour.
#[derive(Debug, Clone, Copy)]
pub struct BoundPropagator<'a> {
    config: &'a ReduceConfig,
}

impl<'a> BoundPropagator<'a> {
    pub fn new(config: &'a ReduceConfig) -> Self {
        Self { config }
    }

    /// Compute the neighbour's new state.
    ///
    /// `beta` is the coefficient of the joining edge; `leaf_is_start` tells
    /// whether the leaf sits at that edge's start, which fixes the sign of
    /// the squared-pressure shift.
    pub fn fold(
        &self,
        leaf: &Junction,
        neighbour: &Junction,
        beta: Real,
        leaf_is_start: bool,
    ) -> ReduceResult<Propagation> {
        let lf = &leaf.bounds;
        let nb = &neighbour.bounds;

        let lower = lf.flow.lower() + nb.flow.lower();
        let upper = lf.flow.upper() + nb.flow.upper();
        let zero = pn_core::m3ps(0.0);

        let kind = if upper < zero {
            NodeKind::Sink
        } else if lower > zero {
            NodeKind::Source
        } else if lower == zero && upper == zero {
            neighbour.kind
        } else if lower + upper >= zero {
            NodeKind::Entry
        } else {
            NodeKind::Exit
        };

        let flow = if lf.flow.is_bounded() || nb.flow.is_bounded() {
            FlowBound::from_limits(lower, upper)
        } else {
            FlowBound::Free
        };

        let mut pressure_lower = nb.pressure_lower;
        if let Some(p) = lf.pressure_lower {
            let sq = self.shifted_square(p, lf.flow.lower().value, beta, leaf_is_start)?;
            let candidate = pa(sq.max(self.config.lower_floor_pa2()).sqrt());
            if pressure_lower.is_none_or(|current| candidate > current) {
                pressure_lower = Some(candidate);
            }
        }

        let mut pressure_upper = nb.pressure_upper;
        if let Some(p) = lf.pressure_upper {
            let sq = self.shifted_square(p, lf.flow.upper().value, beta, leaf_is_start)?;
            let candidate = pa(sq.max(0.0).max(self.config.upper_floor_pa2()).sqrt());
            if pressure_upper.is_none_or(|current| candidate < current) {
                pressure_upper = Some(candidate);
            }
        }

        let style = leaf.category().combine(neighbour.category());

        Ok(Propagation {
            kind,
            flow,
            balance: lf.balance + nb.balance,
            pressure_lower,
            pressure_upper,
            style,
        })
    }

    /// Squared pressure on the far side of the edge, in Pa².
    fn shifted_square(
        &self,
        p: Pressure,
        flow_m3ps: Real,
        beta: Real,
        leaf_is_start: bool,
    ) -> ReduceResult<Real> {
        let mass_flow = flow_m3ps * self.config.normal_density().value;
        let shift = beta * signed_square(mass_flow);
        let sq = if leaf_is_start {
            p.value.powi(2) - shift
        } else {
            p.value.powi(2) + shift
        };
        ensure_finite(sq, "propagated squared pressure").map_err(ReduceError::from)
    }

    /// Fold `leaf` onto the node across `edge` and write the result there.
    ///
    /// Does not remove anything; returns the neighbour.
    pub fn propagate(
        &self,
        net: &mut GasNetwork,
        leaf: NodeId,
        edge: EdgeId,
    ) -> ReduceResult<NodeId> {
        let link = net
            .edge(edge)
            .ok_or(ReduceError::Graph(GraphError::UnknownEdge { edge }))?;
        let leaf_is_start = link.start() == leaf;
        let beta = link.data.parameter;
        let neighbour = link
            .opposite(leaf)
            .ok_or(ReduceError::Graph(GraphError::InconsistentIncidence { node: leaf, edge }))?;

        let leaf_data = net
            .node_data(leaf)
            .ok_or(ReduceError::Graph(GraphError::UnknownNode { node: leaf }))?;
        let neighbour_data = net
            .node_data(neighbour)
            .ok_or(ReduceError::Graph(GraphError::UnknownNode { node: neighbour }))?;

        let outcome = self.fold(leaf_data, neighbour_data, beta, leaf_is_start)?;
        debug!(
            leaf = net.node_name(leaf).unwrap_or_default(),
            neighbour = net.node_name(neighbour).unwrap_or_default(),
            kind = ?outcome.kind,
            "folded leaf bounds"
        );

        if let Some(target) = net.node_data_mut(neighbour) {
            outcome.apply(target);
        }
        Ok(neighbour)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::model::NodeBounds;
    use pn_core::{bar, m3ph};
    use proptest::prelude::*;

    fn bounded(flow_lo: f64, flow_hi: f64, p_lo: f64, p_hi: f64) -> Junction {
        Junction::new(
            NodeKind::Junction,
            NodeBounds {
                flow: FlowBound::range(m3ph(flow_lo), m3ph(flow_hi)),
                pressure_lower: Some(bar(p_lo)),
                pressure_upper: Some(bar(p_hi)),
                ..NodeBounds::default()
            },
        )
    }

    proptest! {
        #[test]
        fn pressure_bounds_only_tighten(
            leaf_flow in -1.0e5_f64..1.0e5,
            spread in 0.0_f64..1.0e4,
            leaf_p in 1.0_f64..90.0,
            nb_lo in 1.0_f64..40.0,
            nb_hi in 40.0_f64..90.0,
            beta in 0.0_f64..1.0e9,
            leaf_is_start in any::<bool>(),
        ) {
            let config = ReduceConfig::default();
            let prop = BoundPropagator::new(&config);
            let leaf = bounded(leaf_flow, leaf_flow + spread, leaf_p, leaf_p + 5.0);
            let neighbour = bounded(0.0, 0.0, nb_lo, nb_hi);
            let out = prop.fold(&leaf, &neighbour, beta, leaf_is_start).unwrap();
            prop_assert!(out.pressure_lower.unwrap() >= bar(nb_lo));
            prop_assert!(out.pressure_upper.unwrap() <= bar(nb_hi));
        }
    }
}
