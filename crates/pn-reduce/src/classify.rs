//! Final retyping of the junctions that survive reduction.

use pn_core::m3ps;
use tracing::debug;

use crate::model::{GasNetwork, NodeKind};

/// Retype every node not already a source or sink by the sign of its lower
/// flow bound: negative makes a sink, positive a source, zero leaves it.
///
/// Returns the number of nodes retyped.
pub fn classify_terminals(net: &mut GasNetwork) -> usize {
    let zero = m3ps(0.0);
    let ids: Vec<_> = net.node_ids().collect();
    let mut retyped = 0;

    for id in ids {
        let Some(junction) = net.node_data_mut(id) else {
            continue;
        };
        if matches!(junction.kind, NodeKind::Source | NodeKind::Sink) {
            continue;
        }
        let lower = junction.bounds.flow.lower();
        let kind = if lower < zero {
            NodeKind::Sink
        } else if lower > zero {
            NodeKind::Source
        } else {
            continue;
        };
        junction.kind = kind;
        retyped += 1;
        debug!(node = net.node_name(id).unwrap_or_default(), ?kind, "retyped terminal");
    }
    retyped
}
