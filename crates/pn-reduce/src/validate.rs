//! Structural invariant checks run after each destructive reduction step.

use std::fmt;

use crate::config::ValidationMode;
use crate::error::{ReduceError, ReduceResult};
use crate::model::GasNetwork;

/// A destructive step, described by the names involved.
///
/// Names are captured before the step runs so the diagnostic still
/// identifies entities that no longer exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    ParallelMerge {
        kept: String,
        removed: String,
    },
    LeafRemoval {
        leaf: String,
        edge: String,
        neighbour: String,
    },
    SerialContraction {
        node: String,
        edges: [String; 2],
        neighbours: [String; 2],
    },
    IsolatedRemoval {
        node: String,
    },
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::ParallelMerge { kept, removed } => {
                write!(f, "parallel merge of '{removed}' into '{kept}'")
            }
            Mutation::LeafRemoval {
                leaf,
                edge,
                neighbour,
            } => write!(
                f,
                "leaf removal of '{leaf}' via '{edge}' onto '{neighbour}'"
            ),
            Mutation::SerialContraction {
                node,
                edges,
                neighbours,
            } => write!(
                f,
                "serial contraction of '{node}' (edges '{}', '{}'; neighbours '{}', '{}')",
                edges[0], edges[1], neighbours[0], neighbours[1]
            ),
            Mutation::IsolatedRemoval { node } => write!(f, "removal of isolated '{node}'"),
        }
    }
}

/// Invariant-checking strategy, chosen by the caller.
pub trait InvariantCheck: Send + Sync {
    fn name(&self) -> &'static str;

    /// Inspect the network after `mutation`. An error is a fatal defect.
    fn check(&self, net: &GasNetwork, mutation: &Mutation) -> ReduceResult<()>;
}

/// Checks nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheck;

impl InvariantCheck for NoCheck {
    fn name(&self) -> &'static str {
        "none"
    }

    fn check(&self, _net: &GasNetwork, _mutation: &Mutation) -> ReduceResult<()> {
        Ok(())
    }
}

/// Degree of every surviving node against the connections recorded for it
/// in the edge table, then a full validation of the table itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullCheck;

impl InvariantCheck for FullCheck {
    fn name(&self) -> &'static str {
        "full"
    }

    fn check(&self, net: &GasNetwork, mutation: &Mutation) -> ReduceResult<()> {
        let ends = net.connection_counts();
        for node in net.nodes() {
            let connections = ends.get(&node.id).copied().unwrap_or(0);
            if node.degree() != connections {
                return Err(ReduceError::DegreeMismatch {
                    mutation: mutation.to_string(),
                    node: node.name().to_string(),
                    degree: node.degree(),
                    connections,
                    neighbours: neighbour_names(net, node.id),
                });
            }
        }

        net.validate().map_err(|err| ReduceError::Inconsistency {
            mutation: mutation.to_string(),
            detail: err.to_string(),
        })
    }
}

/// Comma-separated names of the nodes across each incident edge.
fn neighbour_names(net: &GasNetwork, node: pn_core::NodeId) -> String {
    net.incident_edges(node)
        .iter()
        .filter_map(|e| net.opposite(*e, node))
        .filter_map(|n| net.node_name(n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Checker for a configured mode.
pub fn checker_for(mode: ValidationMode) -> Box<dyn InvariantCheck> {
    match mode {
        ValidationMode::Off => Box::new(NoCheck),
        ValidationMode::Full => Box::new(FullCheck),
    }
}
