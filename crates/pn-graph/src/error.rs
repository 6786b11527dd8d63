//! Graph-specific error types.

use pn_core::{EdgeId, NodeId, PnError};
use thiserror::Error;

pub type GraphResult<T> = Result<T, GraphError>;

/// Network construction, mutation and validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node {node} does not exist")]
    UnknownNode { node: NodeId },

    #[error("Edge {edge} does not exist")]
    UnknownEdge { edge: EdgeId },

    #[error("No node named '{name}'")]
    UnknownNodeName { name: String },

    #[error("Duplicate node name '{name}'")]
    DuplicateNodeName { name: String },

    #[error("Duplicate edge name '{name}'")]
    DuplicateEdgeName { name: String },

    /// Nodes are only removed once all incident edges are gone.
    #[error("Node {node} ('{name}') still has degree {degree}")]
    NodeHasEdges {
        node: NodeId,
        name: String,
        degree: usize,
    },

    #[error("Edge {edge} in node {node}'s incidence list does not reference that node")]
    InconsistentIncidence { node: NodeId, edge: EdgeId },

    #[error("Node {node} ('{name}') has degree {degree} but {connections} recorded connection ends")]
    DegreeMismatch {
        node: NodeId,
        name: String,
        degree: usize,
        connections: usize,
    },

    #[error("Edge {edge} is missing from or misfiled in the parallel-edge index")]
    InconsistentPairIndex { edge: EdgeId },

    #[error("Name index for {what} is out of sync")]
    InconsistentNameIndex { what: &'static str },

    #[error("Live {what} count is {recorded} but {actual} slots are occupied")]
    CountMismatch {
        what: &'static str,
        recorded: usize,
        actual: usize,
    },
}

impl From<GraphError> for PnError {
    fn from(err: GraphError) -> Self {
        PnError::Invariant {
            what: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_node() {
        let err = GraphError::NodeHasEdges {
            node: NodeId::from_index(4),
            name: "junction_4".into(),
            degree: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("n4"));
        assert!(msg.contains("junction_4"));
    }

    #[test]
    fn converts_into_invariant() {
        let err: PnError = GraphError::UnknownEdge {
            edge: EdgeId::from_index(1),
        }
        .into();
        assert!(matches!(err, PnError::Invariant { .. }));
    }
}
