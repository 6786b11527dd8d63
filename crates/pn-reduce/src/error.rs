//! Error types for topology reduction.

use pn_core::PnError;
use pn_graph::GraphError;
use thiserror::Error;

/// Errors raised while preparing or running a reduction.
///
/// Everything except `MissingGeometry` and `Numeric` marks a defect in the
/// reduction rules themselves: the model can no longer be trusted and the
/// caller must abort.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReduceError {
    #[error("{mutation} left the network inconsistent: {detail}")]
    Inconsistency { mutation: String, detail: String },

    #[error(
        "{mutation} left node '{node}' with degree {degree} but {connections} recorded connections (neighbours: {neighbours})"
    )]
    DegreeMismatch {
        mutation: String,
        node: String,
        degree: usize,
        connections: usize,
        neighbours: String,
    },

    #[error("Pipe '{edge}' has no geometry to derive a resistance coefficient from")]
    MissingGeometry { edge: String },

    #[error("No fixed point reached within {rounds} rounds")]
    NoFixedPoint { rounds: usize },

    #[error("Numeric error: {0}")]
    Numeric(#[from] PnError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

pub type ReduceResult<T> = Result<T, ReduceError>;

impl ReduceError {
    /// True for structural defects that must abort the process.
    pub fn is_fatal_defect(&self) -> bool {
        matches!(
            self,
            ReduceError::Inconsistency { .. }
                | ReduceError::DegreeMismatch { .. }
                | ReduceError::NoFixedPoint { .. }
                | ReduceError::Graph(_)
        )
    }
}

impl From<ReduceError> for PnError {
    fn from(e: ReduceError) -> Self {
        match e {
            ReduceError::Numeric(inner) => inner,
            ReduceError::MissingGeometry { .. } => PnError::InvalidArg {
                what: "pipe geometry",
            },
            other => PnError::Invariant {
                what: other.to_string(),
            },
        }
    }
}
