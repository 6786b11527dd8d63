//! pn-reduce: topology reduction with bound propagation for pipe networks.
//!
//! Provides:
//! - Junction/connector payloads and the `GasNetwork` alias
//! - Resistance coefficients (derivation, serial/parallel composition)
//! - Leaf bound propagation through the squared-pressure relation
//! - The fixed-point `Reducer` (parallel merge, leaf pruning, serial contraction)
//! - Injectable invariant checks and final terminal classification
//!
//! # Example
//!
//! ```
//! use pn_reduce::{Connector, ConnectorKind, GasNetwork, Junction, ReduceConfig, Reducer};
//!
//! let mut net = GasNetwork::new();
//! let a = net.add_node("A", Junction::default()).unwrap();
//! let b = net.add_node("B", Junction::default()).unwrap();
//! let c = net.add_node("C", Junction::default()).unwrap();
//! net.add_edge("p1", a, b, Connector::new(ConnectorKind::Pipe, 2.0)).unwrap();
//! net.add_edge("p2", b, c, Connector::new(ConnectorKind::Pipe, 3.0)).unwrap();
//!
//! let mut reducer = Reducer::new(net, ReduceConfig::default());
//! let report = reducer.run().unwrap();
//! assert!(report.final_edges < report.initial_edges);
//! ```

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod parameter;
pub mod propagate;
pub mod report;
pub mod validate;

pub use classify::classify_terminals;
pub use config::{ReduceConfig, ResistanceConfig, ValidationMode};
pub use engine::Reducer;
pub use error::{ReduceError, ReduceResult};
pub use model::{
    Category, Connector, ConnectorKind, FlowBound, GasNetwork, Junction, NodeBounds, NodeKind,
};
pub use parameter::{
    PipeGeometry, ResistanceModel, SiamCoefficient, parallel_compose, parallel_compose_all,
    serial_compose,
};
pub use propagate::{BoundPropagator, Propagation};
pub use report::{ReductionCounters, ReductionReport, edge_reduction_percent};
pub use validate::{FullCheck, InvariantCheck, Mutation, NoCheck, checker_for};
