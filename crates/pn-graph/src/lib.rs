//! pn-graph: network model layer for pipenet.
//!
//! Provides:
//! - A mutable multigraph (`Network`) over junction and connector slots,
//!   each slot owning its payload
//! - Degree, incidence and parallel-edge (unordered pair) queries
//! - A name-addressed builder with validation
//!
//! # Example
//!
//! ```
//! use pn_graph::NetworkBuilder;
//!
//! let mut builder = NetworkBuilder::new();
//! builder.add_node("A", ()).add_node("B", ());
//! builder.add_edge("pipe", "A", "B", 2.0_f64);
//! builder.add_edge("bypass", "B", "A", 3.0_f64);
//! let net = builder.build().unwrap();
//!
//! let a = net.find_node("A").unwrap();
//! let b = net.find_node("B").unwrap();
//! assert_eq!(net.degree(a), 2);
//! assert_eq!(net.edges_between(b, a).len(), 2);
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub(crate) mod validate;

// Re-exports for ergonomics
pub use builder::NetworkBuilder;
pub use error::{GraphError, GraphResult};
pub use graph::{Edge, Network, Node, NodePair};
