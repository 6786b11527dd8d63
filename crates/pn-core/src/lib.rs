//! pn-core: stable foundation for pipenet.
//!
//! Contains:
//! - units (uom SI types + constructors in network units: bar, m³/h, mm)
//! - numeric (Real + tolerances + float helpers)
//! - ids (typed compact IDs for network slots)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PnError, PnResult};
pub use ids::{EdgeId, NodeId};
pub use numeric::*;
pub use units::*;
