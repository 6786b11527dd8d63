//! Reduction counters and the end-of-run summary.

use std::fmt;
use std::ops::{AddAssign, Sub};

use serde::Serialize;

/// How many times each reduction rule fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReductionCounters {
    pub serial: usize,
    pub leaf: usize,
    pub parallel: usize,
}

impl ReductionCounters {
    pub fn total(&self) -> usize {
        self.serial + self.leaf + self.parallel
    }
}

impl AddAssign for ReductionCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.serial += rhs.serial;
        self.leaf += rhs.leaf;
        self.parallel += rhs.parallel;
    }
}

impl Sub for ReductionCounters {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            serial: self.serial.saturating_sub(rhs.serial),
            leaf: self.leaf.saturating_sub(rhs.leaf),
            parallel: self.parallel.saturating_sub(rhs.parallel),
        }
    }
}

impl fmt::Display for ReductionCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} serial, {} leaf, {} parallel reductions",
            self.serial, self.leaf, self.parallel
        )
    }
}

/// Outcome of one `Reducer::run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReductionReport {
    pub initial_nodes: usize,
    pub initial_edges: usize,
    pub final_nodes: usize,
    pub final_edges: usize,
    /// Rounds of the fixed-point loop, including the final idle one
    pub rounds: usize,
    /// Reductions performed by this run
    pub run: ReductionCounters,
    /// Reductions performed by every run of the same reducer
    pub total: ReductionCounters,
    /// Nodes retyped as source or sink after convergence
    pub reclassified: usize,
}

impl ReductionReport {
    /// `round(100 - 100·E1/E0)`; 0 for a network without edges.
    pub fn edge_reduction_percent(&self) -> i64 {
        edge_reduction_percent(self.initial_edges, self.final_edges)
    }
}

pub fn edge_reduction_percent(initial_edges: usize, final_edges: usize) -> i64 {
    if initial_edges == 0 {
        return 0;
    }
    let ratio = final_edges as f64 / initial_edges as f64;
    (100.0 - 100.0 * ratio).round() as i64
}

impl fmt::Display for ReductionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reduction finished. {} nodes and {} edges remaining. \
             This is a {}% reduction in the number of edges.",
            self.final_nodes,
            self.final_edges,
            self.edge_reduction_percent()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(initial_edges: usize, final_edges: usize) -> ReductionReport {
        ReductionReport {
            initial_nodes: 10,
            initial_edges,
            final_nodes: 3,
            final_edges,
            rounds: 4,
            run: ReductionCounters::default(),
            total: ReductionCounters::default(),
            reclassified: 0,
        }
    }

    #[test]
    fn percent_is_rounded() {
        assert_eq!(edge_reduction_percent(3, 1), 67);
        assert_eq!(edge_reduction_percent(2, 1), 50);
        assert_eq!(edge_reduction_percent(8, 8), 0);
        assert_eq!(edge_reduction_percent(7, 0), 100);
        assert_eq!(edge_reduction_percent(0, 0), 0);
    }

    #[test]
    fn summary_line() {
        assert_eq!(
            report(4, 1).to_string(),
            "Reduction finished. 3 nodes and 1 edges remaining. \
             This is a 75% reduction in the number of edges."
        );
    }

    #[test]
    fn counters_accumulate_and_diff() {
        let mut total = ReductionCounters {
            serial: 1,
            leaf: 2,
            parallel: 0,
        };
        let before = total;
        total += ReductionCounters {
            serial: 1,
            leaf: 0,
            parallel: 3,
        };
        assert_eq!(total.total(), 7);
        assert_eq!(
            total - before,
            ReductionCounters {
                serial: 1,
                leaf: 0,
                parallel: 3
            }
        );
        assert_eq!(total.to_string(), "2 serial, 2 leaf, 3 parallel reductions");
    }
}
