//! The fixed-point reduction loop.
//!
//! Three rules run in strict priority: parallel merge, leaf pruning, serial
//! contraction. Whenever a pass changes the network the round restarts from
//! the parallel merge. Every successful step removes at least one edge, so
//! the loop ends after at most `E0 + 1` rounds.

use std::collections::{BTreeMap, VecDeque};

use pn_core::{EdgeId, NodeId, Real};
use pn_graph::GraphError;
use tracing::{debug, info, warn};

use crate::classify::classify_terminals;
use crate::config::ReduceConfig;
use crate::error::{ReduceError, ReduceResult};
use crate::model::{Category, Connector, ConnectorKind, GasNetwork, NodeKind};
use crate::parameter::{parallel_compose, parameter, serial_compose};
use crate::propagate::BoundPropagator;
use crate::report::{ReductionCounters, ReductionReport};
use crate::validate::{InvariantCheck, Mutation, checker_for};

/// Owns a network for the duration of its reduction.
pub struct Reducer {
    network: GasNetwork,
    config: ReduceConfig,
    checker: Box<dyn InvariantCheck>,
    counters: ReductionCounters,
}

impl std::fmt::Debug for Reducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reducer")
            .field("nodes", &self.network.node_count())
            .field("edges", &self.network.edge_count())
            .field("checker", &self.checker.name())
            .field("counters", &self.counters)
            .finish()
    }
}

impl Reducer {
    /// Reducer with the checker selected by `config.validation`.
    pub fn new(network: GasNetwork, config: ReduceConfig) -> Self {
        let checker = checker_for(config.validation);
        Self::with_checker(network, config, checker)
    }

    /// Reducer with an explicit invariant checker.
    pub fn with_checker(
        network: GasNetwork,
        config: ReduceConfig,
        checker: Box<dyn InvariantCheck>,
    ) -> Self {
        Self {
            network,
            config,
            checker,
            counters: ReductionCounters::default(),
        }
    }

    /// Get the network in its current state.
    pub fn network(&self) -> &GasNetwork {
        &self.network
    }

    /// Mutable access between runs; counters keep accumulating.
    pub fn network_mut(&mut self) -> &mut GasNetwork {
        &mut self.network
    }

    /// Consume the reducer and return the network.
    pub fn into_network(self) -> GasNetwork {
        self.network
    }

    /// Get the reduction configuration.
    pub fn config(&self) -> &ReduceConfig {
        &self.config
    }

    /// Reductions performed by every run so far.
    pub fn counters(&self) -> ReductionCounters {
        self.counters
    }

    /// Reduce to a fixed point, then retype the surviving terminals.
    pub fn run(&mut self) -> ReduceResult<ReductionReport> {
        let initial_nodes = self.network.node_count();
        let initial_edges = self.network.edge_count();
        let before = self.counters;
        let max_rounds = initial_nodes + initial_edges + 1;

        debug!(
            nodes = initial_nodes,
            edges = initial_edges,
            checker = self.checker.name(),
            "starting reduction"
        );

        let mut rounds = 0;
        loop {
            rounds += 1;
            if rounds > max_rounds {
                return Err(ReduceError::NoFixedPoint { rounds: max_rounds });
            }
            if self.merge_parallel()? > 0 {
                continue;
            }
            if self.prune_leaves()? > 0 {
                continue;
            }
            if self.contract_degree_two_nodes()? > 0 {
                continue;
            }
            break;
        }

        let reclassified = classify_terminals(&mut self.network);

        let report = ReductionReport {
            initial_nodes,
            initial_edges,
            final_nodes: self.network.node_count(),
            final_edges: self.network.edge_count(),
            rounds,
            run: self.counters - before,
            total: self.counters,
            reclassified,
        };
        info!(
            serial = report.run.serial,
            leaf = report.run.leaf,
            parallel = report.run.parallel,
            "{report}"
        );
        Ok(report)
    }

    /// Merge every class of parallel combinable edges down to one edge.
    ///
    /// Within a class the earlier edge is removed and the later one carries
    /// the composed coefficient. Returns the number of edges removed.
    pub fn merge_parallel(&mut self) -> ReduceResult<usize> {
        let mut merged = 0;

        for class in self.network.pair_classes() {
            let combinable: Vec<EdgeId> = class
                .into_iter()
                .filter(|e| {
                    self.connector_kind(*e)
                        .is_some_and(ConnectorKind::is_parallel_combinable)
                })
                .collect();
            let Some((&first, rest)) = combinable.split_first() else {
                continue;
            };

            let mut removed = first;
            for &kept in rest {
                let beta = parallel_compose(
                    parameter(&self.network, removed)?,
                    parameter(&self.network, kept)?,
                );
                let mutation = Mutation::ParallelMerge {
                    kept: self.edge_label(kept),
                    removed: self.edge_label(removed),
                };

                self.network.remove_edge(removed)?;
                self.connector_mut(kept)?.parameter = beta;
                self.counters.parallel += 1;
                merged += 1;
                debug!(%mutation, beta, "merged parallel edges");
                self.checker.check(&self.network, &mutation)?;

                removed = kept;
            }
        }
        Ok(merged)
    }

    /// Eliminate leaves, cascading onto neighbours that become leaves.
    ///
    /// Returns the number of leaves eliminated.
    pub fn prune_leaves(&mut self) -> ReduceResult<usize> {
        let mut queue: VecDeque<NodeId> = self
            .network
            .node_ids()
            .filter(|n| self.is_removable_leaf(*n))
            .collect();
        let mut pruned = 0;

        while let Some(leaf) = queue.pop_front() {
            // Two leaves sharing one edge: the second is left with degree 0.
            if !self.is_removable_leaf(leaf) {
                continue;
            }
            let neighbour = self.eliminate_leaf(leaf)?;
            pruned += 1;
            if self.is_removable_leaf(neighbour) {
                debug!(node = %self.node_label(neighbour), "cascading leaf");
                queue.push_back(neighbour);
            }
        }
        Ok(pruned)
    }

    /// Contract unconstrained degree-two junctions into serial edges.
    ///
    /// Returns the number of junctions contracted.
    pub fn contract_degree_two_nodes(&mut self) -> ReduceResult<usize> {
        let mut queue: VecDeque<NodeId> = self
            .network
            .node_ids()
            .filter(|n| self.is_contractable(*n))
            .collect();
        let mut contracted = 0;

        while let Some(node) = queue.pop_front() {
            if !self.is_contractable(node) {
                continue;
            }
            self.contract(node, &mut queue)?;
            contracted += 1;
        }
        Ok(contracted)
    }

    /// Parameter table of the surviving edges, by edge name.
    pub fn parameters(&self) -> BTreeMap<String, Real> {
        self.network
            .edges()
            .map(|e| (e.name().to_string(), e.data.parameter))
            .collect()
    }

    /// Diagram category of every surviving node, by node name.
    pub fn visual_categories(&self) -> BTreeMap<String, Category> {
        self.network
            .nodes()
            .map(|n| (n.name().to_string(), n.data.category()))
            .collect()
    }

    fn is_removable_leaf(&self, node: NodeId) -> bool {
        match self.network.incident_edges(node) {
            [edge] => self
                .connector_kind(*edge)
                .is_some_and(ConnectorKind::is_leaf_removable),
            _ => false,
        }
    }

    fn is_contractable(&self, node: NodeId) -> bool {
        let Some(junction) = self.network.node_data(node) else {
            return false;
        };
        if junction.kind != NodeKind::Junction || junction.bounds.flow.is_bounded() {
            return false;
        }
        match self.network.incident_edges(node) {
            [e1, e2] if e1 != e2 => [e1, e2].into_iter().all(|e| {
                self.connector_kind(*e)
                    .is_some_and(ConnectorKind::is_parallel_combinable)
            }),
            _ => false,
        }
    }

    /// Fold a leaf onto its neighbour, then drop the leaf and its edge.
    fn eliminate_leaf(&mut self, leaf: NodeId) -> ReduceResult<NodeId> {
        let edge = self
            .network
            .incident_edges(leaf)
            .first()
            .copied()
            .ok_or(ReduceError::Graph(GraphError::UnknownNode { node: leaf }))?;
        let mutation = Mutation::LeafRemoval {
            leaf: self.node_label(leaf),
            edge: self.edge_label(edge),
            neighbour: self
                .network
                .opposite(edge, leaf)
                .map(|n| self.node_label(n))
                .unwrap_or_default(),
        };

        let neighbour =
            BoundPropagator::new(&self.config).propagate(&mut self.network, leaf, edge)?;
        self.network.remove_edge(edge)?;
        self.network.remove_node(leaf)?;
        self.counters.leaf += 1;
        debug!(%mutation, "eliminated leaf");
        self.checker.check(&self.network, &mutation)?;
        Ok(neighbour)
    }

    fn contract(&mut self, node: NodeId, queue: &mut VecDeque<NodeId>) -> ReduceResult<()> {
        let (e1, e2) = match self.network.incident_edges(node) {
            [e1, e2] => (*e1, *e2),
            _ => {
                return Err(ReduceError::Inconsistency {
                    mutation: format!("serial contraction of '{}'", self.node_label(node)),
                    detail: format!("degree {} at contraction", self.network.degree(node)),
                });
            }
        };
        let other = self.neighbour_across(e1, node)?;
        let other2 = self.neighbour_across(e2, node)?;

        let first = *self.connector(e1)?;
        let second = *self.connector(e2)?;
        let beta = serial_compose(first.parameter, second.parameter);
        let kind = first.kind.in_series_with(second.kind);
        let name = self.fresh_edge_name(&format!(
            "{}+{}",
            self.edge_label(e1),
            self.edge_label(e2)
        ));

        let mutation = Mutation::SerialContraction {
            node: self.node_label(node),
            edges: [self.edge_label(e1), self.edge_label(e2)],
            neighbours: [self.node_label(other), self.node_label(other2)],
        };
        self.network.remove_edge(e1)?;
        self.network.remove_edge(e2)?;
        self.network.remove_node(node)?;
        self.counters.serial += 1;
        self.checker.check(&self.network, &mutation)?;

        if other == other2 {
            self.counters.parallel += 1;
            debug!(%mutation, "serial loop collapsed");
            return self.reexamine(other, true, queue);
        }

        let existing = self
            .network
            .edges_between(other, other2)
            .iter()
            .copied()
            .find(|e| {
                self.connector_kind(*e)
                    .is_some_and(ConnectorKind::is_parallel_combinable)
            });

        match existing {
            Some(edge) => {
                let target = self.connector_mut(edge)?;
                target.parameter = parallel_compose(target.parameter, beta);
                self.counters.parallel += 1;
                debug!(
                    %mutation,
                    merged_into = %self.edge_label(edge),
                    "folded serial edge into parallel one"
                );
                self.checker.check(&self.network, &mutation)?;
                self.reexamine(other, false, queue)?;
                self.reexamine(other2, false, queue)
            }
            None => {
                self.network
                    .add_edge(name, other, other2, Connector::new(kind, beta))?;
                debug!(%mutation, beta, "synthesised serial edge");
                self.checker.check(&self.network, &mutation)
            }
        }
    }

    /// Follow-up for a contraction neighbour whose degree dropped.
    fn reexamine(
        &mut self,
        node: NodeId,
        collapsed_loop: bool,
        queue: &mut VecDeque<NodeId>,
    ) -> ReduceResult<()> {
        match self.network.degree(node) {
            0 => self.remove_isolated(node),
            1 if collapsed_loop && self.is_removable_leaf(node) => {
                self.eliminate_leaf(node).map(|_| ())
            }
            // Left for the next leaf pass.
            1 => Ok(()),
            2 => {
                queue.push_back(node);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn remove_isolated(&mut self, node: NodeId) -> ReduceResult<()> {
        let mutation = Mutation::IsolatedRemoval {
            node: self.node_label(node),
        };
        if self
            .network
            .node_data(node)
            .is_some_and(|j| j.bounds.flow.is_bounded())
        {
            warn!(%mutation, "dropping isolated node with a flow bound");
        }
        self.network.remove_node(node)?;
        debug!(%mutation, "removed isolated node");
        self.checker.check(&self.network, &mutation)
    }

    fn fresh_edge_name(&self, base: &str) -> String {
        if self.network.find_edge(base).is_none() {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}#{n}"))
            .find(|candidate| self.network.find_edge(candidate).is_none())
            .unwrap_or_else(|| base.to_string())
    }

    fn neighbour_across(&self, edge: EdgeId, node: NodeId) -> ReduceResult<NodeId> {
        self.network
            .opposite(edge, node)
            .ok_or(ReduceError::Graph(GraphError::InconsistentIncidence { node, edge }))
    }

    fn connector(&self, edge: EdgeId) -> ReduceResult<&Connector> {
        self.network
            .edge_data(edge)
            .ok_or(ReduceError::Graph(GraphError::UnknownEdge { edge }))
    }

    fn connector_mut(&mut self, edge: EdgeId) -> ReduceResult<&mut Connector> {
        self.network
            .edge_data_mut(edge)
            .ok_or(ReduceError::Graph(GraphError::UnknownEdge { edge }))
    }

    fn connector_kind(&self, edge: EdgeId) -> Option<ConnectorKind> {
        self.network.edge_data(edge).map(|c| c.kind)
    }

    fn node_label(&self, node: NodeId) -> String {
        self.network
            .node_name(node)
            .map_or_else(|| node.to_string(), str::to_string)
    }

    fn edge_label(&self, edge: EdgeId) -> String {
        self.network
            .edge_name(edge)
            .map_or_else(|| edge.to_string(), str::to_string)
    }
}
