//! Mutable multigraph over junctions and connectors.

use std::collections::{HashMap, HashSet};

use pn_core::{EdgeId, NodeId};

use crate::error::{GraphError, GraphResult};
use crate::validate;

/// Unordered endpoint pair, stored as (min, max).
///
/// Key of the parallel-edge index: `a -> b` and `b -> a` edges share a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodePair(NodeId, NodeId);

impl NodePair {
    /// Pair of two endpoints, in either order.
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }

    /// Get the endpoints, lower id first.
    pub fn nodes(self) -> (NodeId, NodeId) {
        (self.0, self.1)
    }
}

/// A junction slot: name, payload and the edge-ends incident to it.
///
/// `incident` holds one entry per edge-end in insertion order, so a self-loop
/// appears twice and `degree()` counts it twice.
#[derive(Debug, Clone)]
pub struct Node<N> {
    pub id: NodeId,
    name: String,
    pub data: N,
    pub(crate) incident: Vec<EdgeId>,
}

impl<N> Node<N> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn degree(&self) -> usize {
        self.incident.len()
    }

    pub fn incident(&self) -> &[EdgeId] {
        &self.incident
    }
}

/// A connector slot between an ordered start and end node.
#[derive(Debug, Clone)]
pub struct Edge<E> {
    pub id: EdgeId,
    name: String,
    start: NodeId,
    end: NodeId,
    pub data: E,
}

impl<E> Edge<E> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn start(&self) -> NodeId {
        self.start
    }

    pub fn end(&self) -> NodeId {
        self.end
    }

    pub fn pair(&self) -> NodePair {
        NodePair::new(self.start, self.end)
    }

    pub fn is_self_loop(&self) -> bool {
        self.start == self.end
    }

    /// Number of ends of this edge attached to `node` (0, 1 or 2).
    pub fn ends_at(&self, node: NodeId) -> usize {
        usize::from(self.start == node) + usize::from(self.end == node)
    }

    /// The endpoint across from `node`, or `None` if the edge does not touch it.
    pub fn opposite(&self, node: NodeId) -> Option<NodeId> {
        if self.start == node {
            Some(self.end)
        } else if self.end == node {
            Some(self.start)
        } else {
            None
        }
    }
}

/// The network: junction and connector slots addressed by stable ids.
///
/// Payloads (`N` per node, `E` per edge) live in the same slot as the
/// structure, so removing an entity drops its attributes in the same step.
/// Slots are never reused; removed ids stay dead.
///
/// Removal does not cascade: incident edges must be removed before their node.
#[derive(Debug, Clone)]
pub struct Network<N, E> {
    pub(crate) nodes: Vec<Option<Node<N>>>,
    pub(crate) edges: Vec<Option<Edge<E>>>,
    pub(crate) node_names: HashMap<String, NodeId>,
    pub(crate) edge_names: HashMap<String, EdgeId>,
    pub(crate) pairs: HashMap<NodePair, Vec<EdgeId>>,
    pub(crate) live_nodes: usize,
    pub(crate) live_edges: usize,
}

impl<N, E> Default for Network<N, E> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            node_names: HashMap::new(),
            edge_names: HashMap::new(),
            pairs: HashMap::new(),
            live_nodes: 0,
            live_edges: 0,
        }
    }
}

impl<N, E> Network<N, E> {
    /// Create an empty network.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id. Names must be unique among live nodes.
    pub fn add_node(&mut self, name: impl Into<String>, data: N) -> GraphResult<NodeId> {
        let name = name.into();
        if self.node_names.contains_key(&name) {
            return Err(GraphError::DuplicateNodeName { name });
        }
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.node_names.insert(name.clone(), id);
        self.nodes.push(Some(Node {
            id,
            name,
            data,
            incident: Vec::new(),
        }));
        self.live_nodes += 1;
        Ok(id)
    }

    /// Add an edge from `start` to `end`. Self-loops and parallel edges are allowed.
    pub fn add_edge(
        &mut self,
        name: impl Into<String>,
        start: NodeId,
        end: NodeId,
        data: E,
    ) -> GraphResult<EdgeId> {
        let name = name.into();
        if self.edge_names.contains_key(&name) {
            return Err(GraphError::DuplicateEdgeName { name });
        }
        for endpoint in [start, end] {
            if !self.contains_node(endpoint) {
                return Err(GraphError::UnknownNode { node: endpoint });
            }
        }

        let id = EdgeId::from_index(self.edges.len() as u32);
        for endpoint in [start, end] {
            if let Some(node) = self.node_slot_mut(endpoint) {
                node.incident.push(id);
            }
        }
        self.pairs
            .entry(NodePair::new(start, end))
            .or_default()
            .push(id);
        self.edge_names.insert(name.clone(), id);
        self.edges.push(Some(Edge {
            id,
            name,
            start,
            end,
            data,
        }));
        self.live_edges += 1;
        Ok(id)
    }

    /// Remove an edge, detaching it from both endpoints and the pair index.
    ///
    /// Removing the last edge between two nodes clears the pair from the index.
    pub fn remove_edge(&mut self, id: EdgeId) -> GraphResult<Edge<E>> {
        let edge = self
            .edges
            .get_mut(id.slot())
            .and_then(Option::take)
            .ok_or(GraphError::UnknownEdge { edge: id })?;

        for endpoint in [edge.start, edge.end] {
            if let Some(node) = self.node_slot_mut(endpoint) {
                node.incident.retain(|e| *e != id);
            }
        }

        let pair = edge.pair();
        if let Some(list) = self.pairs.get_mut(&pair) {
            list.retain(|e| *e != id);
            if list.is_empty() {
                self.pairs.remove(&pair);
            }
        }
        self.edge_names.remove(&edge.name);
        self.live_edges -= 1;
        Ok(edge)
    }

    /// Remove a node. Its degree must already be zero.
    pub fn remove_node(&mut self, id: NodeId) -> GraphResult<Node<N>> {
        let node = self.node(id).ok_or(GraphError::UnknownNode { node: id })?;
        if node.degree() != 0 {
            return Err(GraphError::NodeHasEdges {
                node: id,
                name: node.name.clone(),
                degree: node.degree(),
            });
        }

        let node = self
            .nodes
            .get_mut(id.slot())
            .and_then(Option::take)
            .ok_or(GraphError::UnknownNode { node: id })?;
        self.node_names.remove(&node.name);
        self.live_nodes -= 1;
        Ok(node)
    }

    /// Whether `id` names a live node.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge(id).is_some()
    }

    /// Get a live node.
    pub fn node(&self, id: NodeId) -> Option<&Node<N>> {
        self.nodes.get(id.slot()).and_then(Option::as_ref)
    }

    /// Get a live edge.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge<E>> {
        self.edges.get(id.slot()).and_then(Option::as_ref)
    }

    /// Get a node's payload.
    pub fn node_data(&self, id: NodeId) -> Option<&N> {
        self.node(id).map(|n| &n.data)
    }

    pub fn node_data_mut(&mut self, id: NodeId) -> Option<&mut N> {
        self.node_slot_mut(id).map(|n| &mut n.data)
    }

    /// Get an edge's payload.
    pub fn edge_data(&self, id: EdgeId) -> Option<&E> {
        self.edge(id).map(|e| &e.data)
    }

    pub fn edge_data_mut(&mut self, id: EdgeId) -> Option<&mut E> {
        self.edges
            .get_mut(id.slot())
            .and_then(Option::as_mut)
            .map(|e| &mut e.data)
    }

    /// Get a node's name.
    pub fn node_name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(Node::name)
    }

    /// Get an edge's name.
    pub fn edge_name(&self, id: EdgeId) -> Option<&str> {
        self.edge(id).map(Edge::name)
    }

    /// Look up a live node by name.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.node_names.get(name).copied()
    }

    /// Look up a live edge by name.
    pub fn find_edge(&self, name: &str) -> Option<EdgeId> {
        self.edge_names.get(name).copied()
    }

    /// Number of incident edge-ends; 0 for unknown nodes.
    pub fn degree(&self, id: NodeId) -> usize {
        self.node(id).map_or(0, Node::degree)
    }

    /// Incident edges in insertion order (self-loops listed twice).
    pub fn incident_edges(&self, id: NodeId) -> &[EdgeId] {
        self.node(id).map_or(&[], |n| n.incident.as_slice())
    }

    /// All edges joining `a` and `b`, in either direction, in insertion order.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> &[EdgeId] {
        self.pairs
            .get(&NodePair::new(a, b))
            .map_or(&[], Vec::as_slice)
    }

    /// The endpoint of `edge` across from `node`.
    pub fn opposite(&self, edge: EdgeId, node: NodeId) -> Option<NodeId> {
        self.edge(edge)?.opposite(node)
    }

    /// Live node ids in slot order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes().map(|n| n.id)
    }

    /// Live edge ids in slot order.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges().map(|e| e.id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node<N>> {
        self.nodes.iter().flatten()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge<E>> {
        self.edges.iter().flatten()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.live_nodes
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.live_edges
    }

    /// Partition edges by unordered endpoint pair.
    ///
    /// Classes are ordered by their lowest edge id; members keep insertion order.
    pub fn pair_classes(&self) -> Vec<Vec<EdgeId>> {
        let mut seen = HashSet::new();
        let mut classes = Vec::new();
        for edge in self.edges() {
            let pair = edge.pair();
            if seen.insert(pair) {
                let (a, b) = pair.nodes();
                classes.push(self.edges_between(a, b).to_vec());
            }
        }
        classes
    }

    /// Count edge-ends referencing `node` by scanning the edge table.
    ///
    /// Independent of the incidence lists; `degree(node)` must always equal it.
    pub fn connection_count(&self, node: NodeId) -> usize {
        self.edges().map(|e| e.ends_at(node)).sum()
    }

    /// Edge-ends per node for the whole table, counted in one scan.
    ///
    /// Nodes without edges are absent from the map.
    pub fn connection_counts(&self) -> HashMap<NodeId, usize> {
        let mut ends: HashMap<NodeId, usize> = HashMap::with_capacity(self.live_nodes);
        for edge in self.edges() {
            *ends.entry(edge.start).or_default() += 1;
            *ends.entry(edge.end).or_default() += 1;
        }
        ends
    }

    /// Check every structural invariant of the table.
    pub fn validate(&self) -> GraphResult<()> {
        validate::validate_network(self)
    }

    fn node_slot_mut(&mut self, id: NodeId) -> Option<&mut Node<N>> {
        self.nodes.get_mut(id.slot()).and_then(Option::as_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (Network<(), f64>, [NodeId; 3]) {
        let mut net = Network::new();
        let a = net.add_node("A", ()).unwrap();
        let b = net.add_node("B", ()).unwrap();
        let c = net.add_node("C", ()).unwrap();
        net.add_edge("ab", a, b, 1.0).unwrap();
        net.add_edge("bc", b, c, 2.0).unwrap();
        net.add_edge("ca", c, a, 3.0).unwrap();
        (net, [a, b, c])
    }

    #[test]
    fn node_pair_is_unordered() {
        let a = NodeId::from_index(3);
        let b = NodeId::from_index(1);
        assert_eq!(NodePair::new(a, b), NodePair::new(b, a));
        assert_eq!(NodePair::new(a, b).nodes(), (b, a));
    }

    #[test]
    fn self_loop_counts_twice() {
        let mut net: Network<(), ()> = Network::new();
        let a = net.add_node("A", ()).unwrap();
        let e = net.add_edge("loop", a, a, ()).unwrap();
        assert_eq!(net.degree(a), 2);
        assert_eq!(net.incident_edges(a), &[e, e]);
        assert_eq!(net.connection_count(a), 2);
        assert_eq!(net.connection_counts()[&a], 2);

        net.remove_edge(e).unwrap();
        assert!(net.connection_counts().is_empty());
        assert_eq!(net.degree(a), 0);
        assert!(net.edges_between(a, a).is_empty());
    }

    #[test]
    fn edges_between_sees_both_directions() {
        let mut net: Network<(), ()> = Network::new();
        let a = net.add_node("A", ()).unwrap();
        let b = net.add_node("B", ()).unwrap();
        let e1 = net.add_edge("e1", a, b, ()).unwrap();
        let e2 = net.add_edge("e2", b, a, ()).unwrap();
        assert_eq!(net.edges_between(a, b), &[e1, e2]);
        assert_eq!(net.edges_between(b, a), &[e1, e2]);
    }

    #[test]
    fn removing_last_edge_clears_pair() {
        let (mut net, [a, b, _]) = triangle();
        let ab = net.find_edge("ab").unwrap();
        let removed = net.remove_edge(ab).unwrap();
        assert_eq!(removed.data, 1.0);
        assert!(net.edges_between(a, b).is_empty());
        assert!(!net.pairs.contains_key(&NodePair::new(a, b)));
        assert_eq!(net.degree(a), 1);
        assert_eq!(net.degree(b), 1);
        assert!(net.find_edge("ab").is_none());
        net.validate().unwrap();
    }

    #[test]
    fn remove_node_requires_degree_zero() {
        let (mut net, [a, _, _]) = triangle();
        let err = net.remove_node(a).unwrap_err();
        assert!(matches!(err, GraphError::NodeHasEdges { degree: 2, .. }));

        for e in net.incident_edges(a).to_vec() {
            net.remove_edge(e).unwrap();
        }
        let node = net.remove_node(a).unwrap();
        assert_eq!(node.name(), "A");
        assert_eq!(net.node_count(), 2);
        assert_eq!(net.edge_count(), 1);
        assert!(!net.contains_node(a));
        assert!(net.find_node("A").is_none());
        net.validate().unwrap();
    }

    #[test]
    fn incident_order_is_stable() {
        let (net, [a, _, c]) = triangle();
        let ab = net.find_edge("ab").unwrap();
        let ca = net.find_edge("ca").unwrap();
        assert_eq!(net.incident_edges(a), &[ab, ca]);
        assert_eq!(net.opposite(ca, a), Some(c));
        assert_eq!(net.opposite(ca, NodeId::from_index(1)), None);
    }

    #[test]
    fn duplicate_names_rejected() {
        let (mut net, [a, b, _]) = triangle();
        assert!(matches!(
            net.add_node("A", ()),
            Err(GraphError::DuplicateNodeName { .. })
        ));
        assert!(matches!(
            net.add_edge("ab", a, b, 0.0),
            Err(GraphError::DuplicateEdgeName { .. })
        ));
    }

    #[test]
    fn add_edge_to_unknown_node_fails() {
        let (mut net, [a, _, _]) = triangle();
        let ghost = NodeId::from_index(99);
        assert_eq!(
            net.add_edge("x", a, ghost, 0.0),
            Err(GraphError::UnknownNode { node: ghost })
        );
    }

    #[test]
    fn pair_classes_group_parallels() {
        let (mut net, [a, b, _]) = triangle();
        let extra = net.add_edge("ba", b, a, 4.0).unwrap();
        let classes = net.pair_classes();
        assert_eq!(classes.len(), 3);
        let ab = net.find_edge("ab").unwrap();
        assert_eq!(classes[0], vec![ab, extra]);
    }
}
