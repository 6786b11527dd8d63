//! Incremental network builder addressed by names.

use crate::error::{GraphError, GraphResult};
use crate::graph::Network;

/// Builder for constructing a network from named junctions and connectors.
///
/// Connectors reference their endpoints by name, so they may be declared
/// before or after the junctions they join. `build()` resolves the names,
/// validates the result and returns a ready `Network`.
#[derive(Debug)]
pub struct NetworkBuilder<N, E> {
    nodes: Vec<(String, N)>,
    edges: Vec<(String, String, String, E)>,
}

impl<N, E> Default for NetworkBuilder<N, E> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }
}

impl<N, E> NetworkBuilder<N, E> {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>, data: N) -> &mut Self {
        self.nodes.push((name.into(), data));
        self
    }

    /// Add a connector from `from` to `to` (node names).
    pub fn add_edge(
        &mut self,
        name: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        data: E,
    ) -> &mut Self {
        self.edges.push((name.into(), from.into(), to.into(), data));
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Resolve names and build the network.
    pub fn build(self) -> GraphResult<Network<N, E>> {
        let mut net = Network::new();
        for (name, data) in self.nodes {
            net.add_node(name, data)?;
        }

        for (name, from, to, data) in self.edges {
            let start = net
                .find_node(&from)
                .ok_or(GraphError::UnknownNodeName { name: from })?;
            let end = net
                .find_node(&to)
                .ok_or(GraphError::UnknownNodeName { name: to })?;
            net.add_edge(name, start, end, data)?;
        }

        net.validate()?;
        Ok(net)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_basic() {
        let mut builder: NetworkBuilder<(), u8> = NetworkBuilder::new();
        builder
            .add_node("N1", ())
            .add_node("N2", ())
            .add_edge("P1", "N1", "N2", 7);
        assert_eq!(builder.node_count(), 2);
        assert_eq!(builder.edge_count(), 1);

        let net = builder.build().unwrap();
        let n1 = net.find_node("N1").unwrap();
        let n2 = net.find_node("N2").unwrap();
        assert_eq!(n1.index(), 0);
        assert_eq!(n2.index(), 1);
        let p1 = net.find_edge("P1").unwrap();
        assert_eq!(net.edge_data(p1), Some(&7));
        assert_eq!(net.edge(p1).unwrap().start(), n1);
        assert_eq!(net.edge(p1).unwrap().end(), n2);
    }

    #[test]
    fn edges_may_precede_nodes() {
        let mut builder: NetworkBuilder<(), ()> = NetworkBuilder::new();
        builder.add_edge("P1", "A", "B", ());
        builder.add_node("A", ()).add_node("B", ());
        let net = builder.build().unwrap();
        assert_eq!(net.edge_count(), 1);
    }

    #[test]
    fn unknown_endpoint_is_reported() {
        let mut builder: NetworkBuilder<(), ()> = NetworkBuilder::new();
        builder.add_node("A", ()).add_edge("P1", "A", "Z", ());
        assert_eq!(
            builder.build().unwrap_err(),
            GraphError::UnknownNodeName { name: "Z".into() }
        );
    }

    #[test]
    fn duplicate_node_is_reported() {
        let mut builder: NetworkBuilder<(), ()> = NetworkBuilder::new();
        builder.add_node("A", ()).add_node("A", ());
        assert!(matches!(
            builder.build(),
            Err(GraphError::DuplicateNodeName { .. })
        ));
    }
}
