//! Structural validation of a network table.

use pn_core::EdgeId;

use crate::error::{GraphError, GraphResult};
use crate::graph::Network;

/// Validate the whole table: slot counts, name indices, incidence lists,
/// degrees against edge endpoints, and the parallel-edge index.
pub(crate) fn validate_network<N, E>(net: &Network<N, E>) -> GraphResult<()> {
    validate_counts(net)?;
    validate_names(net)?;
    validate_incidence(net)?;
    validate_pairs(net)?;
    Ok(())
}

fn validate_counts<N, E>(net: &Network<N, E>) -> GraphResult<()> {
    let nodes = net.nodes().count();
    if nodes != net.live_nodes {
        return Err(GraphError::CountMismatch {
            what: "node",
            recorded: net.live_nodes,
            actual: nodes,
        });
    }
    let edges = net.edges().count();
    if edges != net.live_edges {
        return Err(GraphError::CountMismatch {
            what: "edge",
            recorded: net.live_edges,
            actual: edges,
        });
    }
    Ok(())
}

fn validate_names<N, E>(net: &Network<N, E>) -> GraphResult<()> {
    if net.node_names.len() != net.live_nodes
        || net.nodes().any(|n| net.node_names.get(n.name()) != Some(&n.id))
    {
        return Err(GraphError::InconsistentNameIndex { what: "nodes" });
    }
    if net.edge_names.len() != net.live_edges
        || net.edges().any(|e| net.edge_names.get(e.name()) != Some(&e.id))
    {
        return Err(GraphError::InconsistentNameIndex { what: "edges" });
    }
    Ok(())
}

fn validate_incidence<N, E>(net: &Network<N, E>) -> GraphResult<()> {
    // Endpoints must be live
    for edge in net.edges() {
        for endpoint in [edge.start(), edge.end()] {
            if !net.contains_node(endpoint) {
                return Err(GraphError::UnknownNode { node: endpoint });
            }
        }
    }

    // Edge-ends per node, counted from the edge table alone
    let ends = net.connection_counts();

    for node in net.nodes() {
        for &edge_id in node.incident() {
            let touches = net.edge(edge_id).is_some_and(|e| e.ends_at(node.id) > 0);
            if !touches {
                return Err(GraphError::InconsistentIncidence {
                    node: node.id,
                    edge: edge_id,
                });
            }
        }

        let connections = ends.get(&node.id).copied().unwrap_or(0);
        if node.degree() != connections {
            return Err(GraphError::DegreeMismatch {
                node: node.id,
                name: node.name().to_string(),
                degree: node.degree(),
                connections,
            });
        }

        // Each listed edge must appear once per end it has at this node
        for &edge_id in node.incident() {
            let listed = node.incident().iter().filter(|e| **e == edge_id).count();
            let expected = net.edge(edge_id).map_or(0, |e| e.ends_at(node.id));
            if listed != expected {
                return Err(GraphError::InconsistentIncidence {
                    node: node.id,
                    edge: edge_id,
                });
            }
        }
    }
    Ok(())
}

fn validate_pairs<N, E>(net: &Network<N, E>) -> GraphResult<()> {
    let mut indexed = 0;
    for (pair, list) in &net.pairs {
        if list.is_empty() {
            let edge = EdgeId::from_index(0);
            return Err(GraphError::InconsistentPairIndex { edge });
        }
        for &edge_id in list {
            let filed_right = net.edge(edge_id).is_some_and(|e| e.pair() == *pair);
            if !filed_right {
                return Err(GraphError::InconsistentPairIndex { edge: edge_id });
            }
        }
        indexed += list.len();
    }

    for edge in net.edges() {
        let (a, b) = edge.pair().nodes();
        if !net.edges_between(a, b).contains(&edge.id) {
            return Err(GraphError::InconsistentPairIndex { edge: edge.id });
        }
    }
    if indexed != net.live_edges {
        let edge = net.edge_ids().next().unwrap_or(EdgeId::from_index(0));
        return Err(GraphError::InconsistentPairIndex { edge });
    }
    Ok(())
}
