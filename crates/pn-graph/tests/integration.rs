//! Integration tests for pn-graph.

use pn_core::NodeId;
use pn_graph::{Network, NetworkBuilder};
use proptest::prelude::*;

#[test]
fn build_path_network() {
    // A -- p1 -- B -- p2 -- C
    let mut builder = NetworkBuilder::new();
    builder
        .add_node("A", ())
        .add_node("B", ())
        .add_node("C", ())
        .add_edge("p1", "A", "B", 2.0)
        .add_edge("p2", "B", "C", 3.0);
    let net = builder.build().unwrap();

    assert_eq!(net.node_count(), 3);
    assert_eq!(net.edge_count(), 2);

    let [a, b, c] = ["A", "B", "C"].map(|n| net.find_node(n).unwrap());
    assert_eq!(net.degree(a), 1);
    assert_eq!(net.degree(b), 2);
    assert_eq!(net.degree(c), 1);

    let incident = net.incident_edges(b);
    assert_eq!(net.opposite(incident[0], b), Some(a));
    assert_eq!(net.opposite(incident[1], b), Some(c));
    assert!(net.edges_between(a, c).is_empty());
}

#[test]
fn contract_by_hand_keeps_table_consistent() {
    let mut builder = NetworkBuilder::new();
    builder
        .add_node("A", ())
        .add_node("B", ())
        .add_node("C", ())
        .add_edge("p1", "A", "B", 2.0)
        .add_edge("p2", "B", "C", 3.0);
    let mut net = builder.build().unwrap();
    let [a, b, c] = ["A", "B", "C"].map(|n| net.find_node(n).unwrap());

    let mut total = 0.0;
    for e in net.incident_edges(b).to_vec() {
        total += net.remove_edge(e).unwrap().data;
    }
    net.remove_node(b).unwrap();
    net.add_edge("p1+p2", a, c, total).unwrap();

    net.validate().unwrap();
    assert_eq!(net.node_count(), 2);
    assert_eq!(net.edge_count(), 1);
    let e = net.edges_between(c, a)[0];
    assert_eq!(net.edge_data(e), Some(&5.0));
    assert_eq!(net.edge_name(e), Some("p1+p2"));
}

#[test]
fn removed_ids_are_not_reused() {
    let mut net: Network<(), ()> = Network::new();
    let a = net.add_node("A", ()).unwrap();
    net.remove_node(a).unwrap();
    let again = net.add_node("A", ()).unwrap();
    assert_ne!(a, again);
    assert!(net.node(a).is_none());
}

#[derive(Debug, Clone)]
enum Op {
    AddNode,
    AddEdge(usize, usize),
    RemoveEdge(usize),
    RemoveNode(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::AddNode),
        (0..16usize, 0..16usize).prop_map(|(a, b)| Op::AddEdge(a, b)),
        (0..32usize).prop_map(Op::RemoveEdge),
        (0..16usize).prop_map(Op::RemoveNode),
    ]
}

proptest! {
    #[test]
    fn degree_matches_connections_under_mutation(ops in prop::collection::vec(op(), 1..80)) {
        let mut net: Network<(), ()> = Network::new();
        let mut next = 0;
        for op in ops {
            let nodes: Vec<NodeId> = net.node_ids().collect();
            match op {
                Op::AddNode => {
                    net.add_node(format!("n{next}"), ()).unwrap();
                    next += 1;
                }
                Op::AddEdge(i, j) if !nodes.is_empty() => {
                    let (a, b) = (nodes[i % nodes.len()], nodes[j % nodes.len()]);
                    net.add_edge(format!("e{next}"), a, b, ()).unwrap();
                    next += 1;
                }
                Op::RemoveEdge(i) => {
                    let edges: Vec<_> = net.edge_ids().collect();
                    if !edges.is_empty() {
                        net.remove_edge(edges[i % edges.len()]).unwrap();
                    }
                }
                Op::RemoveNode(i) if !nodes.is_empty() => {
                    let node = nodes[i % nodes.len()];
                    let degree = net.degree(node);
                    prop_assert_eq!(net.remove_node(node).is_ok(), degree == 0);
                }
                _ => {}
            }

            prop_assert!(net.validate().is_ok());
            for node in net.node_ids() {
                prop_assert_eq!(net.degree(node), net.connection_count(node));
            }
        }
    }
}
