//! Conversion between the file schema and the reduction model.

use pn_core::{bar, in_bar, in_m3ph, km, m3ph, mm};
use pn_graph::NetworkBuilder;
use pn_reduce::{
    Connector, ConnectorKind, FlowBound, GasNetwork, Junction, NodeBounds, PipeGeometry,
    ReduceConfig, ResistanceModel, SiamCoefficient,
};

use crate::ScenarioResult;
use crate::schema::{ConnectionDef, GeometryDef, LATEST_VERSION, NetworkFile, NodeDef};

/// Reduction settings embedded in the file, or the defaults.
pub fn reduce_config(file: &NetworkFile) -> ReduceConfig {
    file.reduction.unwrap_or_default()
}

/// Build the in-memory network, deriving pipe coefficients with the
/// file's own resistance settings.
pub fn to_network(file: &NetworkFile) -> ScenarioResult<GasNetwork> {
    let model = SiamCoefficient::new(reduce_config(file).resistance);
    to_network_with(file, &model)
}

/// Build the in-memory network with an explicit resistance model.
pub fn to_network_with(
    file: &NetworkFile,
    model: &dyn ResistanceModel,
) -> ScenarioResult<GasNetwork> {
    let mut builder = NetworkBuilder::new();
    for node in &file.nodes {
        let mut junction = Junction::new(node.kind, node_bounds(node));
        junction.style = file.categories.get(&node.id).copied();
        builder.add_node(node.id.clone(), junction);
    }
    for connection in &file.connections {
        let connector = Connector::new(connection.kind, coefficient(connection, model)?);
        builder.add_edge(
            connection.id.clone(),
            connection.from.clone(),
            connection.to.clone(),
            connector,
        );
    }
    Ok(builder.build()?)
}

fn node_bounds(node: &NodeDef) -> NodeBounds {
    let flow = match (node.flow_min_m3ph, node.flow_max_m3ph) {
        (None, None) => FlowBound::Free,
        (Some(lo), Some(hi)) => FlowBound::from_limits(m3ph(lo), m3ph(hi)),
        (lo, hi) => FlowBound::Range {
            lower: lo.map(m3ph),
            upper: hi.map(m3ph),
        },
    };
    NodeBounds {
        balance: m3ph(node.balance_m3ph),
        flow,
        pressure_lower: node.pressure_min_bar.map(bar),
        pressure_upper: node.pressure_max_bar.map(bar),
    }
}

fn coefficient(connection: &ConnectionDef, model: &dyn ResistanceModel) -> ScenarioResult<f64> {
    if let Some(c) = connection.coefficient {
        return Ok(c);
    }
    let geometry = connection.geometry.as_ref().map(pipe_geometry);
    Ok(model.coefficient(&connection.id, connection.kind, geometry.as_ref())?)
}

fn pipe_geometry(def: &GeometryDef) -> PipeGeometry {
    PipeGeometry {
        length: km(def.length_km),
        diameter: mm(def.diameter_mm),
        roughness: def.roughness_mm.map(mm),
    }
}

/// Write a (reduced) network back into the file schema.
///
/// Every connection carries its final coefficient explicitly. Connections
/// that still exist under their original id keep their geometry for
/// reference; synthesised serial connections without a single original
/// become pipes.
pub fn export(original: &NetworkFile, net: &GasNetwork) -> NetworkFile {
    let nodes = net
        .nodes()
        .map(|node| node_def(node.name(), &node.data))
        .collect();

    let connections = net
        .edges()
        .filter_map(|edge| {
            let from = net.node_name(edge.start())?;
            let to = net.node_name(edge.end())?;
            let source = original.connection(edge.name());
            let kind = match source {
                Some(_) => edge.data.kind,
                None => ConnectorKind::Pipe,
            };
            Some(ConnectionDef {
                id: edge.name().to_string(),
                from: from.to_string(),
                to: to.to_string(),
                kind,
                geometry: source.and_then(|c| c.geometry),
                coefficient: Some(edge.data.parameter),
            })
        })
        .collect();

    let categories = net
        .nodes()
        .map(|node| (node.name().to_string(), node.data.category()))
        .collect();

    NetworkFile {
        version: LATEST_VERSION,
        name: original.name.clone(),
        nodes,
        connections,
        reduction: original.reduction,
        categories,
    }
}

fn node_def(id: &str, junction: &Junction) -> NodeDef {
    let bounds = &junction.bounds;
    let (flow_min_m3ph, flow_max_m3ph) = match bounds.flow {
        FlowBound::Free => (None, None),
        FlowBound::Fixed(v) => (Some(in_m3ph(v)), Some(in_m3ph(v))),
        FlowBound::Range { lower, upper } => (lower.map(in_m3ph), upper.map(in_m3ph)),
    };
    NodeDef {
        id: id.to_string(),
        kind: junction.kind,
        balance_m3ph: in_m3ph(bounds.balance),
        flow_min_m3ph,
        flow_max_m3ph,
        pressure_min_bar: bounds.pressure_lower.map(in_bar),
        pressure_max_bar: bounds.pressure_upper.map(in_bar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pn_reduce::{Category, NodeKind};

    fn sample() -> NetworkFile {
        let mut file = NetworkFile::new("sample");
        let mut entry = NodeDef::junction("E");
        entry.kind = NodeKind::Entry;
        entry.flow_min_m3ph = Some(0.0);
        entry.flow_max_m3ph = Some(500.0);
        entry.pressure_min_bar = Some(40.0);
        entry.pressure_max_bar = Some(70.0);
        file.nodes.push(entry);
        let mut exit = NodeDef::junction("X");
        exit.flow_min_m3ph = Some(-120.0);
        exit.flow_max_m3ph = Some(-120.0);
        file.nodes.push(exit);

        let mut pipe = ConnectionDef::new("p", "E", "X", ConnectorKind::Pipe);
        pipe.geometry = Some(GeometryDef {
            length_km: 10.0,
            diameter_mm: 500.0,
            roughness_mm: None,
        });
        file.connections.push(pipe);
        file
    }

    #[test]
    fn bounds_are_converted() {
        let net = to_network(&sample()).unwrap();
        let e = net.node_data(net.find_node("E").unwrap()).unwrap();
        assert_eq!(e.kind, NodeKind::Entry);
        assert_eq!(e.bounds.flow, FlowBound::range(m3ph(0.0), m3ph(500.0)));
        assert_eq!(e.bounds.pressure_lower, Some(bar(40.0)));

        let x = net.node_data(net.find_node("X").unwrap()).unwrap();
        assert_eq!(x.bounds.flow, FlowBound::Fixed(m3ph(-120.0)));
        assert_eq!(x.bounds.pressure_upper, None);
    }

    #[test]
    fn one_sided_flow_bound() {
        let mut node = NodeDef::junction("J");
        node.flow_max_m3ph = Some(5.0);
        let bounds = node_bounds(&node);
        assert_eq!(
            bounds.flow,
            FlowBound::Range {
                lower: None,
                upper: Some(m3ph(5.0))
            }
        );
        assert!(bounds.flow.is_bounded());
    }

    #[test]
    fn pipe_coefficient_is_derived() {
        let net = to_network(&sample()).unwrap();
        let p = net.edge_data(net.find_edge("p").unwrap()).unwrap();
        assert!(p.parameter > 0.0);
    }

    #[test]
    fn explicit_coefficient_overrides_geometry() {
        let mut file = sample();
        file.connections[0].coefficient = Some(42.0);
        let net = to_network(&file).unwrap();
        assert_eq!(net.edge_data(net.find_edge("p").unwrap()).unwrap().parameter, 42.0);
    }

    #[test]
    fn unknown_endpoint_is_a_graph_error() {
        let mut file = sample();
        file.connections[0].to = "Q".into();
        assert!(matches!(to_network(&file), Err(crate::ScenarioError::Graph(_))));
    }

    #[test]
    fn export_carries_coefficients_and_categories() {
        let file = sample();
        let net = to_network(&file).unwrap();
        let out = export(&file, &net);

        assert_eq!(out.nodes.len(), 2);
        let e = out.node("E").unwrap();
        assert_eq!(e.kind, NodeKind::Entry);
        assert!((e.pressure_min_bar.unwrap() - 40.0).abs() < 1e-9);
        assert!((e.flow_max_m3ph.unwrap() - 500.0).abs() < 1e-9);
        let p = out.connection("p").unwrap();
        assert_eq!(p.geometry, file.connections[0].geometry);
        assert!(p.coefficient.unwrap() > 0.0);
        assert_eq!(out.categories["E"], Category::Supply);
        assert_eq!(out.categories["X"], Category::Junction);
    }

    #[test]
    fn categories_restore_styles() {
        let mut file = sample();
        file.categories.insert("X".into(), Category::Mixed);
        let net = to_network(&file).unwrap();
        let x = net.node_data(net.find_node("X").unwrap()).unwrap();
        assert_eq!(x.style, Some(Category::Mixed));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn node_bounds_survive_export(
            lo in proptest::option::of(-1.0e4_f64..0.0),
            hi in proptest::option::of(0.0_f64..1.0e4),
            p in proptest::option::of(1.0_f64..100.0),
        ) {
            let mut def = NodeDef::junction("n");
            def.flow_min_m3ph = lo;
            def.flow_max_m3ph = hi;
            def.pressure_min_bar = p;
            let back = node_def("n", &Junction::new(def.kind, node_bounds(&def)));

            let close = |a: Option<f64>, b: Option<f64>| match (a, b) {
                (Some(a), Some(b)) => (a - b).abs() <= 1e-9 * a.abs().max(1.0),
                (None, None) => true,
                _ => false,
            };
            prop_assert!(close(back.flow_min_m3ph, lo));
            prop_assert!(close(back.flow_max_m3ph, hi));
            prop_assert!(close(back.pressure_min_bar, p));
        }
    }
}
