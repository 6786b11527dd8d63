use std::path::Path;

use pn_reduce::{Category, NodeKind};

fn demo(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("demos")
        .join(name)
}

#[test]
fn demos_load_and_validate() {
    for name in ["spur_and_ring.yaml"] {
        let file = pn_scenario::load_yaml(&demo(name))
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        pn_scenario::to_network(&file)
            .unwrap_or_else(|e| panic!("Failed to convert {}: {}", name, e));
    }
}

#[test]
fn spur_and_ring_reduces_to_ring_and_station() {
    let file = pn_scenario::load_yaml(&demo("spur_and_ring.yaml")).unwrap();
    let reduction = pn_scenario::reduce_file(&file, pn_scenario::reduce_config(&file)).unwrap();
    let report = &reduction.report;

    assert_eq!(report.initial_edges, 10);
    assert_eq!(report.final_nodes, 5);
    assert_eq!(report.final_edges, 5);
    assert_eq!(report.edge_reduction_percent(), 50);
    assert_eq!(report.run.parallel, 1);
    assert_eq!(report.run.leaf, 4);
    assert_eq!(report.run.serial, 0);
    assert_eq!(report.rounds, 3);

    let out = &reduction.file;
    assert!(out.connection("loop_1").is_none());
    assert!(out.connection("loop_2").is_some());
    assert_eq!(out.node("n2").unwrap().kind, NodeKind::Sink);
    assert_eq!(out.node("station_out").unwrap().kind, NodeKind::Sink);
    assert_eq!(out.categories["n1"], Category::Supply);
    assert_eq!(out.categories["station_out"], Category::Demand);
    assert_eq!(out.categories["n3"], Category::Junction);
}
