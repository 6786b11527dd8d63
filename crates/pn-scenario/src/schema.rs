//! Network file schema definitions.
//!
//! Quantities are stored in the units network operators use: bar, m³/h,
//! km and mm.

use std::collections::BTreeMap;

use pn_reduce::{Category, ConnectorKind, NodeKind, ReduceConfig};
use serde::{Deserialize, Serialize};

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkFile {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reduction: Option<ReduceConfig>,
    /// Diagram category per node id, written alongside a reduced network
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub categories: BTreeMap<String, Category>,
}

impl NetworkFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
            reduction: None,
            categories: BTreeMap::new(),
        }
    }

    pub fn node(&self, id: &str) -> Option<&NodeDef> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn connection(&self, id: &str) -> Option<&ConnectionDef> {
        self.connections.iter().find(|c| c.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub id: String,
    #[serde(default)]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub balance_m3ph: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_min_m3ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_max_m3ph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_min_bar: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure_max_bar: Option<f64>,
}

impl NodeDef {
    /// Plain junction without bounds.
    pub fn junction(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: NodeKind::Junction,
            balance_m3ph: 0.0,
            flow_min_m3ph: None,
            flow_max_m3ph: None,
            pressure_min_bar: None,
            pressure_max_bar: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionDef {
    pub id: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub kind: ConnectorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<GeometryDef>,
    /// Pre-computed resistance coefficient; overrides the geometry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coefficient: Option<f64>,
}

impl ConnectionDef {
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        kind: ConnectorKind,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            kind,
            geometry: None,
            coefficient: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeometryDef {
    pub length_km: f64,
    pub diameter_mm: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roughness_mm: Option<f64>,
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}
