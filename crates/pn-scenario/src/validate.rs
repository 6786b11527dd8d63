//! Network file validation logic.

use std::collections::HashSet;

use pn_reduce::{ConnectorKind, ReduceConfig};
use tracing::warn;

use crate::schema::{ConnectionDef, GeometryDef, LATEST_VERSION, NetworkFile, NodeDef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_network_file(file: &NetworkFile) -> Result<(), ValidationError> {
    if file.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: file.version,
        });
    }

    let mut node_ids = HashSet::new();
    for node in &file.nodes {
        if !node_ids.insert(node.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: node.id.clone(),
                context: "nodes".to_string(),
            });
        }
        validate_node(node)?;
    }

    let mut connection_ids = HashSet::new();
    for connection in &file.connections {
        if !connection_ids.insert(connection.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: connection.id.clone(),
                context: "connections".to_string(),
            });
        }
        validate_connection(connection, &node_ids)?;
    }

    for id in file.categories.keys() {
        if !node_ids.contains(id.as_str()) {
            return Err(ValidationError::MissingReference {
                id: id.clone(),
                context: "categories".to_string(),
            });
        }
    }

    if let Some(config) = &file.reduction {
        validate_reduction(config)?;
    }

    Ok(())
}

fn validate_node(node: &NodeDef) -> Result<(), ValidationError> {
    let field = |name: &str| format!("node '{}' {}", node.id, name);

    if node.id.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "node id".to_string(),
            value: String::new(),
            reason: "must not be empty".to_string(),
        });
    }
    finite(&field("balance_m3ph"), node.balance_m3ph)?;
    for (name, value) in [
        ("flow_min_m3ph", node.flow_min_m3ph),
        ("flow_max_m3ph", node.flow_max_m3ph),
    ] {
        if let Some(v) = value {
            finite(&field(name), v)?;
        }
    }
    for (name, value) in [
        ("pressure_min_bar", node.pressure_min_bar),
        ("pressure_max_bar", node.pressure_max_bar),
    ] {
        if let Some(v) = value {
            positive_finite(&field(name), v)?;
        }
    }

    if let (Some(lo), Some(hi)) = (node.flow_min_m3ph, node.flow_max_m3ph)
        && lo > hi
    {
        return Err(ValidationError::InvalidValue {
            field: field("flow_min_m3ph"),
            value: lo.to_string(),
            reason: format!("must not exceed flow_max_m3ph ({hi})"),
        });
    }
    // Reduction can tighten a lower pressure bound past the upper one; the
    // file must still carry it so the infeasibility reaches the solver.
    if let (Some(lo), Some(hi)) = (node.pressure_min_bar, node.pressure_max_bar)
        && lo > hi
    {
        warn!(
            node = %node.id,
            pressure_min_bar = lo,
            pressure_max_bar = hi,
            "infeasible pressure bounds"
        );
    }
    Ok(())
}

fn validate_connection(
    connection: &ConnectionDef,
    node_ids: &HashSet<&str>,
) -> Result<(), ValidationError> {
    for (end, id) in [("from", &connection.from), ("to", &connection.to)] {
        if !node_ids.contains(id.as_str()) {
            return Err(ValidationError::MissingReference {
                id: id.clone(),
                context: format!("connection '{}' {}", connection.id, end),
            });
        }
    }

    let field = |name: &str| format!("connection '{}' {}", connection.id, name);

    if let Some(c) = connection.coefficient {
        non_negative_finite(&field("coefficient"), c)?;
    }
    if let Some(geometry) = &connection.geometry {
        validate_geometry(geometry, &field)?;
    }

    if connection.kind == ConnectorKind::Pipe
        && connection.coefficient.is_none()
        && connection.geometry.is_none()
    {
        return Err(ValidationError::InvalidValue {
            field: field("geometry"),
            value: "none".to_string(),
            reason: "a pipe needs a geometry or an explicit coefficient".to_string(),
        });
    }
    Ok(())
}

fn validate_geometry(
    geometry: &GeometryDef,
    field: &dyn Fn(&str) -> String,
) -> Result<(), ValidationError> {
    positive_finite(&field("length_km"), geometry.length_km)?;
    positive_finite(&field("diameter_mm"), geometry.diameter_mm)?;
    if let Some(k) = geometry.roughness_mm {
        positive_finite(&field("roughness_mm"), k)?;
        if k >= geometry.diameter_mm {
            return Err(ValidationError::InvalidValue {
                field: field("roughness_mm"),
                value: k.to_string(),
                reason: "must be smaller than the diameter".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_reduction(config: &ReduceConfig) -> Result<(), ValidationError> {
    positive_finite(
        "reduction normal_density_kg_per_m3",
        config.normal_density_kg_per_m3,
    )?;
    non_negative_finite(
        "reduction lower_pressure_sq_floor_bar2",
        config.lower_pressure_sq_floor_bar2,
    )?;
    non_negative_finite(
        "reduction upper_pressure_sq_floor_bar2",
        config.upper_pressure_sq_floor_bar2,
    )?;
    let r = &config.resistance;
    positive_finite("reduction resistance temperature_k", r.temperature_k)?;
    positive_finite("reduction resistance gas_constant", r.gas_constant)?;
    positive_finite("reduction resistance compressibility", r.compressibility)?;
    positive_finite(
        "reduction resistance default_roughness_mm",
        r.default_roughness_mm,
    )
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be finite".to_string(),
        });
    }
    Ok(())
}

fn positive_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be positive and finite".to_string(),
        });
    }
    Ok(())
}

fn non_negative_finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: "must be non-negative and finite".to_string(),
        });
    }
    Ok(())
}
