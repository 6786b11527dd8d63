//! pn-scenario: network file format, validation and conversion.

pub mod convert;
pub mod pipeline;
pub mod schema;
pub mod validate;

pub use convert::{export, reduce_config, to_network, to_network_with};
pub use pipeline::{Reduction, reduce_file};
pub use schema::*;
pub use validate::{ValidationError, validate_network_file};

pub type ScenarioResult<T> = Result<T, ScenarioError>;

#[derive(thiserror::Error, Debug)]
pub enum ScenarioError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Graph(#[from] pn_graph::GraphError),

    #[error("Reduction error: {0}")]
    Reduce(#[from] pn_reduce::ReduceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScenarioError {
    /// True when the reduction rules left the model in an untrustworthy state.
    pub fn is_fatal_defect(&self) -> bool {
        matches!(self, ScenarioError::Reduce(e) if e.is_fatal_defect())
    }
}

pub fn load_yaml(path: &std::path::Path) -> ScenarioResult<NetworkFile> {
    let content = std::fs::read_to_string(path)?;
    let file: NetworkFile = serde_yaml::from_str(&content)?;
    validate_network_file(&file)?;
    Ok(file)
}

pub fn save_yaml(path: &std::path::Path, file: &NetworkFile) -> ScenarioResult<()> {
    validate_network_file(file)?;
    let content = serde_yaml::to_string(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &std::path::Path) -> ScenarioResult<NetworkFile> {
    let content = std::fs::read_to_string(path)?;
    let file: NetworkFile = serde_json::from_str(&content)?;
    validate_network_file(&file)?;
    Ok(file)
}

pub fn save_json(path: &std::path::Path, file: &NetworkFile) -> ScenarioResult<()> {
    validate_network_file(file)?;
    let content = serde_json::to_string_pretty(file)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load by extension: `.json` as JSON, anything else as YAML.
pub fn load(path: &std::path::Path) -> ScenarioResult<NetworkFile> {
    if is_json(path) {
        load_json(path)
    } else {
        load_yaml(path)
    }
}

fn is_json(path: &std::path::Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
