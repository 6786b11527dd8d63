//! Load-reduce-export in one call.

use std::collections::BTreeMap;

use pn_reduce::{Category, ReduceConfig, Reducer, ReductionReport};

use crate::ScenarioResult;
use crate::convert::{export, to_network};
use crate::schema::NetworkFile;

/// A reduced network, ready to be written back.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub report: ReductionReport,
    /// Final coefficient per surviving connection
    pub parameters: BTreeMap<String, f64>,
    pub categories: BTreeMap<String, Category>,
    pub file: NetworkFile,
}

/// Reduce the network in `file` with `config` and export the result.
pub fn reduce_file(file: &NetworkFile, config: ReduceConfig) -> ScenarioResult<Reduction> {
    let network = to_network(file)?;
    let mut reducer = Reducer::new(network, config);
    let report = reducer.run()?;

    let mut out = export(file, reducer.network());
    out.reduction = file.reduction.map(|_| config);

    Ok(Reduction {
        report,
        parameters: reducer.parameters(),
        categories: reducer.visual_categories(),
        file: out,
    })
}
