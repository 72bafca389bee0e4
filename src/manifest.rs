use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::Path,
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GraphgenError, GraphgenResult};

/// String-keyed configuration values, merged across cascade layers and passed
/// through to the template untyped.
pub type ParamBag = BTreeMap<String, Value>;

/// In-memory repository manifest. Loaded once at startup and read-only for the
/// rest of the process lifetime.
///
/// Field names follow the on-disk `repository.json` format, including the
/// space-separated keys of the original layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(rename = "graphs", default)]
    pub graph_types: BTreeMap<String, GraphTypeSpec>,

    #[serde(default)]
    pub algorithms: BTreeMap<String, AlgorithmSpec>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphTypeSpec {
    /// Parameters applying to every graph instance of this type.
    #[serde(rename = "global parameters", default)]
    pub global_parameters: ParamBag,

    /// Per-instance overrides at the type level. Only the `graph` sub-bag is
    /// consulted here.
    #[serde(rename = "graph parameters", default)]
    pub graph_parameters: BTreeMap<String, InstanceOverride>,

    #[serde(default)]
    pub algorithms: BTreeMap<String, AlgorithmBinding>,
}

/// Override bag with the two merge destinations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceOverride {
    #[serde(default)]
    pub graph: ParamBag,

    #[serde(default)]
    pub algorithm: ParamBag,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlgorithmBinding {
    #[serde(default)]
    pub parameters: InstanceOverride,

    /// Per-instance overrides, the most specific cascade layer. `None` when
    /// the manifest omits the table entirely; resolution reports that as a
    /// configuration defect instead of supplying empty bags.
    #[serde(rename = "graph parameters", skip_serializing_if = "Option::is_none")]
    pub graph_parameters: Option<BTreeMap<String, InstanceOverride>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlgorithmSpec {
    /// Template file name under `templates/`, shared across graph types.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

impl Manifest {
    pub fn from_path(path: &Path) -> GraphgenResult<Self> {
        let f = File::open(path).with_context(|| format!("open manifest '{}'", path.display()))?;
        let r = BufReader::new(f);
        let manifest =
            serde_json::from_reader(r).with_context(|| format!("parse manifest '{}'", path.display()))?;
        Ok(manifest)
    }

    pub fn graph_type_exists(&self, name: &str) -> bool {
        self.graph_types.contains_key(name)
    }

    pub fn algorithm_exists(&self, name: &str) -> bool {
        self.algorithms.contains_key(name)
    }

    pub fn graph_type(&self, name: &str) -> GraphgenResult<&GraphTypeSpec> {
        self.graph_types
            .get(name)
            .ok_or_else(|| GraphgenError::unknown_graph_type(name))
    }

    pub fn algorithm(&self, name: &str) -> GraphgenResult<&AlgorithmSpec> {
        self.algorithms
            .get(name)
            .ok_or_else(|| GraphgenError::unknown_algorithm(name))
    }
}
