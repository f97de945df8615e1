use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};

/// Sample label used when a run measures the image as a whole
pub const DEFAULT_SAMPLE: &str = "default";

/// A descriptive value about the run, not a measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub datatype: String,
    pub value: Value,
}

/// One recorded measurement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "trait")]
    pub trait_name: String,
    pub method: String,
    pub scale: String,
    pub datatype: String,
    pub value: Value,
    pub label: Value,
}

/// Measurements accumulated over one run, written as JSON at the end
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Outputs {
    pub metadata: BTreeMap<String, Metadata>,
    pub observations: BTreeMap<String, BTreeMap<String, Observation>>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        self.metadata.insert(
            key.into(),
            Metadata {
                datatype: datatype_of(&value).to_string(),
                value,
            },
        );
    }

    /// Record (or replace) a measurement for `sample`
    #[allow(clippy::too_many_arguments)]
    pub fn add_observation(
        &mut self,
        sample: &str,
        variable: &str,
        trait_name: &str,
        method: &str,
        scale: &str,
        value: impl Into<Value>,
        label: impl Into<Value>,
    ) {
        let value = value.into();
        let observation = Observation {
            trait_name: trait_name.to_string(),
            method: method.to_string(),
            scale: scale.to_string(),
            datatype: datatype_of(&value).to_string(),
            value,
            label: label.into(),
        };
        self.observations
            .entry(sample.to_string())
            .or_default()
            .insert(variable.to_string(), observation);
    }

    pub fn observation(&self, sample: &str, variable: &str) -> Option<&Observation> {
        self.observations.get(sample)?.get(variable)
    }

    /// Write everything recorded so far as pretty-printed JSON
    pub fn save_results(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| Error::write_failure(path, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| Error::write_failure(path, e))?;
        std::fs::write(path, json).map_err(|e| Error::write_failure(path, e))?;
        log::info!("Results written to {}", path.display());
        Ok(())
    }
}

fn datatype_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "none",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
