use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::PredictError;

/// Column roles for reconfiguring a loaded pipeline. All three fields
/// are required; a config missing any of them is rejected whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Semantic field name → actual column name.
    pub column_mapping: BTreeMap<String, String>,
    pub categorical_cols: Vec<String>,
    pub text_cols: Vec<String>,
}

/// Load a pipeline config from a JSON file. Existence is checked before
/// parsing so a missing file reports as its own error kind.
pub fn load_config(path: &Path) -> Result<PipelineConfig, PredictError> {
    if !path.exists() {
        return Err(PredictError::ConfigNotFound(path.to_path_buf()));
    }
    parse_config(path).map_err(PredictError::ConfigInvalid)
}

fn parse_config(path: &Path) -> Result<PipelineConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    serde_json::from_str(&text).context("parsing config JSON")
}
