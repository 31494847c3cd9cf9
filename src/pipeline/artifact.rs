use std::path::Path;

use anyhow::{Context, Result};

use super::model::Pipeline;
use crate::error::PredictError;

/// Deserialize a previously fitted pipeline from a binary artifact.
/// Any failure (missing file, corrupt or incompatible encoding) is fatal.
pub fn load_model(path: &Path) -> Result<Pipeline, PredictError> {
    read_artifact(path).map_err(PredictError::ModelLoad)
}

fn read_artifact(path: &Path) -> Result<Pipeline> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("reading model artifact {}", path.display()))?;
    bincode::deserialize(&bytes).context("decoding model artifact")
}

/// Serialize a fitted pipeline to disk. Used by the sample-model
/// generator; the CLI itself only ever loads.
pub fn save_model(path: &Path, pipeline: &Pipeline) -> Result<()> {
    let bytes = bincode::serialize(pipeline).context("encoding model artifact")?;
    std::fs::write(path, bytes)
        .with_context(|| format!("writing model artifact {}", path.display()))?;
    Ok(())
}
