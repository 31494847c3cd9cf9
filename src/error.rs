use std::path::PathBuf;

use thiserror::Error;

/// Everything that can go wrong between reading the data file and
/// printing predictions. Each variant wraps enough of the underlying
/// cause to produce a useful one-line message; nothing is retried.
#[derive(Error, Debug)]
pub enum PredictError {
    #[error("unsupported data format: .{0} (expected .xlsx or .csv)")]
    UnsupportedFormat(String),

    #[error("failed to load data: {0:#}")]
    DataLoad(anyhow::Error),

    #[error("threshold must be between 0 and 100, got {0}")]
    InvalidThreshold(f64),

    #[error("config file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("invalid config: {0:#}")]
    ConfigInvalid(anyhow::Error),

    #[error("failed to load model: {0:#}")]
    ModelLoad(anyhow::Error),

    #[error("pipeline structure mismatch: {0}")]
    StructureMismatch(String),

    #[error("prediction failed: {0:#}")]
    Prediction(anyhow::Error),
}
