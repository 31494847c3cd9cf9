/// Pipeline layer: the fitted prediction pipeline and its surroundings.
///
/// Architecture:
/// ```text
///  model_*.bin ──► artifact ──► Pipeline (column_mapper → preprocessor → predictor)
///                                  │
///  config.json ──► config ──► reconfigure (rebuild the two named stages)
///                                  │
///                                  ▼
///                            predict(Table) → Vec<String>
/// ```
pub mod artifact;
pub mod config;
pub mod model;
pub mod reconfigure;
