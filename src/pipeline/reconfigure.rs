use super::config::PipelineConfig;
use super::model::{Pipeline, Stage, TransformerEntry, COLUMN_MAPPER_STAGE, PREPROCESSOR_STAGE};
use crate::error::PredictError;

/// Build a reconfigured copy of `pipeline` with the column-mapper and
/// preprocessor stages rewritten around the configured columns. The
/// input pipeline is left untouched.
///
/// The mapper's required columns become `categorical_cols ++ text_cols`
/// and its mapping is fully replaced. The preprocessor keeps its current
/// first and second transformers unchanged but re-pairs them as exactly
/// `("cat", categorical_cols)` and `("text", text_cols)`.
///
/// This assumes the fitted pipeline shape: both stages must exist under
/// their fixed names and the preprocessor must carry at least two
/// transformer entries.
pub fn update_pipeline_with_config(
    pipeline: &Pipeline,
    config: &PipelineConfig,
) -> Result<Pipeline, PredictError> {
    let mut required: Vec<String> = config.categorical_cols.clone();
    required.extend(config.text_cols.iter().cloned());

    let mut updated = pipeline.clone();
    let mut saw_mapper = false;
    let mut saw_preprocessor = false;

    for (name, stage) in &mut updated.stages {
        match (name.as_str(), stage) {
            (
                COLUMN_MAPPER_STAGE,
                Stage::ColumnMapper {
                    column_mapping,
                    required_columns,
                },
            ) => {
                *required_columns = required.clone();
                *column_mapping = config.column_mapping.clone();
                saw_mapper = true;
            }
            (PREPROCESSOR_STAGE, Stage::Preprocessor { transformers }) => {
                if transformers.len() < 2 {
                    return Err(PredictError::StructureMismatch(format!(
                        "preprocessor stage has {} transformer(s), expected at least 2",
                        transformers.len()
                    )));
                }
                let categorical = transformers[0].transformer.clone();
                let text = transformers[1].transformer.clone();
                *transformers = vec![
                    TransformerEntry {
                        role: "cat".to_string(),
                        transformer: categorical,
                        columns: config.categorical_cols.clone(),
                    },
                    TransformerEntry {
                        role: "text".to_string(),
                        transformer: text,
                        columns: config.text_cols.clone(),
                    },
                ];
                saw_preprocessor = true;
            }
            _ => {}
        }
    }

    if !saw_mapper {
        return Err(PredictError::StructureMismatch(format!(
            "pipeline has no '{COLUMN_MAPPER_STAGE}' stage"
        )));
    }
    if !saw_preprocessor {
        return Err(PredictError::StructureMismatch(format!(
            "pipeline has no '{PREPROCESSOR_STAGE}' stage"
        )));
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::pipeline::model::{Predictor, Transformer};

    fn fitted_pipeline() -> Pipeline {
        Pipeline {
            stages: vec![
                (
                    COLUMN_MAPPER_STAGE.to_string(),
                    Stage::ColumnMapper {
                        column_mapping: BTreeMap::from([(
                            "old".to_string(),
                            "fitted_col".to_string(),
                        )]),
                        required_columns: vec!["fitted_col".to_string()],
                    },
                ),
                (
                    PREPROCESSOR_STAGE.to_string(),
                    Stage::Preprocessor {
                        transformers: vec![
                            TransformerEntry {
                                role: "cat".to_string(),
                                transformer: Transformer::CategoryHasher { n_features: 8 },
                                columns: vec!["fitted_col".to_string()],
                            },
                            TransformerEntry {
                                role: "text".to_string(),
                                transformer: Transformer::TokenHasher { n_features: 16 },
                                columns: vec!["fitted_text".to_string()],
                            },
                        ],
                    },
                ),
                (
                    "classifier".to_string(),
                    Stage::Predictor(Predictor {
                        classes: vec!["a".to_string()],
                        weights: vec![vec![0.0; 24]],
                        bias: vec![0.0],
                    }),
                ),
            ],
        }
    }

    fn sample_config() -> PipelineConfig {
        PipelineConfig {
            column_mapping: BTreeMap::from([("x".to_string(), "colX".to_string())]),
            categorical_cols: vec!["c1".to_string()],
            text_cols: vec!["t1".to_string()],
        }
    }

    #[test]
    fn rewrites_both_stages_and_reuses_transformers() {
        let pipeline = fitted_pipeline();
        let updated = update_pipeline_with_config(&pipeline, &sample_config()).unwrap();

        match updated.stage(COLUMN_MAPPER_STAGE).unwrap() {
            Stage::ColumnMapper {
                column_mapping,
                required_columns,
            } => {
                assert_eq!(required_columns, &["c1", "t1"]);
                assert_eq!(column_mapping["x"], "colX");
                assert!(!column_mapping.contains_key("old"));
            }
            other => panic!("unexpected stage: {other:?}"),
        }

        match updated.stage(PREPROCESSOR_STAGE).unwrap() {
            Stage::Preprocessor { transformers } => {
                assert_eq!(transformers.len(), 2);
                assert_eq!(transformers[0].role, "cat");
                assert_eq!(transformers[0].columns, ["c1"]);
                assert_eq!(
                    transformers[0].transformer,
                    Transformer::CategoryHasher { n_features: 8 }
                );
                assert_eq!(transformers[1].role, "text");
                assert_eq!(transformers[1].columns, ["t1"]);
                assert_eq!(
                    transformers[1].transformer,
                    Transformer::TokenHasher { n_features: 16 }
                );
            }
            other => panic!("unexpected stage: {other:?}"),
        }
    }

    #[test]
    fn input_pipeline_is_not_modified() {
        let pipeline = fitted_pipeline();
        let before = pipeline.clone();
        let _ = update_pipeline_with_config(&pipeline, &sample_config()).unwrap();
        assert_eq!(pipeline, before);
    }

    #[test]
    fn missing_mapper_stage_is_a_structure_mismatch() {
        let mut pipeline = fitted_pipeline();
        pipeline.stages.remove(0);
        let err = update_pipeline_with_config(&pipeline, &sample_config()).unwrap_err();
        assert!(matches!(err, PredictError::StructureMismatch(_)));
    }

    #[test]
    fn missing_preprocessor_stage_is_a_structure_mismatch() {
        let mut pipeline = fitted_pipeline();
        pipeline.stages.remove(1);
        let err = update_pipeline_with_config(&pipeline, &sample_config()).unwrap_err();
        assert!(matches!(err, PredictError::StructureMismatch(_)));
    }

    #[test]
    fn short_transformer_list_is_a_structure_mismatch() {
        let mut pipeline = fitted_pipeline();
        if let (_, Stage::Preprocessor { transformers }) = &mut pipeline.stages[1] {
            transformers.truncate(1);
        }
        let err = update_pipeline_with_config(&pipeline, &sample_config()).unwrap_err();
        assert!(matches!(err, PredictError::StructureMismatch(_)));
    }
}
