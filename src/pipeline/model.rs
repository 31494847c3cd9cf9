use std::collections::hash_map::DefaultHasher;
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};

use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};

use crate::data::model::{CellValue, Table};

/// Stage name the reconfigurator looks up for column mapping.
pub const COLUMN_MAPPER_STAGE: &str = "column_mapper";
/// Stage name the reconfigurator looks up for column routing.
pub const PREPROCESSOR_STAGE: &str = "preprocessor";

// ---------------------------------------------------------------------------
// Pipeline – ordered named stages ending in a predictive stage
// ---------------------------------------------------------------------------

/// A fitted prediction pipeline, deserialized from a binary artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub stages: Vec<(String, Stage)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stage {
    /// Renames semantic field names to actual table columns and declares
    /// which columns the rest of the pipeline needs present.
    ColumnMapper {
        column_mapping: BTreeMap<String, String>,
        required_columns: Vec<String>,
    },
    /// Routes column subsets (by role) to independent transformers.
    Preprocessor { transformers: Vec<TransformerEntry> },
    /// Terminal predictive stage.
    Predictor(Predictor),
}

/// One (role, transformer, columns) routing entry of the preprocessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerEntry {
    pub role: String,
    pub transformer: Transformer,
    pub columns: Vec<String>,
}

impl Pipeline {
    /// Look up a stage by name.
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s)
    }

    /// Run the full stage sequence over a cleaned table, producing one
    /// label per row.
    pub fn predict(&self, table: &Table) -> Result<Vec<String>> {
        let mut working = table.clone();
        let mut features: Vec<Vec<f64>> = vec![Vec::new(); table.n_rows()];
        let mut predictions = None;

        for (name, stage) in &self.stages {
            match stage {
                Stage::ColumnMapper {
                    column_mapping,
                    required_columns,
                } => {
                    working = apply_column_mapping(&working, column_mapping);
                    for col in required_columns {
                        if working.column_index(col).is_none() {
                            bail!("stage '{name}': required column '{col}' is missing from the input");
                        }
                    }
                }
                Stage::Preprocessor { transformers } => {
                    for entry in transformers {
                        let indices: Vec<usize> = entry
                            .columns
                            .iter()
                            .map(|col| {
                                working.column_index(col).ok_or_else(|| {
                                    anyhow!(
                                        "stage '{name}': column '{col}' not found for role '{}'",
                                        entry.role
                                    )
                                })
                            })
                            .collect::<Result<_>>()?;

                        for (row_no, row_features) in features.iter_mut().enumerate() {
                            let cells: Vec<CellValue> = indices
                                .iter()
                                .map(|&col| working.cell(row_no, col).clone())
                                .collect();
                            row_features.extend(entry.transformer.encode(&cells));
                        }
                    }
                }
                Stage::Predictor(predictor) => {
                    let labels = features
                        .iter()
                        .map(|f| predictor.predict_row(f))
                        .collect::<Result<Vec<_>>>()?;
                    predictions = Some(labels);
                }
            }
        }

        predictions.ok_or_else(|| anyhow!("pipeline has no predictive stage"))
    }
}

/// Rename input columns that appear as semantic names in the mapping to
/// their mapped actual column names. Unmapped columns pass through.
fn apply_column_mapping(table: &Table, mapping: &BTreeMap<String, String>) -> Table {
    let columns: Vec<String> = table
        .columns()
        .iter()
        .map(|col| mapping.get(col).cloned().unwrap_or_else(|| col.clone()))
        .collect();
    Table::from_parts(columns, table.rows().to_vec())
}

// ---------------------------------------------------------------------------
// Transformer – fitted, column-independent feature encoders
// ---------------------------------------------------------------------------

/// A fitted feature transformer. Encoding depends only on the cell values
/// handed to it, so the same transformer can be re-paired with a different
/// column list without refitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transformer {
    /// One hashed bucket per whole cell value (categorical columns).
    CategoryHasher { n_features: usize },
    /// Hashed bag of lowercase whitespace tokens (text columns).
    TokenHasher { n_features: usize },
}

impl Transformer {
    pub fn n_features(&self) -> usize {
        match self {
            Transformer::CategoryHasher { n_features } | Transformer::TokenHasher { n_features } => {
                *n_features
            }
        }
    }

    /// Encode one row's cells for this transformer's columns into a fixed
    /// width feature block.
    pub fn encode(&self, cells: &[CellValue]) -> Vec<f64> {
        let n = self.n_features();
        let mut features = vec![0.0; n];
        if n == 0 {
            return features;
        }
        match self {
            Transformer::CategoryHasher { .. } => {
                for cell in cells {
                    let text = cell.to_string();
                    if text.is_empty() {
                        continue;
                    }
                    features[bucket(&text, n)] += 1.0;
                }
            }
            Transformer::TokenHasher { .. } => {
                for cell in cells {
                    for token in cell.to_string().split_whitespace() {
                        features[bucket(&token.to_lowercase(), n)] += 1.0;
                    }
                }
            }
        }
        features
    }
}

/// `DefaultHasher::new()` uses fixed keys, so buckets are stable across
/// runs and across artifact round-trips.
fn bucket(text: &str, n: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    (hasher.finish() % n as u64) as usize
}

// ---------------------------------------------------------------------------
// Predictor – linear scorer over the concatenated feature vector
// ---------------------------------------------------------------------------

/// Linear per-class scorer; the class with the highest score wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predictor {
    pub classes: Vec<String>,
    /// One weight row per class, each as long as the full feature vector.
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl Predictor {
    pub fn predict_row(&self, features: &[f64]) -> Result<String> {
        if self.classes.is_empty() {
            bail!("predictor has no classes");
        }
        if self.weights.len() != self.classes.len() {
            bail!(
                "predictor has {} classes but {} weight rows",
                self.classes.len(),
                self.weights.len()
            );
        }

        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (k, class_weights) in self.weights.iter().enumerate() {
            if class_weights.len() != features.len() {
                bail!(
                    "feature vector has {} values but class '{}' expects {}",
                    features.len(),
                    self.classes[k],
                    class_weights.len()
                );
            }
            let score: f64 = class_weights
                .iter()
                .zip(features)
                .map(|(w, x)| w * x)
                .sum::<f64>()
                + self.bias.get(k).copied().unwrap_or(0.0);
            if score > best_score {
                best_score = score;
                best = k;
            }
        }
        Ok(self.classes[best].clone())
    }
}
