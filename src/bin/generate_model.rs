//! Generate a sample fitted model artifact plus matching data and config
//! files, so the CLI can be exercised end to end:
//!
//! ```text
//! cargo run --bin generate_model
//! cargo run -- sample_data.csv --config-path sample_config.json
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use tabular_predict::data::model::CellValue;
use tabular_predict::pipeline::artifact::save_model;
use tabular_predict::pipeline::model::{
    Pipeline, Predictor, Stage, Transformer, TransformerEntry, COLUMN_MAPPER_STAGE,
    PREPROCESSOR_STAGE,
};

/// (group, description, label) triples standing in for historical
/// maintenance tickets.
const TRAINING_ROWS: &[(&str, &str, &str)] = &[
    ("electrical", "breaker keeps tripping in the main panel", "urgent"),
    ("electrical", "replace burnt out hallway light bulb", "routine"),
    ("plumbing", "water leaking from ceiling pipe", "urgent"),
    ("plumbing", "faucet drips slowly overnight", "routine"),
    ("hvac", "no heating in the east wing", "urgent"),
    ("hvac", "air filter due for seasonal replacement", "routine"),
    ("electrical", "sparks from wall outlet near desk", "urgent"),
    ("plumbing", "schedule annual boiler inspection", "routine"),
    ("hvac", "thermostat display slightly dim", "routine"),
    ("electrical", "full power outage on second floor", "urgent"),
];

const CATEGORY_FEATURES: usize = 64;
const TEXT_FEATURES: usize = 256;

fn encode_row(cat: &Transformer, text: &Transformer, group: &str, description: &str) -> Vec<f64> {
    let mut features = cat.encode(&[CellValue::String(group.to_string())]);
    features.extend(text.encode(&[CellValue::String(description.to_string())]));
    features
}

/// "Fit" a nearest-centroid linear predictor: each class's weight row is
/// the mean feature vector of its training rows, so the dot product
/// scores similarity to that class.
fn fit_pipeline() -> Pipeline {
    let cat = Transformer::CategoryHasher {
        n_features: CATEGORY_FEATURES,
    };
    let text = Transformer::TokenHasher {
        n_features: TEXT_FEATURES,
    };

    let mut classes: Vec<String> = Vec::new();
    let mut sums: Vec<Vec<f64>> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();

    for &(group, description, label) in TRAINING_ROWS {
        let features = encode_row(&cat, &text, group, description);
        let k = match classes.iter().position(|c| c == label) {
            Some(k) => k,
            None => {
                classes.push(label.to_string());
                sums.push(vec![0.0; features.len()]);
                counts.push(0);
                classes.len() - 1
            }
        };
        for (slot, value) in sums[k].iter_mut().zip(&features) {
            *slot += value;
        }
        counts[k] += 1;
    }

    let weights: Vec<Vec<f64>> = sums
        .into_iter()
        .zip(&counts)
        .map(|(sum, &n)| sum.into_iter().map(|v| v / n as f64).collect())
        .collect();
    let bias = vec![0.0; classes.len()];

    Pipeline {
        stages: vec![
            (
                COLUMN_MAPPER_STAGE.to_string(),
                Stage::ColumnMapper {
                    column_mapping: BTreeMap::from([(
                        "category".to_string(),
                        "group".to_string(),
                    )]),
                    required_columns: vec!["group".to_string(), "description".to_string()],
                },
            ),
            (
                PREPROCESSOR_STAGE.to_string(),
                Stage::Preprocessor {
                    transformers: vec![
                        TransformerEntry {
                            role: "cat".to_string(),
                            transformer: cat,
                            columns: vec!["group".to_string()],
                        },
                        TransformerEntry {
                            role: "text".to_string(),
                            transformer: text,
                            columns: vec!["description".to_string()],
                        },
                    ],
                },
            ),
            (
                "classifier".to_string(),
                Stage::Predictor(Predictor {
                    classes,
                    weights,
                    bias,
                }),
            ),
        ],
    }
}

fn write_sample_data(path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating sample data file")?;
    writer.write_record(["group", "description"])?;
    // Exported spreadsheets carry a numeric id row under the header;
    // the cleaner drops it by default.
    writer.write_record(["0", "1"])?;
    writer.write_record(["plumbing", "pipe burst flooding the basement"])?;
    writer.write_record(["hvac", "replace air filter next month"])?;
    writer.write_record(["electrical", "outlet sparking near the kitchen"])?;
    writer.flush()?;
    Ok(())
}

fn write_sample_config(path: &Path) -> Result<()> {
    let config = serde_json::json!({
        "column_mapping": { "category": "group" },
        "categorical_cols": ["group"],
        "text_cols": ["description"],
    });
    std::fs::write(path, serde_json::to_string_pretty(&config)?)
        .context("writing sample config")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    let pipeline = fit_pipeline();

    std::fs::create_dir_all("models").context("creating models directory")?;
    let model_path = Path::new("models/model_mtp_group.bin");
    save_model(model_path, &pipeline)?;

    let data_path = Path::new("sample_data.csv");
    write_sample_data(data_path)?;

    let config_path = Path::new("sample_config.json");
    write_sample_config(config_path)?;

    println!(
        "Wrote {} ({} training rows, {} classes), {} and {}",
        model_path.display(),
        TRAINING_ROWS.len(),
        match pipeline.stages.last() {
            Some((_, Stage::Predictor(p))) => p.classes.len(),
            _ => 0,
        },
        data_path.display(),
        config_path.display()
    );
    Ok(())
}
