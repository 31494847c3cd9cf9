use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use tabular_predict::data::clean::{preprocess, CleanOptions, FirstRowPolicy};
use tabular_predict::data::loader::load_table;
use tabular_predict::error::PredictError;
use tabular_predict::pipeline::artifact::load_model;
use tabular_predict::pipeline::config::load_config;
use tabular_predict::pipeline::reconfigure::update_pipeline_with_config;

/// Run a pre-trained prediction pipeline over a tabular data file.
#[derive(Parser, Debug)]
#[command(name = "tabular-predict", version)]
struct Cli {
    /// Path to the data file (.xlsx or .csv)
    data_path: PathBuf,

    /// Path to the serialized model artifact
    #[arg(long, default_value = "models/model_mtp_group.bin")]
    model_path: PathBuf,

    /// Optional pipeline config (JSON); when given, the column-mapper and
    /// preprocessor stages are rebuilt around the configured columns
    #[arg(long)]
    config_path: Option<PathBuf>,

    /// Drop columns whose share of missing values exceeds this percentage
    #[arg(long, default_value_t = 99.0)]
    threshold_percent: f64,

    /// Keep the first data row instead of dropping it
    #[arg(long)]
    keep_first_row: bool,

    /// How to decide whether the first data row is dropped
    #[arg(long, value_enum, default_value = "unconditional")]
    first_row_policy: FirstRowPolicy,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let predictions = run(&cli)?;
    for label in &predictions {
        println!("{label}");
    }
    Ok(())
}

/// Load → clean → load model → (optionally) reconfigure → predict.
fn run(cli: &Cli) -> Result<Vec<String>> {
    log::info!("loading data from {}", cli.data_path.display());
    let table = load_table(&cli.data_path)?;
    log::info!("loaded {} rows x {} columns", table.n_rows(), table.n_cols());

    let opts = CleanOptions {
        threshold_percent: cli.threshold_percent,
        drop_first_row: !cli.keep_first_row,
        first_row_policy: cli.first_row_policy,
    };
    let table = preprocess(&table, &opts)?;
    log::info!(
        "cleaned to {} rows x {} columns",
        table.n_rows(),
        table.n_cols()
    );

    let mut model = load_model(&cli.model_path)?;

    if let Some(config_path) = &cli.config_path {
        let config = load_config(config_path)?;
        model = update_pipeline_with_config(&model, &config)?;
        log::info!("pipeline reconfigured from {}", config_path.display());
    }

    let predictions = model
        .predict(&table)
        .map_err(PredictError::Prediction)?;
    Ok(predictions)
}
