//! Model inspection commands

use anyhow::{Context, Result};
use colored::Colorize;
use energy_lib::predictor::{OnnxPredictor, NUM_FEATURES};
use energy_lib::{ModelArtifact, StructuredLogger, FEATURE_NAMES};
use serde::Serialize;

use crate::config::Config;
use crate::output::{print_info, print_json, print_success, print_warning, OutputFormat};

/// Published evaluation of the reference model
const REFERENCE_ALGORITHM: &str = "Gradient Boosting";
const REFERENCE_DATASET: &str = "Seattle 2016 building benchmarking";
const REFERENCE_R2: f64 = 0.72;
const REFERENCE_BUILDINGS: u32 = 1620;

#[derive(Serialize)]
struct ModelInfo<'a> {
    version: &'a str,
    path: String,
    checksum: &'a str,
    checksum_verified: bool,
    size_bytes: usize,
    loaded_at: String,
    input_width: usize,
    features: &'static [&'static str],
    algorithm: &'static str,
    dataset: &'static str,
    r2: f64,
    buildings: u32,
}

/// Load the configured model and describe it
pub fn show_info(config: &Config, logger: &StructuredLogger, format: OutputFormat) -> Result<()> {
    let store_config = config.store_config();
    let artifact = ModelArtifact::load(&config.model_path, &store_config)
        .with_context(|| format!("Could not load model {}", config.model_path.display()))?;

    // Parsing proves the graph accepts our input layout
    OnnxPredictor::from_artifact(&artifact)?;
    logger.log_model_loaded(&artifact);

    let loaded_at = chrono::DateTime::from_timestamp(artifact.loaded_at, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| artifact.loaded_at.to_string());

    let info = ModelInfo {
        version: &artifact.version,
        path: artifact.path.display().to_string(),
        checksum: &artifact.checksum,
        checksum_verified: store_config.expected_checksum.is_some(),
        size_bytes: artifact.size_bytes,
        loaded_at,
        input_width: NUM_FEATURES,
        features: &FEATURE_NAMES,
        algorithm: REFERENCE_ALGORITHM,
        dataset: REFERENCE_DATASET,
        r2: REFERENCE_R2,
        buildings: REFERENCE_BUILDINGS,
    };

    match format {
        OutputFormat::Json => print_json(&info)?,
        OutputFormat::Table => print_info_table(&info),
    }

    Ok(())
}

fn print_info_table(info: &ModelInfo<'_>) {
    println!("{}", "Model".bold());
    println!("{}", "=".repeat(50));
    println!("Version:                {}", info.version.cyan());
    println!("Path:                   {}", info.path);
    println!("Size:                   {} bytes", info.size_bytes);
    println!("Loaded:                 {}", info.loaded_at.dimmed());
    println!("SHA-256:                {}", info.checksum);
    println!();

    if info.checksum_verified {
        print_success("Checksum matches configuration");
    } else {
        print_warning("No model_checksum configured; file integrity not verified");
    }
    println!();

    println!("{}", "Features".bold());
    println!("{}", "-".repeat(50));
    for name in info.features {
        println!("  {}", name);
    }
    println!("Input width:            {}", info.input_width);
    println!();

    print_info(&format!(
        "{} trained on {} ({} buildings), R² {:.0}%",
        info.algorithm,
        info.dataset,
        info.buildings,
        info.r2 * 100.0
    ));
}
