//! EnergiSight CLI
//!
//! Estimates a building's annual energy consumption from its physical
//! characteristics with a pre-trained model, and reports carbon, intensity
//! and recommendation figures.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{model, predict, usage};
use energy_lib::{SharedModel, StructuredLogger};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// EnergiSight building energy prediction
#[derive(Parser)]
#[command(name = "energisight")]
#[command(author, version, about = "EnergiSight building energy consumption prediction", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ~/.config/energisight/config.toml)
    #[arg(long, env = "ENERGISIGHT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the ONNX model, overriding the configuration
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict annual energy consumption for a building
    Predict(predict::PredictArgs),

    /// List the building usage types the model accepts
    UsageTypes,

    /// Inspect the model artifact
    #[command(subcommand)]
    Model(ModelCommands),
}

#[derive(Subcommand)]
pub enum ModelCommands {
    /// Show version, checksum and feature layout of the configured model
    Info,
}

fn init_tracing(cli: &Cli, config: &config::Config) {
    let default_level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    match config.log_format {
        config::LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        config::LogFormat::Plain => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = config::Config::load(cli.config.as_deref())?;
    if let Some(path) = &cli.model {
        config.model_path = path.clone();
    }

    init_tracing(&cli, &config);
    debug!(
        config_file = ?cli.config,
        model_path = %config.model_path.display(),
        log_format = ?config.log_format,
        "Configuration resolved"
    );

    let logger = StructuredLogger::new("cli");
    logger.log_startup(CLI_VERSION);

    // Loaded at most once, on the first command that needs it
    let models = SharedModel::new();

    match &cli.command {
        Commands::Predict(args) => {
            predict::predict(args, &config, &models, &logger, cli.format)?;
        }
        Commands::UsageTypes => {
            usage::list_usage_types(cli.format);
        }
        Commands::Model(model_cmd) => match model_cmd {
            ModelCommands::Info => {
                model::show_info(&config, &logger, cli.format)?;
            }
        },
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
