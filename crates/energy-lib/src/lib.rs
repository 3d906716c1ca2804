//! Energy prediction library for building consumption estimates
//!
//! This crate provides the core functionality for:
//! - Validating building characteristics and assembling model features
//! - Loading the trained model artifact once and sharing it
//! - Running inference and deriving energy, carbon and intensity metrics
//! - Structured logging of prediction events

pub mod error;
pub mod models;
pub mod observability;
pub mod pipeline;
pub mod predictor;
pub mod store;
#[cfg(any(test, feature = "test-fixtures"))]
pub mod testing;
pub mod units;

pub use error::{EnergyError, Result};
pub use models::*;
pub use observability::StructuredLogger;
pub use predictor::Predictor;
pub use pipeline::{EnergyPipeline, PredictionReport};
pub use store::{ModelArtifact, SharedModel, StoreConfig};
