//! ML prediction engine

mod features;
mod inference;
mod output;


pub use features::{
    assemble, InputAssembler, MAX_CONSTRUCTION_YEAR, MIN_CONSTRUCTION_YEAR, REFERENCE_YEAR,
};
pub use inference::{
    encode_features, InferenceStats, OnnxPredictor, NUM_FEATURES, NUM_NUMERIC_FEATURES,
};
pub use output::{
    derive, tier_for_eui, PredictionDeriver, HIGH_EUI_THRESHOLD, MODERATE_EUI_THRESHOLD,
    SAVINGS_SCENARIO_FACTOR,
};

use crate::models::FeatureRecord;
use anyhow::Result;

/// Trait for trained model implementations
pub trait Predictor: Send + Sync {
    /// Raw model output for one building, ln(1 + annual kBtu)
    fn predict(&self, features: &FeatureRecord) -> Result<f64>;

    /// Get current model version
    fn model_version(&self) -> &str;
}
