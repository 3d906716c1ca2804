//! ONNX inference using tract
//!
//! Runs the exported regression model. The usage type is one-hot encoded
//! here, at the model boundary, so the rest of the pipeline only ever sees
//! the plain label.

use super::Predictor;
use crate::models::{FeatureRecord, UsageType};
use crate::store::ModelArtifact;
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Numeric columns ahead of the one-hot usage block
pub const NUM_NUMERIC_FEATURES: usize = 7;

/// Number of input features expected by the model
pub const NUM_FEATURES: usize = NUM_NUMERIC_FEATURES + UsageType::ALL.len();

/// Maximum inference latency before warning
const MAX_INFERENCE_MS: u128 = 50;

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX-based predictor using tract for lightweight inference
pub struct OnnxPredictor {
    model: TractModel,
    model_version: String,
    inference_count: AtomicU64,
    slow_inference_count: AtomicU64,
}

impl OnnxPredictor {
    /// Create a new predictor from model bytes
    pub fn new(model_bytes: &[u8], model_version: impl Into<String>) -> Result<Self> {
        let model = Self::load_model(model_bytes)?;
        Ok(Self {
            model,
            model_version: model_version.into(),
            inference_count: AtomicU64::new(0),
            slow_inference_count: AtomicU64::new(0),
        })
    }

    /// Create a predictor from a verified artifact
    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self> {
        Self::new(&artifact.bytes, artifact.version.clone())
            .with_context(|| format!("Failed to build predictor from {}", artifact.path.display()))
    }

    /// Load and optimize an ONNX model from bytes
    fn load_model(model_bytes: &[u8]) -> Result<TractModel> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?
            .with_input_fact(0, f32::fact([1, NUM_FEATURES]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(model)
    }

    /// Convert a feature record to the model's input tensor
    fn features_to_tensor(&self, features: &FeatureRecord) -> Result<Tensor> {
        let data = encode_features(features);
        let array = tract_ndarray::Array2::from_shape_vec((1, NUM_FEATURES), data)
            .context("Feature vector does not match model input shape")?;
        Ok(array.into())
    }

    /// Get inference statistics
    pub fn stats(&self) -> InferenceStats {
        InferenceStats {
            total_inferences: self.inference_count.load(Ordering::Relaxed),
            slow_inferences: self.slow_inference_count.load(Ordering::Relaxed),
        }
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&self, features: &FeatureRecord) -> Result<f64> {
        let start = Instant::now();

        let input = self.features_to_tensor(features)?;
        let result = self
            .model
            .run(tvec!(input.into()))
            .context("Model execution failed")?;
        let output = result.first().context("No output from model")?;

        let elapsed = start.elapsed();
        self.inference_count.fetch_add(1, Ordering::Relaxed);

        if elapsed.as_millis() > MAX_INFERENCE_MS {
            self.slow_inference_count.fetch_add(1, Ordering::Relaxed);
            warn!(elapsed_ms = elapsed.as_millis() as u64, "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros() as u64, "Inference completed");
        }

        tensor_to_value(output)
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }
}

/// Extract the single regression output
fn tensor_to_value(output: &Tensor) -> Result<f64> {
    let output_view = output
        .to_array_view::<f32>()
        .context("Model output is not an f32 tensor")?;
    let values: Vec<f32> = output_view.iter().copied().collect();

    match values.as_slice() {
        [value] => Ok(*value as f64),
        _ => anyhow::bail!("Model output has {} values, expected 1", values.len()),
    }
}

/// Flatten a record into the model's numeric input row
///
/// Layout: the seven numeric features in training order, then one slot per
/// [`UsageType`] with 1.0 at the building's category.
pub fn encode_features(features: &FeatureRecord) -> Vec<f32> {
    let mut data = Vec::with_capacity(NUM_FEATURES);
    data.extend_from_slice(&[
        features.total_area_sqft as f32,
        features.parking_area_sqft as f32,
        features.floor_count as f32,
        features.building_count as f32,
        features.building_age as f32,
        features.distance_to_center_km as f32,
        features.primary_use_area_sqft as f32,
    ]);
    data.extend(UsageType::ALL.iter().map(|t| {
        if *t == features.usage_type {
            1.0
        } else {
            0.0
        }
    }));
    data
}

/// Inference statistics
#[derive(Debug, Clone)]
pub struct InferenceStats {
    pub total_inferences: u64,
    pub slow_inferences: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn record(usage_type: UsageType) -> FeatureRecord {
        FeatureRecord {
            total_area_sqft: 53_819.5,
            parking_area_sqft: 5_381.95,
            floor_count: 5,
            building_count: 1,
            building_age: 26,
            distance_to_center_km: 3.0,
            primary_use_area_sqft: 43_055.6,
            usage_type,
        }
    }

    #[test]
    fn test_encoding_width_and_numeric_prefix() {
        let data = encode_features(&record(UsageType::Office));
        assert_eq!(data.len(), NUM_FEATURES);
        assert_eq!(NUM_FEATURES, 28);
        assert_eq!(data[2], 5.0);
        assert_eq!(data[4], 26.0);
        assert_eq!(data[5], 3.0);
    }

    #[test]
    fn test_one_hot_block() {
        for t in UsageType::ALL {
            let data = encode_features(&record(t));
            let block = &data[NUM_NUMERIC_FEATURES..];
            assert_eq!(block.iter().sum::<f32>(), 1.0);
            assert_eq!(block[t.index()], 1.0);
        }
    }

    #[test]
    fn test_invalid_model_bytes_rejected() {
        assert!(OnnxPredictor::new(b"definitely not onnx", "v0").is_err());
    }

    #[test]
    fn test_tensor_to_value_requires_single_f32() {
        assert_eq!(tensor_to_value(&tensor1(&[1.5f32])).unwrap(), 1.5);
        assert_eq!(tensor_to_value(&tensor2(&[[2.5f32]])).unwrap(), 2.5);

        let err = tensor_to_value(&tensor1(&[1.0f32, 2.0])).unwrap_err();
        assert!(err.to_string().contains("2 values"), "{}", err);
        assert!(tensor_to_value(&tensor1(&[0.0f32; 0])).is_err());
        assert!(tensor_to_value(&tensor1(&[1i64])).is_err());
    }

    #[test]
    fn test_onnx_model_runs_on_encoded_features() {
        let predictor = OnnxPredictor::new(&testing::reference_model_bytes(), "linear").unwrap();
        assert_eq!(predictor.model_version(), "linear");

        let office = predictor.predict(&record(UsageType::Office)).unwrap();
        assert!((office - 10.0).abs() < 1e-5, "office: {}", office);

        let hotel = predictor.predict(&record(UsageType::Hotel)).unwrap();
        assert!((hotel - 11.0).abs() < 1e-5, "hotel: {}", hotel);
    }

    #[test]
    fn test_inference_stats_count_runs() {
        let predictor = OnnxPredictor::new(&testing::reference_model_bytes(), "linear").unwrap();
        assert_eq!(predictor.stats().total_inferences, 0);

        for _ in 0..3 {
            predictor.predict(&record(UsageType::Office)).unwrap();
        }
        let stats = predictor.stats();
        assert_eq!(stats.total_inferences, 3);
        assert!(stats.slow_inferences <= stats.total_inferences);
    }

    #[test]
    fn test_multi_output_model_rejected_at_predict() {
        let bytes = testing::linear_model_bytes(&vec![0.0; NUM_FEATURES * 2], &[1.0, 2.0]);
        let predictor = OnnxPredictor::new(&bytes, "wide").unwrap();
        let err = predictor.predict(&record(UsageType::Office)).unwrap_err();
        assert!(err.to_string().contains("expected 1"), "{}", err);
    }
}
