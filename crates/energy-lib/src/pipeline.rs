//! Single-shot request pipeline: assemble, predict, derive

use crate::error::Result;
use crate::models::{BuildingInput, FeatureRecord, PredictionResult};
use crate::observability::StructuredLogger;
use crate::predictor::{InputAssembler, PredictionDeriver, Predictor};
use serde::Serialize;
use std::sync::Arc;

/// Everything produced for one request
#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub input: BuildingInput,
    pub features: FeatureRecord,
    pub prediction: PredictionResult,
    pub model_version: String,
}

/// Runs building inputs through a shared, read-only model
pub struct EnergyPipeline {
    model: Arc<dyn Predictor>,
    assembler: InputAssembler,
    deriver: PredictionDeriver,
    logger: StructuredLogger,
}

impl EnergyPipeline {
    pub fn new(model: Arc<dyn Predictor>) -> Self {
        Self {
            model,
            assembler: InputAssembler::new(),
            deriver: PredictionDeriver::new(),
            logger: StructuredLogger::new("pipeline"),
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn model_version(&self) -> &str {
        self.model.model_version()
    }

    pub fn run(&self, input: &BuildingInput) -> Result<PredictionReport> {
        let outcome = self.assembler.assemble(input).and_then(|features| {
            let prediction = self.deriver.derive(&features, self.model.as_ref())?;
            Ok((features, prediction))
        });

        match outcome {
            Ok((features, prediction)) => {
                self.logger
                    .log_prediction(input.usage_type, &prediction, self.model_version());
                Ok(PredictionReport {
                    input: input.clone(),
                    features,
                    prediction,
                    model_version: self.model_version().to_string(),
                })
            }
            Err(e) => {
                self.logger.log_request_error(input.usage_type, &e);
                Err(e)
            }
        }
    }
}
