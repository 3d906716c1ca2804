//! Structured logging for prediction events
//!
//! Emits consistent `tracing` events for the request pipeline so a JSON
//! subscriber produces one machine-readable line per event.

use crate::error::EnergyError;
use crate::models::{PredictionResult, UsageType};
use crate::store::ModelArtifact;
use tracing::{info, warn};

/// Structured logger for pipeline events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    source: String,
}

impl StructuredLogger {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Log a prediction generation event
    pub fn log_prediction(
        &self,
        usage_type: UsageType,
        result: &PredictionResult,
        model_version: &str,
    ) {
        info!(
            event = "prediction_generated",
            source = %self.source,
            usage_type = %usage_type,
            energy_kbtu = result.energy_kbtu,
            energy_mwh = result.energy_mwh,
            co2_tonnes = result.co2_tonnes,
            eui = result.eui,
            tier = %result.tier,
            model_version = %model_version,
            "Generated energy prediction"
        );
    }

    /// Log a rejected or failed request
    pub fn log_request_error(&self, usage_type: UsageType, error: &EnergyError) {
        match error {
            EnergyError::InvalidInput { field, constraint } => {
                warn!(
                    event = "invalid_input",
                    source = %self.source,
                    usage_type = %usage_type,
                    field = %field,
                    constraint = %constraint,
                    "Building input rejected"
                );
            }
            EnergyError::PredictionFailed(cause) | EnergyError::ModelLoad(cause) => {
                warn!(
                    event = "prediction_failed",
                    source = %self.source,
                    usage_type = %usage_type,
                    error = %error,
                    cause = %format!("{:#}", cause),
                    "Energy prediction failed"
                );
            }
        }
    }

    /// Log a model artifact becoming available
    pub fn log_model_loaded(&self, artifact: &ModelArtifact) {
        info!(
            event = "model_loaded",
            source = %self.source,
            model_version = %artifact.version,
            size_bytes = artifact.size_bytes,
            checksum = %artifact.checksum,
            "ML model loaded"
        );
    }

    /// Log process startup
    pub fn log_startup(&self, version: &str) {
        info!(
            event = "started",
            source = %self.source,
            version = %version,
            "EnergiSight started"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConsumptionTier;

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("cli");
        assert_eq!(logger.source(), "cli");
    }

    #[test]
    fn test_logging_without_subscriber_is_noop() {
        let logger = StructuredLogger::new("test");
        let result = PredictionResult {
            log_prediction: 1.0,
            energy_kbtu: 1.0,
            energy_kwh: 1.0,
            energy_mwh: 0.001,
            co2_tonnes: 0.053,
            eui: 0.1,
            tier: ConsumptionTier::Good,
            savings_potential_kwh: 0.2,
            tree_equivalent: 2,
        };
        logger.log_prediction(UsageType::Office, &result, "v1");
        logger.log_request_error(
            UsageType::Office,
            &EnergyError::invalid("floor_count", "must be at least 1"),
        );
        logger.log_startup("0.1.0");
    }
}
