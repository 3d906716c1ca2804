//! Prediction output derivation
//!
//! Turns the raw log-space model output into annual energy in several
//! units, a carbon estimate, energy use intensity and a consumption tier.

use super::Predictor;
use crate::error::{EnergyError, Result};
use crate::models::{ConsumptionTier, FeatureRecord, PredictionResult};
use crate::units::{kbtu_to_co2_tonnes, kbtu_to_kwh, kwh_to_mwh, tree_equivalent};
use tracing::debug;

/// EUI above which consumption is considered high (kBtu/sqft/year)
pub const HIGH_EUI_THRESHOLD: f64 = 150.0;

/// EUI above which optimization is recommended (kBtu/sqft/year)
pub const MODERATE_EUI_THRESHOLD: f64 = 80.0;

/// Share of consumption saved in the flat improvement scenario
pub const SAVINGS_SCENARIO_FACTOR: f64 = 0.20;

/// Derives a [`PredictionResult`] from a model invocation
#[derive(Debug, Clone, Copy, Default)]
pub struct PredictionDeriver;

impl PredictionDeriver {
    pub fn new() -> Self {
        Self
    }

    pub fn derive(&self, record: &FeatureRecord, model: &dyn Predictor) -> Result<PredictionResult> {
        let log_prediction = model
            .predict(record)
            .map_err(EnergyError::PredictionFailed)?;
        self.from_log_prediction(record, log_prediction)
    }

    /// Derive metrics from an already obtained log-space prediction
    pub fn from_log_prediction(
        &self,
        record: &FeatureRecord,
        log_prediction: f64,
    ) -> Result<PredictionResult> {
        if !log_prediction.is_finite() {
            return Err(EnergyError::PredictionFailed(anyhow::anyhow!(
                "model returned a non-finite value: {}",
                log_prediction
            )));
        }

        // Model was trained on ln(1 + kBtu)
        let energy_kbtu = log_prediction.exp_m1();
        if !energy_kbtu.is_finite() {
            return Err(EnergyError::PredictionFailed(anyhow::anyhow!(
                "model output {} overflows when converted to kBtu",
                log_prediction
            )));
        }

        let energy_kwh = kbtu_to_kwh(energy_kbtu);
        let energy_mwh = kwh_to_mwh(energy_kwh);
        let co2_tonnes = kbtu_to_co2_tonnes(energy_kbtu);
        let eui = energy_use_intensity(energy_kbtu, record.total_area_sqft);
        let tier = tier_for_eui(eui);

        debug!(
            log_prediction,
            energy_kbtu,
            eui,
            tier = %tier,
            "Derived prediction metrics"
        );

        Ok(PredictionResult {
            log_prediction,
            energy_kbtu,
            energy_kwh,
            energy_mwh,
            co2_tonnes,
            eui,
            tier,
            savings_potential_kwh: energy_kwh * SAVINGS_SCENARIO_FACTOR,
            tree_equivalent: tree_equivalent(co2_tonnes),
        })
    }
}

/// Derive with the default deriver
pub fn derive(record: &FeatureRecord, model: &dyn Predictor) -> Result<PredictionResult> {
    PredictionDeriver::new().derive(record, model)
}

/// Energy per square foot; zero when the area is not positive
fn energy_use_intensity(energy_kbtu: f64, total_area_sqft: f64) -> f64 {
    if total_area_sqft <= 0.0 {
        return 0.0;
    }
    energy_kbtu / total_area_sqft
}

/// Map an EUI onto its consumption band
pub fn tier_for_eui(eui: f64) -> ConsumptionTier {
    if eui > HIGH_EUI_THRESHOLD {
        ConsumptionTier::High
    } else if eui > MODERATE_EUI_THRESHOLD {
        ConsumptionTier::Moderate
    } else {
        ConsumptionTier::Good
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_for_eui(150.0001), ConsumptionTier::High);
        assert_eq!(tier_for_eui(150.0), ConsumptionTier::Moderate);
        assert_eq!(tier_for_eui(80.0001), ConsumptionTier::Moderate);
        assert_eq!(tier_for_eui(80.0), ConsumptionTier::Good);
        assert_eq!(tier_for_eui(0.0), ConsumptionTier::Good);
        assert_eq!(tier_for_eui(1_000.0), ConsumptionTier::High);
    }

    #[test]
    fn test_eui_guard_on_zero_area() {
        assert_eq!(energy_use_intensity(10_000.0, 0.0), 0.0);
        assert_eq!(energy_use_intensity(10_000.0, -5.0), 0.0);
        assert!((energy_use_intensity(10_000.0, 100.0) - 100.0).abs() < 1e-12);
    }
}
