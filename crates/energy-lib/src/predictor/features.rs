//! Feature assembly for ML inference
//!
//! Validates raw building characteristics and projects them onto the
//! feature layout the model was trained on: areas in square feet and the
//! building age relative to the dataset's collection year.

use crate::error::{EnergyError, Result};
use crate::models::{BuildingInput, FeatureRecord};
use crate::units::m2_to_sqft;

/// Collection year of the training dataset.
///
/// Building age is measured against this year, not the current date. Do not
/// replace with the current time: the model only knows 2016 ages.
pub const REFERENCE_YEAR: i32 = 2016;

/// Oldest construction year present in the training data
pub const MIN_CONSTRUCTION_YEAR: i32 = 1900;

/// Newest construction year accepted
pub const MAX_CONSTRUCTION_YEAR: i32 = REFERENCE_YEAR;

/// Validates building input and builds model features
#[derive(Debug, Clone, Copy, Default)]
pub struct InputAssembler;

impl InputAssembler {
    pub fn new() -> Self {
        Self
    }

    pub fn assemble(&self, raw: &BuildingInput) -> Result<FeatureRecord> {
        self.validate(raw)?;

        Ok(FeatureRecord {
            total_area_sqft: m2_to_sqft(raw.total_area_m2),
            parking_area_sqft: m2_to_sqft(raw.parking_area_m2),
            floor_count: raw.floor_count,
            building_count: raw.building_count,
            building_age: REFERENCE_YEAR - raw.construction_year,
            distance_to_center_km: raw.distance_to_center_km,
            primary_use_area_sqft: m2_to_sqft(raw.primary_use_area_m2),
            usage_type: raw.usage_type,
        })
    }

    /// Check every field constraint, reporting the first violation
    pub fn validate(&self, raw: &BuildingInput) -> Result<()> {
        positive("total_area_m2", raw.total_area_m2)?;
        non_negative("parking_area_m2", raw.parking_area_m2)?;
        positive("primary_use_area_m2", raw.primary_use_area_m2)?;
        if raw.primary_use_area_m2 > raw.total_area_m2 {
            return Err(EnergyError::invalid(
                "primary_use_area_m2",
                format!(
                    "must not exceed total_area_m2 ({} > {})",
                    raw.primary_use_area_m2, raw.total_area_m2
                ),
            ));
        }
        if raw.floor_count < 1 {
            return Err(EnergyError::invalid("floor_count", "must be at least 1"));
        }
        if raw.building_count < 1 {
            return Err(EnergyError::invalid("building_count", "must be at least 1"));
        }
        if !(MIN_CONSTRUCTION_YEAR..=MAX_CONSTRUCTION_YEAR).contains(&raw.construction_year) {
            return Err(EnergyError::invalid(
                "construction_year",
                format!(
                    "must be within {}..={}, got {}",
                    MIN_CONSTRUCTION_YEAR, MAX_CONSTRUCTION_YEAR, raw.construction_year
                ),
            ));
        }
        non_negative("distance_to_center_km", raw.distance_to_center_km)?;
        Ok(())
    }
}

/// Assemble with the default assembler
pub fn assemble(raw: &BuildingInput) -> Result<FeatureRecord> {
    InputAssembler::new().assemble(raw)
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EnergyError::invalid(
            field,
            format!("must be a finite number greater than 0, got {}", value),
        ));
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(EnergyError::invalid(
            field,
            format!("must be a finite number of at least 0, got {}", value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UsageType;

    fn office() -> BuildingInput {
        BuildingInput {
            usage_type: UsageType::Office,
            total_area_m2: 5000.0,
            parking_area_m2: 500.0,
            primary_use_area_m2: 4000.0,
            floor_count: 5,
            building_count: 1,
            construction_year: 1990,
            distance_to_center_km: 3.0,
        }
    }

    #[test]
    fn test_assemble_reference_office() {
        let record = assemble(&office()).unwrap();
        assert_eq!(record.building_age, 26);
        assert!((record.total_area_sqft - 53_819.5).abs() < 1e-6);
        assert!((record.parking_area_sqft - 5_381.95).abs() < 1e-6);
        assert!((record.primary_use_area_sqft - 43_055.6).abs() < 1e-6);
        assert_eq!(record.floor_count, 5);
        assert_eq!(record.building_count, 1);
        assert_eq!(record.distance_to_center_km, 3.0);
        assert_eq!(record.usage_type, UsageType::Office);
    }

    #[test]
    fn test_building_age_uses_reference_year() {
        for year in [MIN_CONSTRUCTION_YEAR, 1950, 2000, MAX_CONSTRUCTION_YEAR] {
            let input = BuildingInput {
                construction_year: year,
                ..office()
            };
            assert_eq!(assemble(&input).unwrap().building_age, 2016 - year);
        }
    }

    #[test]
    fn test_zero_parking_is_allowed() {
        let input = BuildingInput {
            parking_area_m2: 0.0,
            ..office()
        };
        assert_eq!(assemble(&input).unwrap().parking_area_sqft, 0.0);
    }

    #[test]
    fn test_invalid_fields_are_named() {
        let cases: Vec<(BuildingInput, &str)> = vec![
            (BuildingInput { total_area_m2: 0.0, ..office() }, "total_area_m2"),
            (BuildingInput { total_area_m2: f64::NAN, ..office() }, "total_area_m2"),
            (BuildingInput { parking_area_m2: -1.0, ..office() }, "parking_area_m2"),
            (BuildingInput { primary_use_area_m2: -5.0, ..office() }, "primary_use_area_m2"),
            (BuildingInput { primary_use_area_m2: 6000.0, ..office() }, "primary_use_area_m2"),
            (BuildingInput { floor_count: 0, ..office() }, "floor_count"),
            (BuildingInput { building_count: 0, ..office() }, "building_count"),
            (BuildingInput { construction_year: 1899, ..office() }, "construction_year"),
            (BuildingInput { construction_year: 2017, ..office() }, "construction_year"),
            (BuildingInput { distance_to_center_km: -0.1, ..office() }, "distance_to_center_km"),
            (
                BuildingInput { distance_to_center_km: f64::INFINITY, ..office() },
                "distance_to_center_km",
            ),
        ];

        for (input, field) in cases {
            match assemble(&input) {
                Err(EnergyError::InvalidInput { field: got, .. }) => {
                    assert_eq!(got, field, "wrong field for {:?}", input)
                }
                other => panic!("expected InvalidInput on {}, got {:?}", field, other),
            }
        }
    }
}
