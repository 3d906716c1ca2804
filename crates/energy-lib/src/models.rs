//! Core data models for the prediction pipeline

use crate::error::EnergyError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Primary use of a building, as labelled in the training dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UsageType {
    Office,
    Warehouse,
    K12School,
    RetailStore,
    Hotel,
    WorshipFacility,
    DistributionCenter,
    MixedUseProperty,
    MedicalOffice,
    SelfStorageFacility,
    University,
    SeniorCareCommunity,
    RefrigeratedWarehouse,
    Restaurant,
    Hospital,
    Laboratory,
    Other,
    SupermarketGroceryStore,
    SmallMidSizedOffice,
    LargeOffice,
    ResidenceHall,
}

impl UsageType {
    /// All categories, in the order the model's one-hot block expects
    pub const ALL: [UsageType; 21] = [
        UsageType::Office,
        UsageType::Warehouse,
        UsageType::K12School,
        UsageType::RetailStore,
        UsageType::Hotel,
        UsageType::WorshipFacility,
        UsageType::DistributionCenter,
        UsageType::MixedUseProperty,
        UsageType::MedicalOffice,
        UsageType::SelfStorageFacility,
        UsageType::University,
        UsageType::SeniorCareCommunity,
        UsageType::RefrigeratedWarehouse,
        UsageType::Restaurant,
        UsageType::Hospital,
        UsageType::Laboratory,
        UsageType::Other,
        UsageType::SupermarketGroceryStore,
        UsageType::SmallMidSizedOffice,
        UsageType::LargeOffice,
        UsageType::ResidenceHall,
    ];

    /// Label passed verbatim to the model
    pub fn label(&self) -> &'static str {
        match self {
            UsageType::Office => "Office",
            UsageType::Warehouse => "Warehouse",
            UsageType::K12School => "K-12 School",
            UsageType::RetailStore => "Retail Store",
            UsageType::Hotel => "Hotel",
            UsageType::WorshipFacility => "Worship Facility",
            UsageType::DistributionCenter => "Distribution Center",
            UsageType::MixedUseProperty => "Mixed Use Property",
            UsageType::MedicalOffice => "Medical Office",
            UsageType::SelfStorageFacility => "Self-Storage Facility",
            UsageType::University => "University",
            UsageType::SeniorCareCommunity => "Senior Care Community",
            UsageType::RefrigeratedWarehouse => "Refrigerated Warehouse",
            UsageType::Restaurant => "Restaurant",
            UsageType::Hospital => "Hospital",
            UsageType::Laboratory => "Laboratory",
            UsageType::Other => "Other",
            UsageType::SupermarketGroceryStore => "Supermarket / Grocery Store",
            UsageType::SmallMidSizedOffice => "Small- and Mid-Sized Office",
            UsageType::LargeOffice => "Large Office",
            UsageType::ResidenceHall => "Residence Hall",
        }
    }

    /// Kebab-case form of the label, convenient on a command line
    pub fn slug(&self) -> String {
        slugify(self.label())
    }

    /// Position of this category in [`UsageType::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

impl fmt::Display for UsageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for UsageType {
    type Err = EnergyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        let wanted_slug = slugify(wanted);
        UsageType::ALL
            .iter()
            .copied()
            .find(|t| t.label().eq_ignore_ascii_case(wanted) || t.slug() == wanted_slug)
            .ok_or_else(|| {
                EnergyError::invalid(
                    "usage_type",
                    format!("unknown building usage type '{}'", wanted),
                )
            })
    }
}

impl Serialize for UsageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for UsageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Building characteristics as entered by the user (metric units)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingInput {
    pub usage_type: UsageType,
    pub total_area_m2: f64,
    pub parking_area_m2: f64,
    pub primary_use_area_m2: f64,
    pub floor_count: u32,
    pub building_count: u32,
    pub construction_year: i32,
    pub distance_to_center_km: f64,
}

/// Model-facing projection of a [`BuildingInput`]
///
/// Areas are in square feet, the unit the model was trained on. Serializes
/// to an object keyed by the training column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    #[serde(rename = "PropertyGFATotal")]
    pub total_area_sqft: f64,
    #[serde(rename = "PropertyGFAParking")]
    pub parking_area_sqft: f64,
    #[serde(rename = "NumberofFloors")]
    pub floor_count: u32,
    #[serde(rename = "NumberofBuildings")]
    pub building_count: u32,
    #[serde(rename = "BuildingAge")]
    pub building_age: i32,
    #[serde(rename = "DistanceCentre")]
    pub distance_to_center_km: f64,
    #[serde(rename = "LargestPropertyUseTypeGFA")]
    pub primary_use_area_sqft: f64,
    #[serde(rename = "LargestPropertyUseType")]
    pub usage_type: UsageType,
}

/// Training column names, in model order
pub const FEATURE_NAMES: [&str; 8] = [
    "PropertyGFATotal",
    "PropertyGFAParking",
    "NumberofFloors",
    "NumberofBuildings",
    "BuildingAge",
    "DistanceCentre",
    "LargestPropertyUseTypeGFA",
    "LargestPropertyUseType",
];

/// Single value in a feature mapping
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Number(f64),
    Category(&'static str),
}

impl FeatureRecord {
    /// Flat feature-name to value mapping, in model order
    pub fn entries(&self) -> [(&'static str, FeatureValue); 8] {
        [
            (FEATURE_NAMES[0], FeatureValue::Number(self.total_area_sqft)),
            (FEATURE_NAMES[1], FeatureValue::Number(self.parking_area_sqft)),
            (FEATURE_NAMES[2], FeatureValue::Number(self.floor_count as f64)),
            (FEATURE_NAMES[3], FeatureValue::Number(self.building_count as f64)),
            (FEATURE_NAMES[4], FeatureValue::Number(self.building_age as f64)),
            (FEATURE_NAMES[5], FeatureValue::Number(self.distance_to_center_km)),
            (FEATURE_NAMES[6], FeatureValue::Number(self.primary_use_area_sqft)),
            (FEATURE_NAMES[7], FeatureValue::Category(self.usage_type.label())),
        ]
    }
}

/// Qualitative consumption band derived from the EUI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumptionTier {
    /// EUI above 150: urgent audit
    High,
    /// EUI in (80, 150]: optimization recommended
    Moderate,
    /// EUI at or below 80
    Good,
}

impl ConsumptionTier {
    pub fn label(&self) -> &'static str {
        match self {
            ConsumptionTier::High => "high consumption",
            ConsumptionTier::Moderate => "moderate consumption",
            ConsumptionTier::Good => "good performance",
        }
    }
}

impl fmt::Display for ConsumptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Annual consumption estimate and derived metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Raw model output, ln(1 + kBtu)
    pub log_prediction: f64,
    pub energy_kbtu: f64,
    pub energy_kwh: f64,
    pub energy_mwh: f64,
    pub co2_tonnes: f64,
    /// kBtu per square foot per year
    pub eui: f64,
    pub tier: ConsumptionTier,
    pub savings_potential_kwh: f64,
    pub tree_equivalent: u64,
}
