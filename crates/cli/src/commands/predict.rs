//! Energy prediction command

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use energy_lib::predictor::{InputAssembler, MIN_CONSTRUCTION_YEAR, REFERENCE_YEAR};
use energy_lib::{
    BuildingInput, ConsumptionTier, EnergyPipeline, PredictionReport, SharedModel,
    StructuredLogger, UsageType,
};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};
use tracing::debug;

use crate::config::Config;
use crate::output::{color_tier, format_count, format_number, print_json, render_gauge, OutputFormat};

/// Width of the EUI gauge in cells
const GAUGE_WIDTH: usize = 31;

/// Building characteristics, bounded like the prediction form
#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    /// Primary use of the building (label or slug, see `usage-types`)
    #[arg(long, default_value = "Office")]
    pub usage_type: UsageType,

    /// Total gross floor area in m² (100 - 500000)
    #[arg(long, default_value_t = 5000.0, value_parser = parse_total_area)]
    pub total_area: f64,

    /// Parking area in m² (0 - 100000)
    #[arg(long, default_value_t = 500.0, value_parser = parse_parking_area)]
    pub parking_area: f64,

    /// Floor area of the primary use in m² (100 - 500000)
    #[arg(long, default_value_t = 4000.0, value_parser = parse_primary_use_area)]
    pub primary_use_area: f64,

    /// Number of floors (1 - 50)
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub floors: u32,

    /// Number of buildings on the property (1 - 20)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=20))]
    pub buildings: u32,

    /// Year of construction (1900 - 2016)
    #[arg(long, default_value_t = 1990, value_parser = clap::value_parser!(i32).range(1900..=2016))]
    pub year: i32,

    /// Distance to the city centre in km (0 - 20)
    #[arg(long, default_value_t = 3.0, value_parser = parse_distance)]
    pub distance: f64,
}

impl PredictArgs {
    pub fn to_input(&self) -> BuildingInput {
        BuildingInput {
            usage_type: self.usage_type,
            total_area_m2: self.total_area,
            parking_area_m2: self.parking_area,
            primary_use_area_m2: self.primary_use_area,
            floor_count: self.floors,
            building_count: self.buildings,
            construction_year: self.year,
            distance_to_center_km: self.distance,
        }
    }
}

fn parse_bounded(s: &str, min: f64, max: f64) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", s))?;
    if !(min..=max).contains(&value) {
        return Err(format!("{} is not in {}..={}", value, min, max));
    }
    Ok(value)
}

fn parse_total_area(s: &str) -> Result<f64, String> {
    parse_bounded(s, 100.0, 500_000.0)
}

fn parse_parking_area(s: &str) -> Result<f64, String> {
    parse_bounded(s, 0.0, 100_000.0)
}

fn parse_primary_use_area(s: &str) -> Result<f64, String> {
    parse_bounded(s, 100.0, 500_000.0)
}

fn parse_distance(s: &str) -> Result<f64, String> {
    parse_bounded(s, 0.0, 20.0)
}

/// Building shape normalized to 0-100 on five axes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingProfile {
    pub surface: f64,
    pub floors: f64,
    pub age: f64,
    pub distance: f64,
    pub usage_share: f64,
}

impl BuildingProfile {
    pub fn from_input(input: &BuildingInput) -> Self {
        let age = (REFERENCE_YEAR - input.construction_year) as f64;
        let max_age = (REFERENCE_YEAR - MIN_CONSTRUCTION_YEAR) as f64;
        let usage_share = if input.total_area_m2 > 0.0 {
            input.primary_use_area_m2 / input.total_area_m2 * 100.0
        } else {
            50.0
        };

        Self {
            surface: capped(input.total_area_m2 / 5000.0 * 100.0),
            floors: capped(input.floor_count as f64 / 50.0 * 100.0),
            age: capped(age / max_age * 100.0),
            distance: capped(input.distance_to_center_km / 14.0 * 100.0),
            usage_share: capped(usage_share),
        }
    }

    fn axes(&self) -> [(&'static str, f64); 5] {
        [
            ("Surface", self.surface),
            ("Floors", self.floors),
            ("Age", self.age),
            ("Distance", self.distance),
            ("Usage", self.usage_share),
        ]
    }
}

fn capped(value: f64) -> f64 {
    value.min(100.0)
}

/// Headline and advice for a consumption tier
pub fn recommendation(tier: ConsumptionTier) -> (&'static str, &'static str) {
    match tier {
        ConsumptionTier::High => (
            "High consumption",
            "Urgent energy audit recommended. Review insulation and HVAC systems.",
        ),
        ConsumptionTier::Moderate => (
            "Moderate consumption",
            "Optimization possible. LED lighting and smart building management recommended.",
        ),
        ConsumptionTier::Good => (
            "Good performance",
            "Efficient building. Keep current practices in place.",
        ),
    }
}

/// JSON document for one prediction
#[derive(Serialize)]
struct PredictOutput<'a> {
    generated_at: String,
    #[serde(flatten)]
    report: &'a PredictionReport,
    profile: BuildingProfile,
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Run one prediction and print the report
pub fn predict(
    args: &PredictArgs,
    config: &Config,
    models: &SharedModel,
    logger: &StructuredLogger,
    format: OutputFormat,
) -> Result<()> {
    let input = args.to_input();

    // Reject bad input before paying for a model load
    InputAssembler::new()
        .validate(&input)
        .context("Building characteristics rejected")?;

    debug!(usage_type = %input.usage_type, "Building input accepted");
    let model = models
        .get_or_load_onnx(&config.model_path, &config.store_config())
        .with_context(|| format!("Could not load model {}", config.model_path.display()))?;

    let pipeline = EnergyPipeline::new(model).with_logger(logger.clone());
    let report = pipeline.run(&input).context("Prediction failed")?;
    let profile = BuildingProfile::from_input(&input);

    match format {
        OutputFormat::Json => print_json(&PredictOutput {
            generated_at: chrono::Utc::now().to_rfc3339(),
            report: &report,
            profile,
        })?,
        OutputFormat::Table => print_report(&report, &profile),
    }

    Ok(())
}

fn print_report(report: &PredictionReport, profile: &BuildingProfile) {
    let p = &report.prediction;

    println!("{}", "EnergiSight Prediction".bold());
    println!("{}", "=".repeat(50));
    println!(
        "Building:               {} ({} m²)",
        report.input.usage_type.to_string().cyan(),
        format_number(report.input.total_area_m2)
    );
    println!();
    println!(
        "{} {}",
        "Annual consumption:".bold(),
        format!("{} MWh", format_number(p.energy_mwh)).green().bold()
    );
    println!("                        {} kWh / year", format_number(p.energy_kwh));
    println!();

    let rows = vec![
        MetricRow {
            metric: "Energy (kBtu/year)".to_string(),
            value: format_number(p.energy_kbtu),
        },
        MetricRow {
            metric: "CO₂ (tonnes/year)".to_string(),
            value: format_number(p.co2_tonnes),
        },
        MetricRow {
            metric: "EUI (kBtu/sqft/year)".to_string(),
            value: format!("{:.1}", p.eui),
        },
        MetricRow {
            metric: "Building age (years)".to_string(),
            value: report.features.building_age.to_string(),
        },
    ];
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);
    println!();

    println!("{}", "Consumption Level".bold());
    println!("{}", "-".repeat(50));
    println!("{}", render_gauge(p.eui, GAUGE_WIDTH));
    println!();

    println!("{}", "Building Profile".bold());
    println!("{}", "-".repeat(50));
    for (axis, value) in profile.axes() {
        let filled = (value / 5.0).round() as usize;
        println!(
            "{:<10} {:<20} {:>5.1}",
            axis,
            "█".repeat(filled).cyan(),
            value
        );
    }
    println!();

    println!("{}", "Recommendations".bold());
    println!("{}", "-".repeat(50));
    let (title, advice) = recommendation(p.tier);
    println!("{} {}", color_tier("●", p.tier), color_tier(title, p.tier).bold());
    println!("  {}", advice);
    println!();
    println!("{}", "Savings potential".bold());
    println!(
        "  With 20% optimization: {} kWh/year saved",
        format_number(p.savings_potential_kwh).green()
    );
    println!();
    println!("{}", "Carbon equivalent".bold());
    println!(
        "  {} tonnes CO₂/year ≈ {} trees to plant",
        format_number(p.co2_tonnes),
        format_count(p.tree_equivalent).green()
    );
    println!();
    println!("Model: {}", report.model_version.dimmed());
}
