//! Output formatting utilities

use clap::ValueEnum;
use colored::{ColoredString, Colorize};
use energy_lib::ConsumptionTier;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Upper end of the EUI gauge (kBtu/sqft/year)
pub const GAUGE_MAX: f64 = 300.0;

/// Gauge band where consumption is low
pub const GAUGE_LOW_BAND_END: f64 = 50.0;

/// Gauge band end for moderate consumption; also the alert threshold
pub const GAUGE_THRESHOLD: f64 = 150.0;

/// Print a table from a list of items
pub fn print_table<T: Tabled + Serialize>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("{}", "No items found".yellow());
                return;
            }
            let table = Table::new(items).with(Style::rounded()).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(&items) {
                println!("{}", json);
            }
        }
    }
}

/// Print a JSON document
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format a number with no decimals and thousands separators
pub fn format_number(value: f64) -> String {
    let rounded = format!("{:.0}", value);
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rounded.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if grouped == "0" {
        return grouped;
    }
    format!("{}{}", sign, grouped)
}

/// Format an integer count with thousands separators
pub fn format_count(value: u64) -> String {
    format_number(value as f64)
}

/// Color text according to a consumption tier
pub fn color_tier(text: &str, tier: ConsumptionTier) -> ColoredString {
    match tier {
        ConsumptionTier::High => text.red(),
        ConsumptionTier::Moderate => text.yellow(),
        ConsumptionTier::Good => text.green(),
    }
}

/// Cell index of `value` on a gauge `width` cells wide
pub fn gauge_position(value: f64, max: f64, width: usize) -> usize {
    if width == 0 || max <= 0.0 {
        return 0;
    }
    let ratio = if value.is_finite() {
        value.clamp(0.0, max) / max
    } else {
        0.0
    };
    (ratio * (width - 1) as f64).round() as usize
}

/// Render the EUI gauge with a marker at `eui`
pub fn render_gauge(eui: f64, width: usize) -> String {
    let marker = gauge_position(eui, GAUGE_MAX, width);
    let threshold = gauge_position(GAUGE_THRESHOLD, GAUGE_MAX, width);

    let bar: String = (0..width)
        .map(|i| {
            let cell_value = (i as f64 + 0.5) / width as f64 * GAUGE_MAX;
            let glyph = if i == marker {
                "●"
            } else if i == threshold {
                "┃"
            } else {
                "━"
            };
            let cell = if cell_value < GAUGE_LOW_BAND_END {
                glyph.green()
            } else if cell_value < GAUGE_THRESHOLD {
                glyph.yellow()
            } else {
                glyph.red()
            };
            cell.to_string()
        })
        .collect();

    format!("0 {} {}", bar, GAUGE_MAX)
}
