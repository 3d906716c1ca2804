//! Usage type listing command

use energy_lib::UsageType;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{print_table, OutputFormat};

/// Row for usage types table
#[derive(Tabled, Serialize)]
struct UsageTypeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Label")]
    label: &'static str,
    #[tabled(rename = "Slug")]
    slug: String,
}

/// List the building usage types the model knows
pub fn list_usage_types(format: OutputFormat) {
    let rows: Vec<UsageTypeRow> = UsageType::ALL
        .iter()
        .map(|t| UsageTypeRow {
            index: t.index() + 1,
            label: t.label(),
            slug: t.slug(),
        })
        .collect();

    print_table(&rows, format);
}
