//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;
use estimator_lib::{ResourceKind, UsageEstimate};
use serde_json::json;
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

/// Row for the estimate table
#[derive(Tabled)]
struct EstimateRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Image")]
    image: String,
    #[tabled(rename = "Percentile")]
    percentile: String,
    #[tabled(rename = "Usage")]
    usage: String,
    #[tabled(rename = "Samples")]
    samples: String,
}

/// Print a usage estimate in the selected format
pub fn print_estimate(
    kind: ResourceKind,
    image: &str,
    percentile: i64,
    estimate: &UsageEstimate,
    format: OutputFormat,
) {
    match format {
        OutputFormat::Json => {
            let value = json!({
                "kind": kind,
                "image": image,
                "percentile": percentile,
                "value": estimate.value,
                "samples": estimate.samples,
            });
            if let Ok(json) = serde_json::to_string_pretty(&value) {
                println!("{}", json);
            }
        }
        OutputFormat::Table => {
            let usage = match kind {
                ResourceKind::Cpu => format_cpu(estimate.value),
                ResourceKind::Memory => format_bytes(estimate.value),
            };
            let row = EstimateRow {
                kind: format!("{:?}", kind).to_lowercase(),
                image: image.to_string(),
                percentile: format!("p{}", percentile),
                usage,
                samples: estimate.samples.to_string(),
            };
            let table = Table::new([row]).with(Style::rounded()).to_string();
            println!("{}", table);
        }
    }
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Format a byte count as a human-readable string
pub fn format_bytes(bytes: i64) -> String {
    const KB: i64 = 1024;
    const MB: i64 = KB * 1024;
    const GB: i64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2}Gi", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2}Mi", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2}Ki", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Format millicores as a human-readable string
pub fn format_cpu(millicores: i64) -> String {
    if millicores >= 1000 {
        format!("{:.1}", millicores as f64 / 1000.0)
    } else {
        format!("{}m", millicores)
    }
}
