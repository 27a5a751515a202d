#![warn(missing_docs)]
//! Blocksweep Report - Sweep Result Emission
//!
//! Turns the orchestrator's accumulated [`blocksweep_core::ResultSeries`]
//! into output:
//! - Human-readable terminal listing (per-workload sorted tables)
//! - JSON (machine-readable, full schema)
//! - CSV (spreadsheet-compatible)
//!
//! Series are sorted by block size at report-build time; everything before
//! that point is insertion-ordered.

mod csv;
mod human;
mod json;
mod report;

pub use csv::generate_csv_report;
pub use human::format_human_output;
pub use json::generate_json_report;
pub use report::{Report, ReportMeta, SeriesReport, build_report};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// CSV for spreadsheets
    Csv,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
