//! JSON report generation.

use crate::report::Report;

/// Serialize the report as pretty-printed JSON.
pub fn generate_json_report(report: &Report) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}
