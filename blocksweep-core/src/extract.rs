//! Marker-line metric extraction.
//!
//! The target executable prints, among other output, one line containing a
//! fixed marker token followed by at least two digit runs, e.g.
//!
//! ```text
//! TEST_TRANS_RESULTS=1:345
//! ```
//!
//! The first digit run is the driver's pass/fail flag, the second is the
//! miss count. Extraction is purely lexical: all maximal ASCII digit runs
//! on the marker line are collected left to right and the run at index 1
//! is the metric. This positional contract is tied to the marker line's
//! known format; the marker token itself is configurable.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

/// Why no metric could be mined out of a run's output.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// No line of the captured output contained the marker token.
    #[error("No line containing marker '{marker}' in captured output")]
    MarkerNotFound {
        /// The marker that was searched for.
        marker: String,
    },

    /// The marker line did not carry enough digit runs to index the metric.
    #[error("Marker line has {found} digit run(s), need at least 2: '{line}'")]
    TooFewFields {
        /// Number of digit runs found on the marker line.
        found: usize,
        /// The offending line, for operator inspection.
        line: String,
    },

    /// The metric digit run does not fit in a u64.
    #[error("Metric '{token}' overflows u64")]
    MetricOverflow {
        /// The digit run that failed to parse.
        token: String,
    },
}

fn digit_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("digit-run regex is valid"))
}

/// Extract the miss count from captured process output.
///
/// Locates the first line containing `marker`, collects every maximal
/// digit run on it, and parses the second run as a base-10 `u64`. Signs,
/// decimal points, and separators are not interpreted; `-37` contributes
/// the digit run `37`.
pub fn extract_metric(output: &str, marker: &str) -> Result<u64, ExtractError> {
    let line = output
        .lines()
        .find(|l| l.contains(marker))
        .ok_or_else(|| ExtractError::MarkerNotFound {
            marker: marker.to_string(),
        })?;

    let runs: Vec<&str> = digit_runs().find_iter(line).map(|m| m.as_str()).collect();
    let token = runs.get(1).ok_or_else(|| ExtractError::TooFewFields {
        found: runs.len(),
        line: line.to_string(),
    })?;

    token.parse().map_err(|_| ExtractError::MetricOverflow {
        token: (*token).to_string(),
    })
}
