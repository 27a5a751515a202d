//! Report Data Structures

use blocksweep_core::{MetricSample, ResultSeries, SkippedBlock, SweepDomain, Workload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complete sweep report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Context needed to reproduce any individual case by hand.
    pub meta: ReportMeta,
    /// One entry per workload, in configuration order.
    pub series: Vec<SeriesReport>,
}

/// Report metadata: which sweep produced these numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Harness version.
    pub version: String,
    /// When the sweep finished.
    pub timestamp: DateTime<Utc>,
    /// The swept block-size domain.
    pub domain: SweepDomain,
    /// Marker token the metric was extracted behind.
    pub marker: String,
    /// Executable the workloads ran, as configured.
    pub artifact: String,
    /// Per-invocation wait ceiling in seconds, if one was set.
    pub timeout_secs: Option<f64>,
}

/// One workload's finalized series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesReport {
    /// Workload shape the samples came from.
    pub workload: Workload,
    /// Samples sorted ascending by block size.
    pub samples: Vec<MetricSample>,
    /// Blocks that produced no sample, with failure context.
    #[serde(default)]
    pub skipped: Vec<SkippedBlock>,
    /// The sample with the fewest misses, if any sample exists.
    pub best: Option<MetricSample>,
}

/// Finalize accumulated series into a report.
///
/// This is the only place samples are sorted; the sort is stable and by
/// block size ascending, so re-reporting an already-sorted series is a
/// no-op.
pub fn build_report(series: &[ResultSeries], meta: ReportMeta) -> Report {
    let series = series
        .iter()
        .map(|s| SeriesReport {
            workload: s.workload.clone(),
            samples: s.sorted(),
            skipped: s.skipped.clone(),
            best: s.best(),
        })
        .collect();

    Report { meta, series }
}
