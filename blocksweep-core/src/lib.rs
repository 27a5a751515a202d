#![warn(missing_docs)]
//! Blocksweep Core - Domain Model and Metric Extraction
//!
//! Leaf crate shared by the runner, reporter, and CLI. Defines the sweep
//! domain (the range of block sizes under test), the fixed workload shapes
//! the target executable is invoked with, and the accumulated result
//! series. Also hosts the marker-line metric extractor that mines a miss
//! count out of captured process output.
//!
//! Nothing in this crate touches the filesystem or spawns processes.

mod domain;
mod extract;

pub use domain::{DomainError, MetricSample, ResultSeries, SkippedBlock, SweepDomain, Workload};
pub use extract::{ExtractError, extract_metric};
