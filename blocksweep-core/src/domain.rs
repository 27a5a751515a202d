//! Sweep domain, workload shapes, and result series.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors constructing the sweep domain.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    /// The configured range contains no block sizes.
    #[error("Empty sweep domain: min {min} exceeds max {max}")]
    Empty {
        /// Lower bound as configured.
        min: u32,
        /// Upper bound as configured.
        max: u32,
    },

    /// A block size of zero cannot be injected as a tile dimension.
    #[error("Block size 0 is not a valid sweep bound")]
    ZeroBlock,
}

/// Inclusive range of block sizes to sweep, iterated in ascending order.
///
/// The block size is a compile-time tuning parameter injected into each
/// rebuild of the target; one build-and-measure cycle runs per value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepDomain {
    min: u32,
    max: u32,
}

impl SweepDomain {
    /// Create a domain covering `min..=max`.
    pub fn new(min: u32, max: u32) -> Result<Self, DomainError> {
        if min == 0 {
            return Err(DomainError::ZeroBlock);
        }
        if min > max {
            return Err(DomainError::Empty { min, max });
        }
        Ok(Self { min, max })
    }

    /// Smallest block size in the domain.
    pub fn min(&self) -> u32 {
        self.min
    }

    /// Largest block size in the domain.
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Number of block sizes in the domain. At least 1; an empty domain
    /// is unconstructible.
    pub fn count(&self) -> u64 {
        u64::from(self.max - self.min) + 1
    }

    /// Whether `block` falls inside the domain.
    pub fn contains(&self, block: u32) -> bool {
        block >= self.min && block <= self.max
    }

    /// Ascending iterator over the domain.
    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.min..=self.max
    }
}

impl Default for SweepDomain {
    /// The original driver swept 1..=63.
    fn default() -> Self {
        Self { min: 1, max: 63 }
    }
}

/// One invocation shape of the target executable: a named (rows, cols)
/// pair, optionally gated so that only block sizes below `block_ceiling`
/// are measured.
///
/// The ceiling models a tile size that cannot validly exceed the matrix
/// dimension it tiles; at or above the ceiling the workload is skipped
/// entirely for that block size and no sample is produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    /// Identifier used in logs and reports.
    pub name: String,
    /// Row count passed to the target.
    pub rows: u32,
    /// Column count passed to the target.
    pub cols: u32,
    /// Exclusive upper bound on admitted block sizes, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_ceiling: Option<u32>,
}

impl Workload {
    /// Construct an ungated workload.
    pub fn new(name: impl Into<String>, rows: u32, cols: u32) -> Self {
        Self {
            name: name.into(),
            rows,
            cols,
            block_ceiling: None,
        }
    }

    /// Gate this workload to block sizes strictly below `ceiling`.
    pub fn with_ceiling(mut self, ceiling: u32) -> Self {
        self.block_ceiling = Some(ceiling);
        self
    }

    /// Whether this workload is measured for the given block size.
    pub fn admits(&self, block: u32) -> bool {
        match self.block_ceiling {
            Some(ceiling) => block < ceiling,
            None => true,
        }
    }

    /// The three shapes exercised by the original transpose driver.
    pub fn standard_set() -> Vec<Workload> {
        vec![
            Workload::new("t32", 32, 32).with_ceiling(32),
            Workload::new("t64", 64, 64),
            Workload::new("t61x67", 61, 67),
        ]
    }
}

/// A single observation: the block size the target was built with and the
/// miss count its run reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Block size injected into the build.
    pub block: u32,
    /// Extracted miss count.
    pub misses: u64,
}

/// A block size that produced no sample, with the reason it was dropped.
///
/// Recorded so a gap in the sweep domain is visible in the report rather
/// than silently narrowing the apparent domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedBlock {
    /// Block size that was not measured.
    pub block: u32,
    /// Human-readable failure context (which stage, what went wrong).
    pub reason: String,
}

/// Accumulated samples for one workload across the sweep.
///
/// Samples are appended in sweep order and only sorted at report time;
/// [`ResultSeries::sorted`] is stable and idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSeries {
    /// The workload these samples belong to.
    pub workload: Workload,
    /// Collected samples, in insertion order.
    pub samples: Vec<MetricSample>,
    /// Block sizes that failed to produce a sample.
    #[serde(default)]
    pub skipped: Vec<SkippedBlock>,
}

impl ResultSeries {
    /// Start an empty series for a workload.
    pub fn new(workload: Workload) -> Self {
        Self {
            workload,
            samples: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Append a sample.
    pub fn push(&mut self, block: u32, misses: u64) {
        self.samples.push(MetricSample { block, misses });
    }

    /// Record a block that produced no sample.
    pub fn push_skipped(&mut self, block: u32, reason: impl Into<String>) {
        self.skipped.push(SkippedBlock {
            block,
            reason: reason.into(),
        });
    }

    /// Samples sorted ascending by block size.
    ///
    /// Uses a stable sort, so among equal block sizes (not expected under
    /// normal operation) insertion order is preserved.
    pub fn sorted(&self) -> Vec<MetricSample> {
        let mut out = self.samples.clone();
        out.sort_by_key(|s| s.block);
        out
    }

    /// The sample with the fewest misses, preferring the smaller block on
    /// ties.
    pub fn best(&self) -> Option<MetricSample> {
        self.sorted()
            .into_iter()
            .min_by_key(|s| (s.misses, s.block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_iterates_full_range_ascending() {
        let domain = SweepDomain::new(1, 5).unwrap();
        let values: Vec<u32> = domain.iter().collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
        assert_eq!(domain.count(), 5);
    }

    #[test]
    fn domain_rejects_inverted_range() {
        assert_eq!(
            SweepDomain::new(10, 2),
            Err(DomainError::Empty { min: 10, max: 2 })
        );
    }

    #[test]
    fn domain_rejects_zero_block() {
        assert_eq!(SweepDomain::new(0, 4), Err(DomainError::ZeroBlock));
    }

    #[test]
    fn domain_contains_bounds() {
        let domain = SweepDomain::new(1, 63).unwrap();
        assert!(domain.contains(1));
        assert!(domain.contains(63));
        assert!(!domain.contains(0));
        assert!(!domain.contains(64));
    }

    #[test]
    fn ceiling_gates_at_and_above_boundary() {
        let w = Workload::new("t32", 32, 32).with_ceiling(32);
        assert!(w.admits(1));
        assert!(w.admits(31));
        assert!(!w.admits(32));
        assert!(!w.admits(33));
    }

    #[test]
    fn ungated_workload_admits_everything() {
        let w = Workload::new("t64", 64, 64);
        assert!(w.admits(1));
        assert!(w.admits(63));
        assert!(w.admits(1000));
    }

    #[test]
    fn sorted_orders_by_block_not_metric() {
        let mut series = ResultSeries::new(Workload::new("t64", 64, 64));
        series.push(3, 40);
        series.push(1, 50);
        series.push(2, 30);

        let sorted = series.sorted();
        let pairs: Vec<(u32, u64)> = sorted.iter().map(|s| (s.block, s.misses)).collect();
        assert_eq!(pairs, vec![(1, 50), (2, 30), (3, 40)]);
    }

    #[test]
    fn sorted_is_idempotent() {
        let mut series = ResultSeries::new(Workload::new("t64", 64, 64));
        series.push(2, 7);
        series.push(1, 9);

        let once = series.sorted();
        let mut resorted = once.clone();
        resorted.sort_by_key(|s| s.block);
        assert_eq!(once, resorted);
    }

    #[test]
    fn sorted_tie_break_preserves_insertion_order() {
        let mut series = ResultSeries::new(Workload::new("t64", 64, 64));
        series.push(5, 100);
        series.push(5, 200);
        series.push(1, 1);

        let sorted = series.sorted();
        assert_eq!(sorted[0].block, 1);
        assert_eq!(sorted[1].misses, 100);
        assert_eq!(sorted[2].misses, 200);
    }

    #[test]
    fn best_prefers_fewest_misses_then_smaller_block() {
        let mut series = ResultSeries::new(Workload::new("t64", 64, 64));
        series.push(8, 300);
        series.push(4, 120);
        series.push(16, 120);

        let best = series.best().unwrap();
        assert_eq!(best.block, 4);
        assert_eq!(best.misses, 120);
    }

    #[test]
    fn standard_set_matches_driver_order() {
        let set = Workload::standard_set();
        let names: Vec<&str> = set.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["t32", "t64", "t61x67"]);
        assert_eq!(set[0].block_ceiling, Some(32));
        assert_eq!(set[1].block_ceiling, None);
        assert_eq!(set[2].rows, 61);
        assert_eq!(set[2].cols, 67);
    }
}
