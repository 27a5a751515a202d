//! Sweep Orchestrator
//!
//! Drives the outer loop over block sizes: rebuild, measure each admitted
//! workload, extract the metric, append to the matching series. The loop
//! is strictly sequential; the rebuilt executable is shared on-disk state,
//! so one block's build-and-measure cycle must finish before the next
//! begins.
//!
//! Failure policy (per stage):
//! - build failure: this block is abandoned, recorded as skipped in every
//!   admitting series, and the sweep moves to the next block.
//! - run failure (spawn error or timeout): the sample for that
//!   (block, workload) pair is skipped and recorded; the sweep continues.
//! - non-zero exit: not a failure; the output is still mined, since the
//!   workload may report an internal correctness failure alongside a
//!   valid metric line.
//! - extraction failure: the sample is skipped and recorded; the sweep
//!   continues. No placeholder value is ever fabricated.

use std::time::Duration;

use blocksweep_core::{ResultSeries, SweepDomain, Workload, extract_metric};
use blocksweep_runner::{Builder, CommandSpec, run_captured};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};

use crate::config::SweepConfig;

/// The configured sweep, ready to run.
pub struct Sweep {
    domain: SweepDomain,
    builder: Builder,
    runs: Vec<(Workload, CommandSpec)>,
    marker: String,
    timeout: Option<Duration>,
    progress: bool,
}

impl Sweep {
    /// Assemble a sweep from explicit parts. `runs` fixes the workload
    /// visiting order for every iteration.
    pub fn new(
        domain: SweepDomain,
        builder: Builder,
        runs: Vec<(Workload, CommandSpec)>,
        marker: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            domain,
            builder,
            runs,
            marker: marker.into(),
            timeout,
            progress: false,
        }
    }

    /// Assemble a sweep from configuration.
    pub fn from_config(config: &SweepConfig) -> anyhow::Result<Self> {
        let runs = config
            .workloads
            .iter()
            .map(|w| (w.clone(), config.run_spec(w)))
            .collect();
        Ok(Self::new(
            config.domain()?,
            config.builder()?,
            runs,
            config.sweep.marker.as_str(),
            config.timeout()?,
        ))
    }

    /// Show a terminal progress bar over the domain while running.
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Workloads in visiting order.
    pub fn workloads(&self) -> impl Iterator<Item = &Workload> {
        self.runs.iter().map(|(w, _)| w)
    }

    /// The block-size domain being swept.
    pub fn domain(&self) -> SweepDomain {
        self.domain
    }

    /// Number of measurement runs the sweep will attempt.
    pub fn planned_runs(&self) -> u64 {
        self.domain
            .iter()
            .map(|block| self.runs.iter().filter(|(w, _)| w.admits(block)).count() as u64)
            .sum()
    }

    /// Execute the full sweep and return one series per workload, in
    /// visiting order. Samples are insertion-ordered; sorting happens at
    /// report time.
    pub fn run(&self) -> Vec<ResultSeries> {
        let mut series: Vec<ResultSeries> = self
            .runs
            .iter()
            .map(|(w, _)| ResultSeries::new(w.clone()))
            .collect();

        let pb = if self.progress {
            let pb = ProgressBar::new(self.domain.count());
            pb.set_style(
                ProgressStyle::default_bar()
                    .template(
                        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                    )
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        } else {
            ProgressBar::hidden()
        };

        for block in self.domain.iter() {
            pb.set_message(format!("block {}", block));

            if let Err(e) = self.builder.rebuild(block) {
                warn!(block, error = %e, "build failed, abandoning this block");
                for s in series.iter_mut() {
                    if s.workload.admits(block) {
                        s.push_skipped(block, format!("build: {}", e));
                    }
                }
                pb.inc(1);
                continue;
            }

            for ((workload, spec), s) in self.runs.iter().zip(series.iter_mut()) {
                if !workload.admits(block) {
                    continue;
                }
                self.measure(block, workload, spec, s);
            }

            pb.inc(1);
        }

        pb.finish_with_message("Sweep complete");
        series
    }

    /// One measurement: run the artifact, mine the metric, append or skip.
    fn measure(&self, block: u32, workload: &Workload, spec: &CommandSpec, series: &mut ResultSeries) {
        let out = match run_captured(spec, self.timeout) {
            Ok(out) => out,
            Err(e) => {
                warn!(block, workload = %workload.name, error = %e, "run failed");
                series.push_skipped(block, format!("run: {}", e));
                return;
            }
        };

        if !out.success() {
            // Inspectable, not fatal: the metric line may still be there.
            debug!(block, workload = %workload.name, status = %out.status, "non-zero exit");
        }

        match extract_metric(&out.stdout, &self.marker) {
            Ok(misses) => {
                debug!(block, workload = %workload.name, misses, "sample recorded");
                series.push(block, misses);
            }
            Err(e) => {
                warn!(block, workload = %workload.name, error = %e, "extraction failed");
                series.push_skipped(block, format!("extract: {}", e));
            }
        }
    }
}
