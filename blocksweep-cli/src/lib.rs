#![warn(missing_docs)]
//! Blocksweep CLI Library
//!
//! Ties the harness together: discovers `sweep.toml`, applies CLI
//! overrides, runs the sweep, and emits the report. The `blocksweep`
//! binary is a thin wrapper over [`run`].
//!
//! # Example
//!
//! ```text
//! $ blocksweep --max 31 --format csv --output sweep.csv
//! ```

mod config;
mod sweep;

pub use config::{BuildSection, SweepConfig, SweepSection, parse_duration};
pub use sweep::Sweep;

use std::io::Write;
use std::path::PathBuf;

use blocksweep_report::{
    OutputFormat, ReportMeta, build_report, format_human_output, generate_csv_report,
    generate_json_report,
};
use clap::Parser;

/// Blocksweep CLI arguments
#[derive(Parser, Debug)]
#[command(name = "blocksweep")]
#[command(author, version, about = "Blocksweep - compile-time block size sweep harness")]
pub struct Cli {
    /// Configuration file (default: discover sweep.toml upward)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Smallest block size to sweep (overrides config)
    #[arg(long)]
    pub min: Option<u32>,

    /// Largest block size to sweep (overrides config)
    #[arg(long)]
    pub max: Option<u32>,

    /// Per-invocation timeout, e.g. "60s", "500ms"; "0" disables
    #[arg(long)]
    pub timeout: Option<String>,

    /// Output format: json, csv, human
    #[arg(long, default_value = "human")]
    pub format: String,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// List the sweep plan without building or running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// Run the blocksweep CLI. This is the binary's entry point.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the blocksweep CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("blocksweep=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("blocksweep=info")
            .init();
    }

    // Load sweep.toml (explicit path wins, then discovery, then defaults)
    let mut config = match &cli.config {
        Some(path) => SweepConfig::load(path)?,
        None => SweepConfig::discover().unwrap_or_default(),
    };

    // CLI flags override config file values
    if let Some(min) = cli.min {
        config.sweep.min_block = min;
    }
    if let Some(max) = cli.max {
        config.sweep.max_block = max;
    }
    if let Some(timeout) = &cli.timeout {
        config.sweep.timeout = timeout.clone();
    }

    let format: OutputFormat = cli
        .format
        .parse()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let sweep = Sweep::from_config(&config)?;

    if cli.dry_run {
        print!("{}", render_plan(&config, &sweep));
        return Ok(());
    }

    println!(
        "Sweeping block {}..={} over {} workload(s), {} planned run(s)...\n",
        sweep.domain().min(),
        sweep.domain().max(),
        config.workloads.len(),
        sweep.planned_runs()
    );

    let series = sweep.with_progress(true).run();

    let report = build_report(
        &series,
        ReportMeta {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
            domain: config.domain()?,
            marker: config.sweep.marker.clone(),
            artifact: config.artifact_path().display().to_string(),
            timeout_secs: config.timeout()?.map(|t| t.as_secs_f64()),
        },
    );

    let output = match format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Csv => generate_csv_report(&report),
        OutputFormat::Human => format_human_output(&report),
    };

    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    Ok(())
}

/// Render the sweep plan for `--dry-run`.
fn render_plan(config: &SweepConfig, sweep: &Sweep) -> String {
    let mut out = String::from("Blocksweep Plan:\n");
    let domain = sweep.domain();
    out.push_str(&format!(
        "├── domain: block {}..={}\n",
        domain.min(),
        domain.max()
    ));
    out.push_str(&format!("├── artifact: {}\n", config.artifact_path().display()));
    for workload in sweep.workloads() {
        let admitted = domain.iter().filter(|&b| workload.admits(b)).count();
        let gate = match workload.block_ceiling {
            Some(c) => format!(", block < {}", c),
            None => String::new(),
        };
        out.push_str(&format!(
            "│   ├── {} ({}x{}{}): {} run(s)\n",
            workload.name, workload.rows, workload.cols, gate, admitted
        ));
    }
    out.push_str(&format!("{} planned run(s) total.\n", sweep.planned_runs()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_counts_gated_runs() {
        let mut config = SweepConfig::default();
        config.sweep.min_block = 1;
        config.sweep.max_block = 40;
        let sweep = Sweep::from_config(&config).unwrap();

        let plan = render_plan(&config, &sweep);
        // t32 is gated at block < 32: only 31 of the 40 blocks run it.
        assert!(plan.contains("t32 (32x32, block < 32): 31 run(s)"));
        assert!(plan.contains("t64 (64x64): 40 run(s)"));
        assert!(plan.contains("t61x67 (61x67): 40 run(s)"));
    }

    #[test]
    fn cli_defaults_to_human_format() {
        let cli = Cli::parse_from(["blocksweep"]);
        assert_eq!(cli.format, "human");
        assert!(!cli.dry_run);
    }

    #[test]
    fn cli_overrides_domain_bounds() {
        let cli = Cli::parse_from(["blocksweep", "--min", "2", "--max", "8", "--dry-run"]);
        assert_eq!(cli.min, Some(2));
        assert_eq!(cli.max, Some(8));
        assert!(cli.dry_run);
    }
}
