//! Configuration loading from sweep.toml
//!
//! Sweep configuration can be specified in a `sweep.toml` file in the
//! project root. The configuration is automatically discovered by walking
//! up from the current directory; every field has a default replicating
//! the original transpose sweep driver, so an empty file (or none at all)
//! sweeps block 1..=63 of `./test-trans` under the standard three
//! workloads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use blocksweep_core::{DomainError, SweepDomain, Workload};
use blocksweep_runner::{Builder, CommandSpec};
use serde::{Deserialize, Serialize};

/// Top-level sweep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Sweep domain and extraction settings.
    #[serde(default)]
    pub sweep: SweepSection,
    /// Build pipeline settings.
    #[serde(default)]
    pub build: BuildSection,
    /// Workload shapes, visited in listed order every iteration.
    #[serde(default = "Workload::standard_set", rename = "workload")]
    pub workloads: Vec<Workload>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            sweep: SweepSection::default(),
            build: BuildSection::default(),
            workloads: Workload::standard_set(),
        }
    }
}

/// `[sweep]` section: domain bounds, marker token, and run timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSection {
    /// Smallest block size to sweep.
    #[serde(default = "default_min_block")]
    pub min_block: u32,
    /// Largest block size to sweep.
    #[serde(default = "default_max_block")]
    pub max_block: u32,
    /// Marker token identifying the metric line.
    #[serde(default = "default_marker")]
    pub marker: String,
    /// Per-invocation wait ceiling (e.g. "60s", "500ms"); "0" disables.
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            min_block: default_min_block(),
            max_block: default_max_block(),
            marker: default_marker(),
            timeout: default_timeout(),
        }
    }
}

fn default_min_block() -> u32 {
    1
}
fn default_max_block() -> u32 {
    63
}
fn default_marker() -> String {
    "TEST_TRANS_RESULTS".to_string()
}
fn default_timeout() -> String {
    "60s".to_string()
}

/// `[build]` section: where and how the target executable is rebuilt.
///
/// Commands are argv lists, not shell strings; an empty list disables the
/// optional clean and link stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSection {
    /// Working directory every build and run command executes in.
    #[serde(default = "default_workdir")]
    pub workdir: String,
    /// Executable produced by the pipeline, relative to `workdir`.
    #[serde(default = "default_artifact")]
    pub artifact: String,
    /// Name of the injected compile-time integer definition.
    #[serde(default = "default_define")]
    pub define: String,
    /// Environment variable carrying the definition into the build.
    #[serde(default = "default_flags_env")]
    pub flags_env: String,
    /// Best-effort artifact removal command.
    #[serde(default = "default_clean")]
    pub clean: Vec<String>,
    /// Compile command, run with the definition injected.
    #[serde(default = "default_build")]
    pub build: Vec<String>,
    /// Final link command producing `artifact`.
    #[serde(default = "default_link")]
    pub link: Vec<String>,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            workdir: default_workdir(),
            artifact: default_artifact(),
            define: default_define(),
            flags_env: default_flags_env(),
            clean: default_clean(),
            build: default_build(),
            link: default_link(),
        }
    }
}

fn default_workdir() -> String {
    ".".to_string()
}
fn default_artifact() -> String {
    "test-trans".to_string()
}
fn default_define() -> String {
    "__BLOCK__".to_string()
}
fn default_flags_env() -> String {
    "CFLAGS".to_string()
}
fn default_clean() -> Vec<String> {
    vec!["make".to_string(), "clean".to_string()]
}
fn default_build() -> Vec<String> {
    vec!["make".to_string()]
}
fn default_link() -> Vec<String> {
    [
        "gcc", "-g", "-Wall", "-Werror", "-std=c99", "-m64", "-O0", "test-trans.o", "trans.o",
        "cachelab.o", "-o", "test-trans", "-lm",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl SweepConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from the
    /// current directory.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("sweep.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// The configured sweep domain.
    pub fn domain(&self) -> Result<SweepDomain, DomainError> {
        SweepDomain::new(self.sweep.min_block, self.sweep.max_block)
    }

    /// The per-invocation wait ceiling, if one is configured.
    pub fn timeout(&self) -> anyhow::Result<Option<Duration>> {
        let ns = parse_duration(&self.sweep.timeout)?;
        if ns == 0 {
            Ok(None)
        } else {
            Ok(Some(Duration::from_nanos(ns)))
        }
    }

    /// Absolute-or-workdir-relative path of the executable under test.
    pub fn artifact_path(&self) -> PathBuf {
        let artifact = PathBuf::from(&self.build.artifact);
        if artifact.is_absolute() {
            artifact
        } else {
            PathBuf::from(&self.build.workdir).join(artifact)
        }
    }

    /// Construct the build pipeline from the `[build]` section.
    pub fn builder(&self) -> anyhow::Result<Builder> {
        let workdir = &self.build.workdir;
        let in_workdir =
            |argv: &[String]| CommandSpec::from_argv(argv).map(|s| s.current_dir(workdir));

        let build = in_workdir(&self.build.build)
            .ok_or_else(|| anyhow::anyhow!("[build] build command must not be empty"))?;

        Ok(Builder::new(
            self.artifact_path(),
            self.build.define.as_str(),
            self.build.flags_env.as_str(),
            in_workdir(&self.build.clean),
            build,
            in_workdir(&self.build.link),
            self.timeout()?,
        ))
    }

    /// Command line measuring one workload against the current artifact.
    pub fn run_spec(&self, workload: &Workload) -> CommandSpec {
        CommandSpec::new(self.artifact_path().display().to_string())
            .arg("-M")
            .arg(workload.rows.to_string())
            .arg("-N")
            .arg(workload.cols.to_string())
            .current_dir(&self.build.workdir)
    }
}

/// Parse a duration string (e.g. "3s", "500ms", "2m") to nanoseconds.
pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
    let s = s.trim();
    if s.is_empty() {
        return Err(anyhow::anyhow!("Empty duration string"));
    }

    // Find where the number ends and the unit begins
    let (num_part, unit_part) = s
        .char_indices()
        .find(|(_, c)| c.is_alphabetic())
        .map(|(i, _)| s.split_at(i))
        .unwrap_or((s, "s"));

    let value: f64 = num_part
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;

    let multiplier: u64 = match unit_part.to_lowercase().as_str() {
        "ns" => 1,
        "us" => 1_000,
        "ms" => 1_000_000,
        "s" | "" => 1_000_000_000,
        "m" | "min" => 60_000_000_000,
        _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
    };

    Ok((value * multiplier as f64) as u64)
}
