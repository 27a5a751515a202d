//! Clean/build/link pipeline for the target executable.

use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::process::{CommandSpec, RunError, run_captured};

/// Which pipeline stage a build failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStage {
    /// Artifact removal (best-effort).
    Clean,
    /// Compilation with the injected definition.
    Compile,
    /// Final link producing the executable under test.
    Link,
}

impl std::fmt::Display for BuildStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildStage::Clean => write!(f, "clean"),
            BuildStage::Compile => write!(f, "compile"),
            BuildStage::Link => write!(f, "link"),
        }
    }
}

/// The toolchain did not produce a usable executable for this block size.
///
/// The orchestrator's policy on any of these is to abort measurement for
/// the current block size only and move on to the next one.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A stage could not be launched or hung past its deadline.
    #[error("Build stage '{stage}' failed to run: {source}")]
    Stage {
        /// Stage that failed.
        stage: BuildStage,
        /// Underlying process failure.
        source: RunError,
    },

    /// A stage ran but exited non-zero.
    #[error("Build stage '{stage}' exited with {status}")]
    StageFailed {
        /// Stage that failed.
        stage: BuildStage,
        /// The non-zero exit status.
        status: ExitStatus,
    },

    /// All stages succeeded but the expected artifact is absent. Either
    /// the configured artifact path is wrong or the link step wrote
    /// somewhere else; running anyway would measure a stale executable.
    #[error("Build reported success but artifact '{path}' does not exist")]
    MissingArtifact {
        /// Configured artifact path.
        path: PathBuf,
    },
}

/// Rebuilds the target executable with a block size injected as a
/// compile-time integer definition.
///
/// The pipeline mirrors the original driver: best-effort `make clean`,
/// then a compile with `CFLAGS=-D__BLOCK__=<n>` (names configurable),
/// then an explicit link. The artifact path is an explicit value here and
/// is threaded through the orchestrator to every measurement run; nothing
/// else in the harness assumes an ambient executable location.
#[derive(Debug, Clone)]
pub struct Builder {
    artifact: PathBuf,
    define: String,
    flags_env: String,
    clean: Option<CommandSpec>,
    build: CommandSpec,
    link: Option<CommandSpec>,
    timeout: Option<Duration>,
}

impl Builder {
    /// Create a builder. `build` is the only mandatory stage; `clean` and
    /// `link` may be absent when the build command covers them.
    pub fn new(
        artifact: impl Into<PathBuf>,
        define: impl Into<String>,
        flags_env: impl Into<String>,
        clean: Option<CommandSpec>,
        build: CommandSpec,
        link: Option<CommandSpec>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            artifact: artifact.into(),
            define: define.into(),
            flags_env: flags_env.into(),
            clean,
            build,
            link,
            timeout,
        }
    }

    /// Path of the executable this builder produces.
    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    /// Run the full pipeline for one block size.
    ///
    /// Clean failures are logged and ignored; compile and link failures
    /// propagate so the caller never measures against a stale executable.
    pub fn rebuild(&self, block: u32) -> Result<(), BuildError> {
        if let Some(clean) = &self.clean {
            debug!(%clean, "running clean stage");
            match run_captured(clean, self.timeout) {
                Ok(out) if !out.success() => {
                    warn!(%clean, status = %out.status, "clean stage exited non-zero, continuing");
                }
                Err(e) => {
                    warn!(%clean, error = %e, "clean stage did not run, continuing");
                }
                Ok(_) => {}
            }
        }

        let flags = format!("-D{}={}", self.define, block);
        let compile = self
            .build
            .clone()
            .env(self.flags_env.as_str(), flags.as_str());
        debug!(%compile, %flags, "running compile stage");
        self.run_required(BuildStage::Compile, &compile)?;

        if let Some(link) = &self.link {
            debug!(%link, "running link stage");
            self.run_required(BuildStage::Link, link)?;
        }

        if !self.artifact.exists() {
            return Err(BuildError::MissingArtifact {
                path: self.artifact.clone(),
            });
        }

        Ok(())
    }

    fn run_required(&self, stage: BuildStage, spec: &CommandSpec) -> Result<(), BuildError> {
        let out = run_captured(spec, self.timeout)
            .map_err(|source| BuildError::Stage { stage, source })?;
        if !out.success() {
            return Err(BuildError::StageFailed {
                stage,
                status: out.status,
            });
        }
        Ok(())
    }
}
