#![warn(missing_docs)]
//! Blocksweep Runner - External Process Plumbing
//!
//! Two concerns live here:
//!
//! - [`run_captured`]: launch a command, capture its entire stdout as
//!   text, and hand back the exit status without treating non-zero exit
//!   as a control-flow fault. Every invocation runs under a bounded wait;
//!   a hung child is killed and reported instead of stalling the sweep.
//! - [`Builder`]: the clean/build/link pipeline that rebuilds the target
//!   executable with a block size injected as a compile-time definition.
//!
//! The orchestrator in `blocksweep-cli` drives both.

mod build;
mod process;

pub use build::{BuildError, BuildStage, Builder};
pub use process::{CommandSpec, RunError, RunOutput, run_captured};
