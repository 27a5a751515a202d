//! Captured command execution with a bounded wait.

use std::fmt;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// How often the parent polls a running child for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A command line to execute: program, arguments, extra environment, and
/// an optional working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to launch.
    pub program: String,
    /// Arguments, in order.
    pub args: Vec<String>,
    /// Environment variables set on top of the inherited environment.
    pub envs: Vec<(String, String)>,
    /// Working directory for the child, if not inherited.
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Start a spec for `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            cwd: None,
        }
    }

    /// Build a spec from an argv-style list. Returns `None` for an empty
    /// list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            envs: Vec::new(),
            cwd: None,
        })
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an environment variable for the child.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Set the child's working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured output of one completed invocation.
///
/// Transient: the orchestrator mines the metric out of `stdout` and drops
/// the rest.
#[derive(Debug)]
pub struct RunOutput {
    /// The child's full stdout, lossily decoded as UTF-8.
    pub stdout: String,
    /// Exit status. Non-zero is a normal, inspectable result here.
    pub status: ExitStatus,
}

impl RunOutput {
    /// Whether the child exited zero.
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Failures launching or waiting on a child process.
///
/// A non-zero exit status is *not* represented here; it comes back inside
/// [`RunOutput`].
#[derive(Debug, Error)]
pub enum RunError {
    /// The program could not be launched at all.
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        /// Program that failed to launch.
        program: String,
        /// Underlying launch error.
        source: std::io::Error,
    },

    /// Waiting on the child failed.
    #[error("Failed to wait on '{program}': {source}")]
    Wait {
        /// Program being waited on.
        program: String,
        /// Underlying wait error.
        source: std::io::Error,
    },

    /// The child did not exit before the deadline and was killed.
    #[error("'{program}' exceeded {timeout:?} and was killed")]
    Timeout {
        /// Program that hung.
        program: String,
        /// The configured ceiling.
        timeout: Duration,
    },
}

/// Execute `spec`, capturing its entire stdout and its exit status.
///
/// Stdout is drained on a separate thread while the parent polls
/// `try_wait`, so a child that writes more than a pipe buffer cannot
/// deadlock against us. Stderr is inherited: build noise and workload
/// diagnostics go straight to the operator's terminal.
///
/// With `timeout` set, a child still running at the deadline is killed
/// and [`RunError::Timeout`] is returned; its partial output is
/// discarded. With `timeout` unset the wait is unbounded.
pub fn run_captured(spec: &CommandSpec, timeout: Option<Duration>) -> Result<RunOutput, RunError> {
    let mut command = Command::new(&spec.program);
    command
        .args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());
    if let Some(dir) = &spec.cwd {
        command.current_dir(dir);
    }
    for (key, value) in &spec.envs {
        command.env(key, value);
    }

    let mut child = command.spawn().map_err(|source| RunError::Spawn {
        program: spec.program.clone(),
        source,
    })?;

    // Drain stdout concurrently; the pipe closes when the child exits or
    // is killed, ending the read.
    let drain = child.stdout.take().map(|mut pipe| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    });

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if let Some(limit) = timeout {
                    if start.elapsed() >= limit {
                        let _ = child.kill();
                        let _ = child.wait();
                        if let Some(handle) = drain {
                            let _ = handle.join();
                        }
                        return Err(RunError::Timeout {
                            program: spec.program.clone(),
                            timeout: limit,
                        });
                    }
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                let _ = child.kill();
                if let Some(handle) = drain {
                    let _ = handle.join();
                }
                return Err(RunError::Wait {
                    program: spec.program.clone(),
                    source,
                });
            }
        }
    };

    let bytes = match drain {
        Some(handle) => handle.join().unwrap_or_default(),
        None => Vec::new(),
    };

    Ok(RunOutput {
        stdout: String::from_utf8_lossy(&bytes).into_owned(),
        status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_argv_splits_program_and_args() {
        let argv = vec!["make".to_string(), "clean".to_string()];
        let spec = CommandSpec::from_argv(&argv).unwrap();
        assert_eq!(spec.program, "make");
        assert_eq!(spec.args, vec!["clean"]);
    }

    #[test]
    fn from_argv_rejects_empty() {
        assert!(CommandSpec::from_argv(&[]).is_none());
    }

    #[test]
    fn display_joins_program_and_args() {
        let spec = CommandSpec::new("./test-trans").arg("-M").arg("32");
        assert_eq!(spec.to_string(), "./test-trans -M 32");
    }
}
