//! Integration tests driving the runner against real shell-script fixtures.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use blocksweep_runner::{BuildError, Builder, CommandSpec, RunError, run_captured};
use tempfile::TempDir;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
    path
}

#[test]
fn captures_full_stdout_and_zero_status() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "emit.sh",
        "echo first line\necho TEST_TRANS_RESULTS=1:345",
    );

    let out = run_captured(&CommandSpec::new(script.display().to_string()), None).unwrap();
    assert!(out.success());
    assert!(out.stdout.contains("first line"));
    assert!(out.stdout.contains("TEST_TRANS_RESULTS=1:345"));
}

#[test]
fn non_zero_exit_is_a_normal_result() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "fail.sh",
        "echo TEST_TRANS_RESULTS=0:999\nexit 3",
    );

    let out = run_captured(&CommandSpec::new(script.display().to_string()), None).unwrap();
    assert!(!out.success());
    assert_eq!(out.status.code(), Some(3));
    // Output survives the failed exit; the metric line is still mineable.
    assert!(out.stdout.contains("TEST_TRANS_RESULTS=0:999"));
}

#[test]
fn missing_program_is_a_spawn_error() {
    let spec = CommandSpec::new("/definitely/not/a/real/program");
    match run_captured(&spec, None) {
        Err(RunError::Spawn { program, .. }) => {
            assert_eq!(program, "/definitely/not/a/real/program");
        }
        other => panic!("expected Spawn error, got {:?}", other),
    }
}

#[test]
fn hung_child_is_killed_at_the_deadline() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "hang.sh", "sleep 30");

    let start = Instant::now();
    let result = run_captured(
        &CommandSpec::new(script.display().to_string()),
        Some(Duration::from_millis(200)),
    );
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(RunError::Timeout { .. })));
    assert!(
        elapsed < Duration::from_secs(5),
        "kill took too long: {:?}",
        elapsed
    );
}

#[test]
fn large_output_does_not_deadlock() {
    // More than a pipe buffer: the drain thread must keep reading while
    // the parent polls.
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "chatty.sh",
        "i=0\nwhile [ $i -lt 5000 ]; do echo padding padding padding padding padding; i=$((i+1)); done\necho TEST_TRANS_RESULTS=1:7",
    );

    let out = run_captured(
        &CommandSpec::new(script.display().to_string()),
        Some(Duration::from_secs(30)),
    )
    .unwrap();
    assert!(out.success());
    assert!(out.stdout.lines().count() > 5000);
    assert!(out.stdout.contains("TEST_TRANS_RESULTS=1:7"));
}

#[test]
fn child_env_and_cwd_are_applied() {
    let dir = TempDir::new().unwrap();
    write_script(dir.path(), "env.sh", "echo CFLAGS=$CFLAGS\npwd");

    let out = run_captured(
        &CommandSpec::new("./env.sh")
            .env("CFLAGS", "-D__BLOCK__=8")
            .current_dir(dir.path()),
        None,
    )
    .unwrap();
    assert!(out.stdout.contains("CFLAGS=-D__BLOCK__=8"));
}

fn script_builder(dir: &Path, build_body: &str, link_body: &str) -> Builder {
    let clean = write_script(dir, "clean.sh", "rm -f artifact");
    let build = write_script(dir, "build.sh", build_body);
    let link = write_script(dir, "link.sh", link_body);
    Builder::new(
        dir.join("artifact"),
        "__BLOCK__",
        "CFLAGS",
        Some(CommandSpec::new(clean.display().to_string())),
        CommandSpec::new(build.display().to_string()),
        Some(CommandSpec::new(link.display().to_string())),
        Some(Duration::from_secs(30)),
    )
}

#[test]
fn rebuild_threads_define_through_flags_env() {
    let dir = TempDir::new().unwrap();
    // The build stage records the flags it saw; the link stage produces
    // the artifact from them.
    let builder = script_builder(
        dir.path(),
        &format!("echo \"$CFLAGS\" > {}", dir.path().join("flags.txt").display()),
        &format!(
            "cp {} {}",
            dir.path().join("flags.txt").display(),
            dir.path().join("artifact").display()
        ),
    );

    builder.rebuild(17).unwrap();
    let flags = fs::read_to_string(dir.path().join("flags.txt")).unwrap();
    assert_eq!(flags.trim(), "-D__BLOCK__=17");
    assert!(builder.artifact().exists());
}

#[test]
fn clean_failure_is_non_fatal() {
    let dir = TempDir::new().unwrap();
    let clean = write_script(dir.path(), "clean.sh", "exit 1");
    let build = write_script(
        dir.path(),
        "build.sh",
        &format!("touch {}", dir.path().join("artifact").display()),
    );
    let builder = Builder::new(
        dir.path().join("artifact"),
        "__BLOCK__",
        "CFLAGS",
        Some(CommandSpec::new(clean.display().to_string())),
        CommandSpec::new(build.display().to_string()),
        None,
        Some(Duration::from_secs(30)),
    );

    builder.rebuild(4).unwrap();
}

#[test]
fn failed_link_propagates_as_build_failure() {
    let dir = TempDir::new().unwrap();
    let builder = script_builder(dir.path(), "true", "exit 2");

    match builder.rebuild(9) {
        Err(BuildError::StageFailed { stage, status }) => {
            assert_eq!(stage.to_string(), "link");
            assert_eq!(status.code(), Some(2));
        }
        other => panic!("expected link StageFailed, got {:?}", other),
    }
}

#[test]
fn failed_compile_propagates_as_build_failure() {
    let dir = TempDir::new().unwrap();
    let builder = script_builder(dir.path(), "exit 1", "true");

    match builder.rebuild(9) {
        Err(BuildError::StageFailed { stage, .. }) => {
            assert_eq!(stage.to_string(), "compile");
        }
        other => panic!("expected compile StageFailed, got {:?}", other),
    }
}

#[test]
fn successful_stages_without_artifact_are_loud() {
    let dir = TempDir::new().unwrap();
    // All stages exit zero but nothing ever writes the artifact.
    let builder = script_builder(dir.path(), "true", "true");

    assert!(matches!(
        builder.rebuild(3),
        Err(BuildError::MissingArtifact { .. })
    ));
}
