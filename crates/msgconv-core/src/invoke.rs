//! External converter invocation with a bounded deadline.
//!
//! The converter is an opaque command-line capability invoked once per
//! request as `<program> --outfile <output> <input>`. How the run
//! concluded travels back as an [`Outcome`]; expected failure modes never
//! surface as errors across this boundary.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::Command;
use tokio::time;

use crate::TRACING_TARGET_INVOKE;

/// Flag passed to the converter ahead of the output path.
const OUTPUT_FLAG: &str = "--outfile";

/// How a single converter invocation concluded.
///
/// Produced exactly once per request that reaches the invoker. There is
/// no retry: conversion failures are deterministic for a given input, so
/// retrying would only spend the timeout budget twice.
#[derive(Debug)]
pub enum Outcome {
    /// The process exited with status zero within the deadline; the
    /// output file is expected to exist and be readable.
    Succeeded,
    /// The process ran to completion but exited non-zero.
    FailedNonZero {
        /// Exit status, for logging only.
        status: ExitStatus,
        /// Captured standard error, for the client-visible diagnostic.
        stderr: String,
    },
    /// The deadline elapsed before the process exited. The child has
    /// been reclaimed; no partial output file is trusted.
    TimedOut,
    /// The process could not be launched at all (missing executable,
    /// permission error).
    LaunchError(std::io::Error),
}

/// Runs the external converter against workspace paths.
///
/// Immutable after construction; one invoker is shared by all requests.
#[derive(Debug, Clone)]
pub struct Invoker {
    program: PathBuf,
    timeout: Duration,
}

impl Invoker {
    /// Creates an invoker for the given converter program and call
    /// timeout.
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    /// Returns the converter program path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Returns the call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Invokes the converter on `input`, asking it to write to `output`.
    ///
    /// Standard output and standard error are captured, standard input is
    /// closed. The deadline is measured from process start; if it elapses
    /// the child is killed rather than left running.
    pub async fn invoke(&self, input: &Path, output: &Path) -> Outcome {
        let mut command = Command::new(&self.program);
        command
            .arg(OUTPUT_FLAG)
            .arg(output)
            .arg(input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            target: TRACING_TARGET_INVOKE,
            program = %self.program.display(),
            input = %input.display(),
            output = %output.display(),
            timeout_secs = self.timeout.as_secs(),
            "invoking converter"
        );

        let child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                tracing::error!(
                    target: TRACING_TARGET_INVOKE,
                    program = %self.program.display(),
                    input = %input.display(),
                    error = %err,
                    "failed to launch converter"
                );
                return Outcome::LaunchError(err);
            }
        };

        // `wait_with_output` consumes the child; on timeout the dropped
        // future takes the child with it and `kill_on_drop` reclaims the
        // process.
        match time::timeout(self.timeout, child.wait_with_output()).await {
            Err(_) => {
                tracing::error!(
                    target: TRACING_TARGET_INVOKE,
                    program = %self.program.display(),
                    input = %input.display(),
                    timeout_secs = self.timeout.as_secs(),
                    "converter timed out and was killed"
                );
                Outcome::TimedOut
            }
            Ok(Err(err)) => {
                tracing::error!(
                    target: TRACING_TARGET_INVOKE,
                    program = %self.program.display(),
                    error = %err,
                    "failed to collect converter output"
                );
                Outcome::LaunchError(err)
            }
            Ok(Ok(out)) if out.status.success() => {
                tracing::debug!(
                    target: TRACING_TARGET_INVOKE,
                    program = %self.program.display(),
                    input = %input.display(),
                    "converter succeeded"
                );
                Outcome::Succeeded
            }
            Ok(Ok(out)) => {
                let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
                tracing::error!(
                    target: TRACING_TARGET_INVOKE,
                    program = %self.program.display(),
                    input = %input.display(),
                    status = ?out.status.code(),
                    stderr = %stderr,
                    "converter exited non-zero"
                );
                Outcome::FailedNonZero {
                    status: out.status,
                    stderr,
                }
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;
    use std::time::{Duration, Instant};

    use super::*;

    /// Writes an executable shell script standing in for the converter.
    fn fake_converter(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("msgconvert");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn zero_exit_is_succeeded() {
        let dir = tempfile::tempdir().unwrap();
        // Args are `--outfile <output> <input>`.
        let program = fake_converter(dir.path(), r#"cp "$3" "$2""#);

        let input = dir.path().join("mail.msg");
        let output = dir.path().join("mail.msg.eml");
        std::fs::write(&input, b"msg bytes").unwrap();

        let invoker = Invoker::new(&program, Duration::from_secs(5));
        let outcome = invoker.invoke(&input, &output).await;

        assert!(matches!(outcome, Outcome::Succeeded));
        assert_eq!(std::fs::read(&output).unwrap(), b"msg bytes");
    }

    #[tokio::test]
    async fn non_zero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_converter(dir.path(), "echo 'unsupported format' >&2; exit 3");

        let input = dir.path().join("mail.msg");
        std::fs::write(&input, b"junk").unwrap();

        let invoker = Invoker::new(&program, Duration::from_secs(5));
        let outcome = invoker
            .invoke(&input, &dir.path().join("mail.msg.eml"))
            .await;

        match outcome {
            Outcome::FailedNonZero { status, stderr } => {
                assert_eq!(status.code(), Some(3));
                assert!(stderr.contains("unsupported format"));
            }
            other => panic!("expected FailedNonZero, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deadline_elapsing_is_timed_out() {
        let dir = tempfile::tempdir().unwrap();
        let program = fake_converter(dir.path(), "sleep 30");

        let input = dir.path().join("mail.msg");
        std::fs::write(&input, b"msg bytes").unwrap();

        let invoker = Invoker::new(&program, Duration::from_millis(200));
        let started = Instant::now();
        let outcome = invoker
            .invoke(&input, &dir.path().join("mail.msg.eml"))
            .await;

        assert!(matches!(outcome, Outcome::TimedOut));
        // The child must be killed, not waited to completion.
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn missing_executable_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let program = dir.path().join("no-such-converter");

        let input = dir.path().join("mail.msg");
        std::fs::write(&input, b"msg bytes").unwrap();

        let invoker = Invoker::new(&program, Duration::from_secs(5));
        let outcome = invoker
            .invoke(&input, &dir.path().join("mail.msg.eml"))
            .await;

        match outcome {
            Outcome::LaunchError(err) => {
                assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected LaunchError, got {other:?}"),
        }
    }
}
