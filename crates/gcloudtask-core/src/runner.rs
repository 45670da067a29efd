//! The runner boundary: request and result types plus the runner trait.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::files::NamespaceFiles;
use crate::script::AssembledInvocation;

/// Errors raised by a [`CommandRunner`].
///
/// A non-zero exit code of the command sequence is not an error at this
/// boundary; it is reported through [`ExecutionResult::exit_code`] and
/// interpreting it is the caller's decision.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// The execution environment could not be started.
    #[error("Failed to start execution environment: {0}")]
    Start(String),

    /// A file-staging declaration was invalid.
    #[error("Invalid file staging declaration: {0}")]
    Staging(String),

    /// Staging or capture I/O failed.
    #[error("Runner I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a runner needs to execute one assembled invocation.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Interpreter, script body and resolved container options.
    pub invocation: AssembledInvocation,

    /// Final composed environment.
    pub env: HashMap<String, String>,

    /// Working directory for the run; also hosts staged files.
    pub working_dir: PathBuf,

    /// Files to stage into the working directory before the run, file name
    /// to content.
    pub input_files: HashMap<String, String>,

    /// Files the commands are expected to produce, relative to the working
    /// directory.
    pub output_files: Vec<String>,

    /// Namespace file selection, forwarded verbatim.
    pub namespace_files: NamespaceFiles,

    /// Treat non-empty stderr as warning output rather than a failure
    /// signal.
    pub warn_on_stderr: bool,
}

/// Result of one command sequence run.
///
/// Created once per run and returned to the caller unchanged.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Exit code of the command sequence.
    pub exit_code: i32,

    /// Captured stdout text.
    pub stdout: String,

    /// Captured stderr text.
    pub stderr: String,

    /// Structured outputs extracted from the stdout marker protocol.
    pub outputs: HashMap<String, Value>,

    /// Declared output files that exist after the run.
    pub output_files: Vec<PathBuf>,
}

impl ExecutionResult {
    /// Whether the command sequence exited zero.
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Execution backend that runs an assembled invocation.
///
/// Implementations own process isolation and stream multiplexing; the task
/// core only shapes the request and forwards the response.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the invocation to completion and return its captured result.
    ///
    /// Fails with [`RunnerError::Start`] when the environment cannot be
    /// brought up (e.g. an image pull failure); a failing command sequence
    /// is a non-zero [`ExecutionResult::exit_code`], not an error.
    async fn run(&self, request: RunRequest) -> Result<ExecutionResult, RunnerError>;
}
