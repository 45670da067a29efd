//! Task-level errors.

use thiserror::Error;

use crate::render::RenderError;
use crate::runner::RunnerError;

/// Errors surfaced by a task run.
///
/// A non-zero exit code of the command sequence is not represented here;
/// it is reported through the execution result and interpreting it is the
/// caller's decision.
#[derive(Debug, Error)]
pub enum TaskError {
    /// `commands` was empty or missing. Checked before any side effect.
    #[error("`commands` must contain at least one command line")]
    MissingCommands,

    /// A templated property referenced an undefined variable.
    #[error("Rendering error: {0}")]
    Render(#[from] RenderError),

    /// The credential file could not be written.
    #[error("Failed to write credential file: {0}")]
    CredentialIo(#[source] std::io::Error),

    /// The runner could not start the execution environment.
    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),
}
