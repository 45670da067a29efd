//! gcloud command execution as a workflow task.
//!
//! This crate implements the task core: composing a `/bin/sh` invocation
//! from declared command lines, materializing a service account key into a
//! per-run temp file, composing the process environment with a fixed
//! precedence, and dispatching to a pluggable [`CommandRunner`].
//!
//! The surrounding workflow engine owns variable rendering, the working
//! directory lifecycle, and the execution backend; this crate talks to all
//! three through traits. Reference backends live in the
//! `gcloudtask-runner` crate, and the `gcloudtask` binary wires everything
//! together for local runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use gcloudtask_core::{GcloudTask, RunContext, TempWorkDir, Variables};
//!
//! async fn create_bucket(
//!     runner: &dyn gcloudtask_core::CommandRunner,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let task = GcloudTask::new(["gcloud storage buckets create gs://{{ bucket }}"])
//!         .with_project_id("my-gcp-project");
//!
//!     let variables = Variables::new().with("bucket", "my-bucket");
//!     let workdir = TempWorkDir::new()?;
//!     let ctx = RunContext {
//!         renderer: &variables,
//!         workdir: &workdir,
//!     };
//!
//!     let result = task.run(&ctx, runner).await?;
//!     println!("exit code: {}", result.exit_code);
//!     Ok(())
//! }
//! ```

pub mod credential;
pub mod docker;
pub mod env;
pub mod error;
pub mod files;
pub mod outputs;
pub mod render;
pub mod runner;
pub mod script;
pub mod task;
pub mod workdir;

// Re-export commonly used types
pub use docker::{DockerOptions, PullPolicy, DEFAULT_IMAGE};
pub use error::TaskError;
pub use files::NamespaceFiles;
pub use render::{RenderError, Renderer, Variables};
pub use runner::{CommandRunner, ExecutionResult, RunRequest, RunnerError};
pub use script::AssembledInvocation;
pub use task::{GcloudTask, RunContext};
pub use workdir::{TempWorkDir, WorkDir};
