//! Reference execution backends for gcloudtask.
//!
//! [`ProcessRunner`] executes the assembled script as a local subprocess;
//! [`DockerRunner`] shells out to `docker run`. Both implement the
//! `CommandRunner` trait from `gcloudtask-core` and share the same
//! file-staging and output-capture contract.

mod docker;
mod process;
mod staging;

pub use docker::DockerRunner;
pub use process::ProcessRunner;
