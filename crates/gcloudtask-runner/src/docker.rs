//! `docker run`-backed runner.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use gcloudtask_core::{outputs, CommandRunner, ExecutionResult, RunRequest, RunnerError};

use crate::staging;

/// Exit code the docker client reserves for its own failures (bad flags,
/// pull errors, daemon unreachable), as opposed to the command's.
const DOCKER_STARTUP_FAILURE: i32 = 125;

const STDERR_LOG_LIMIT: usize = 2048;

/// Runs the assembled invocation inside a container via the docker CLI.
///
/// The working directory is bound into the container at the identical host
/// path and set as the container workdir, so env bindings that reference
/// staged files (the credential file in particular) stay valid inside.
#[derive(Debug, Clone)]
pub struct DockerRunner {
    /// Container runtime binary.
    binary: String,
}

impl Default for DockerRunner {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
        }
    }
}

impl DockerRunner {
    /// Create a runner that shells out to `docker`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different docker-compatible binary (e.g. `podman`).
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Assemble the full `docker run` argument list for a request.
    fn build_args(request: &RunRequest) -> Result<Vec<String>, RunnerError> {
        let docker = &request.invocation.docker;
        let image = docker
            .image
            .as_deref()
            .ok_or_else(|| RunnerError::Start("no container image configured".to_string()))?;

        let workdir = request.working_dir.to_string_lossy().into_owned();

        let mut args: Vec<String> = vec!["run".to_string(), "--rm".to_string()];

        if let Some(policy) = docker.pull_policy {
            args.push("--pull".to_string());
            args.push(policy.as_flag().to_string());
        }

        // Identical-path bind keeps credential-file env values valid.
        args.push("--volume".to_string());
        args.push(format!("{workdir}:{workdir}"));
        args.push("--workdir".to_string());
        args.push(workdir);

        if let Some(user) = &docker.user {
            args.push("--user".to_string());
            args.push(user.clone());
        }

        if let Some(network) = &docker.network_mode {
            args.push("--network".to_string());
            args.push(network.clone());
        }

        for volume in docker.volumes.iter().flatten() {
            args.push("--volume".to_string());
            args.push(volume.clone());
        }

        if let Some(cpus) = &docker.cpus {
            args.push("--cpus".to_string());
            args.push(cpus.clone());
        }

        if let Some(memory) = &docker.memory {
            args.push("--memory".to_string());
            args.push(memory.clone());
        }

        // Sorted for a reproducible command line.
        let mut env_keys: Vec<&String> = request.env.keys().collect();
        env_keys.sort();
        for key in env_keys {
            args.push("--env".to_string());
            args.push(format!("{key}={}", request.env[key]));
        }

        if let Some(entrypoint) = &docker.entrypoint {
            args.push("--entrypoint".to_string());
            args.push(entrypoint.clone());
        }

        args.push(image.to_string());
        args.extend(request.invocation.interpreter.iter().cloned());
        args.push(request.invocation.script.clone());

        Ok(args)
    }
}

#[async_trait]
impl CommandRunner for DockerRunner {
    async fn run(&self, request: RunRequest) -> Result<ExecutionResult, RunnerError> {
        staging::stage_input_files(&request.working_dir, &request.input_files)?;

        let args = Self::build_args(&request)?;
        debug!(binary = %self.binary, args = ?args, "Invoking container runtime");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| RunnerError::Start(format!("failed to invoke {}: {e}", self.binary)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code().unwrap_or(-1);

        // A client-level failure before the command ran is a startup
        // error, not a command result.
        if exit_code == DOCKER_STARTUP_FAILURE && stdout.is_empty() {
            return Err(RunnerError::Start(stderr.trim().to_string()));
        }

        if request.warn_on_stderr && !stderr.trim().is_empty() {
            warn!(stderr = %truncate(&stderr, STDERR_LOG_LIMIT), "Container stderr");
        }
        if exit_code != 0 {
            warn!(exit_code, "Command sequence exited non-zero");
        }

        let outputs = outputs::extract(&stdout);
        let output_files =
            staging::collect_output_files(&request.working_dir, &request.output_files);

        Ok(ExecutionResult {
            exit_code,
            stdout,
            stderr,
            outputs,
            output_files,
        })
    }
}

fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}
