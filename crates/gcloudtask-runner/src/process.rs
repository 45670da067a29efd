//! Local subprocess runner.

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{ChildStderr, ChildStdout, Command};
use tracing::{debug, error, info, warn};

use gcloudtask_core::{outputs, CommandRunner, ExecutionResult, RunRequest, RunnerError};

use crate::staging;

/// Runs the assembled invocation as a local child process.
///
/// Container options are ignored; isolation is whatever the host process
/// provides. Intended for local development, tests, and environments where
/// the cloud SDK is already installed.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Create a new process runner.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, request: RunRequest) -> Result<ExecutionResult, RunnerError> {
        staging::stage_input_files(&request.working_dir, &request.input_files)?;

        let (program, args) = request
            .invocation
            .interpreter
            .split_first()
            .ok_or_else(|| RunnerError::Start("empty interpreter".to_string()))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .arg(&request.invocation.script)
            .current_dir(&request.working_dir)
            .envs(&request.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(
            program = %program,
            working_dir = %request.working_dir.display(),
            "Spawning command sequence"
        );

        let mut child = cmd
            .spawn()
            .map_err(|e| RunnerError::Start(format!("failed to spawn {program}: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::Start("missing stdout handle".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::Start("missing stderr handle".to_string()))?;

        let stdout_task = tokio::spawn(capture_stdout(stdout));
        let stderr_task = tokio::spawn(capture_stderr(stderr, request.warn_on_stderr));

        let status = child.wait().await?;
        let stdout_text = stdout_task.await.unwrap_or_default();
        let stderr_text = stderr_task.await.unwrap_or_default();

        let exit_code = status.code().unwrap_or(-1);
        if exit_code != 0 {
            warn!(exit_code, "Command sequence exited non-zero");
        }

        let outputs = outputs::extract(&stdout_text);
        let output_files =
            staging::collect_output_files(&request.working_dir, &request.output_files);

        Ok(ExecutionResult {
            exit_code,
            stdout: stdout_text,
            stderr: stderr_text,
            outputs,
            output_files,
        })
    }
}

/// Read stdout to EOF, logging each line and keeping the full text.
async fn capture_stdout(stdout: ChildStdout) -> String {
    let mut reader = BufReader::new(stdout);
    let mut line = String::new();
    let mut captured = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break, // EOF
            Ok(_) => {
                let trimmed = line.trim_end();
                if !trimmed.is_empty() {
                    info!(line = %trimmed, "Command stdout");
                }
                captured.push_str(&line);
            }
            Err(e) => {
                error!(error = %e, "Error reading command stdout");
                break;
            }
        }
    }

    captured
}

/// Read stderr to EOF; lines are warnings under the warn-on-stderr flag.
async fn capture_stderr(stderr: ChildStderr, warn_on_stderr: bool) -> String {
    let mut reader = BufReader::new(stderr);
    let mut line = String::new();
    let mut captured = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break, // EOF
            Ok(_) => {
                let trimmed = line.trim_end();
                if !trimmed.is_empty() {
                    if warn_on_stderr {
                        warn!(line = %trimmed, "Command stderr");
                    } else {
                        info!(line = %trimmed, "Command stderr");
                    }
                }
                captured.push_str(&line);
            }
            Err(e) => {
                error!(error = %e, "Error reading command stderr");
                break;
            }
        }
    }

    captured
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcloudtask_core::{script, DockerOptions, NamespaceFiles};
    use std::collections::HashMap;
    use std::path::Path;

    fn request(commands: &[&str], working_dir: &Path) -> RunRequest {
        let commands: Vec<String> = commands.iter().map(|s| s.to_string()).collect();
        RunRequest {
            invocation: script::assemble(&commands, DockerOptions::default()),
            env: HashMap::new(),
            working_dir: working_dir.to_path_buf(),
            input_files: HashMap::new(),
            output_files: Vec::new(),
            namespace_files: NamespaceFiles::default(),
            warn_on_stderr: true,
        }
    }

    #[tokio::test]
    async fn test_captures_stdout_and_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProcessRunner::new()
            .run(request(&["echo hello", "echo world"], dir.path()))
            .await
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert!(result.success());
        assert_eq!(result.stdout, "hello\nworld\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_a_result_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProcessRunner::new()
            .run(request(&["exit 3"], dir.path()))
            .await
            .unwrap();

        assert_eq!(result.exit_code, 3);
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_stderr_is_captured_without_failing_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProcessRunner::new()
            .run(request(&["echo warning >&2", "true"], dir.path()))
            .await
            .unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stderr, "warning\n");
    }

    #[tokio::test]
    async fn test_env_reaches_the_command_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(&["echo $CLOUDSDK_CORE_PROJECT"], dir.path());
        req.env
            .insert("CLOUDSDK_CORE_PROJECT".to_string(), "proj-1".to_string());

        let result = ProcessRunner::new().run(req).await.unwrap();
        assert_eq!(result.stdout, "proj-1\n");
    }

    #[tokio::test]
    async fn test_outputs_marker_is_extracted() {
        let dir = tempfile::tempdir().unwrap();
        let result = ProcessRunner::new()
            .run(request(
                &[r#"echo '::{"outputs":{"bucket":"gs://b"}}::'"#],
                dir.path(),
            ))
            .await
            .unwrap();

        assert_eq!(
            result.outputs.get("bucket"),
            Some(&serde_json::json!("gs://b"))
        );
    }

    #[tokio::test]
    async fn test_input_files_are_staged_and_outputs_collected() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(&["cp data.csv copied.csv"], dir.path());
        req.input_files
            .insert("data.csv".to_string(), "a,b\n".to_string());
        req.output_files = vec!["copied.csv".to_string(), "never-made.csv".to_string()];

        let result = ProcessRunner::new().run(req).await.unwrap();

        assert_eq!(result.exit_code, 0);
        assert_eq!(result.output_files, vec![dir.path().join("copied.csv")]);
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_a_start_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut req = request(&["true"], dir.path());
        req.invocation.interpreter = vec!["/no/such/interpreter".to_string(), "-c".to_string()];

        let err = ProcessRunner::new().run(req).await.unwrap_err();
        assert!(matches!(err, RunnerError::Start(_)));
    }
}
