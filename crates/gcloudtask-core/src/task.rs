//! The gcloud task definition and its run pipeline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::credential;
use crate::docker::DockerOptions;
use crate::env;
use crate::error::TaskError;
use crate::files::NamespaceFiles;
use crate::render::Renderer;
use crate::runner::{CommandRunner, ExecutionResult, RunRequest};
use crate::script;
use crate::workdir::WorkDir;

/// Collaborators the orchestrator supplies for one execution.
pub struct RunContext<'a> {
    /// Resolves `{{ var }}` placeholders in templated properties.
    pub renderer: &'a dyn Renderer,

    /// Per-execution filesystem sandbox; owns the credential file's
    /// lifetime.
    pub workdir: &'a dyn WorkDir,
}

/// A gcloud command sequence, executed as one workflow step.
///
/// The caller owns the definition; a run never mutates it. `serviceAccount`,
/// `projectId`, the command lines and `env` values are templated and go
/// through the [`Renderer`] before anything else happens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GcloudTask {
    /// Full service account JSON key used to authenticate to gcloud.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,

    /// GCP project ID the commands are scoped to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// The commands to run, in order, one full CLI invocation line each.
    pub commands: Vec<String>,

    /// Additional environment variables for the command sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env: Option<HashMap<String, String>>,

    /// Options for container-backed runners.
    pub docker: DockerOptions,

    /// Namespace file selection, forwarded verbatim to the runner.
    pub namespace_files: NamespaceFiles,

    /// Files staged into the working directory before the run.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub input_files: HashMap<String, String>,

    /// Files the commands are expected to produce.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_files: Vec<String>,
}

impl GcloudTask {
    /// Create a task from its command lines.
    pub fn new(commands: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            commands: commands.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Builder method to set the service account key.
    pub fn with_service_account(mut self, secret: impl Into<String>) -> Self {
        self.service_account = Some(secret.into());
        self
    }

    /// Builder method to set the project ID.
    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Builder method to add an environment variable.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Builder method to set container options.
    pub fn with_docker(mut self, docker: DockerOptions) -> Self {
        self.docker = docker;
        self
    }

    /// Builder method to stage an input file.
    pub fn with_input_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.input_files.insert(name.into(), content.into());
        self
    }

    /// Builder method to declare expected output files.
    pub fn with_output_files(mut self, files: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.output_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Check the configuration before any side effect.
    pub fn validate(&self) -> Result<(), TaskError> {
        if self.commands.is_empty() {
            return Err(TaskError::MissingCommands);
        }
        Ok(())
    }

    /// Run the command sequence through the given runner.
    ///
    /// Steps execute strictly in sequence: render all templated properties,
    /// materialize the credential file, compose the environment, assemble
    /// the invocation, dispatch. The call resolves when the runner
    /// finishes. A non-zero exit code is reported through the result, not
    /// as an error; stderr content alone never fails a run.
    pub async fn run(
        &self,
        ctx: &RunContext<'_>,
        runner: &dyn CommandRunner,
    ) -> Result<ExecutionResult, TaskError> {
        self.validate()?;

        // Rendering happens first so a bad template cannot leave a
        // credential file behind.
        let service_account = self
            .service_account
            .as_deref()
            .map(|secret| ctx.renderer.render(secret))
            .transpose()?;

        let project_id = self
            .project_id
            .as_deref()
            .map(|project| ctx.renderer.render(project))
            .transpose()?;

        let mut user_env = Vec::new();
        if let Some(env) = &self.env {
            for (key, value) in env {
                user_env.push((key.clone(), ctx.renderer.render(value)?));
            }
        }

        let mut commands = Vec::with_capacity(self.commands.len());
        for line in &self.commands {
            commands.push(ctx.renderer.render(line)?);
        }

        let credential_bindings =
            credential::materialize(ctx.workdir, service_account.as_deref())?;

        let env = env::compose(credential_bindings, project_id, user_env);

        let invocation = script::assemble(&commands, self.docker.clone());

        info!(
            commands = commands.len(),
            image = invocation.docker.image.as_deref().unwrap_or_default(),
            "Dispatching gcloud command sequence"
        );

        let request = RunRequest {
            invocation,
            env,
            working_dir: ctx.workdir.path().to_path_buf(),
            input_files: self.input_files.clone(),
            output_files: self.output_files.clone(),
            namespace_files: self.namespace_files.clone(),
            warn_on_stderr: true,
        };

        let result = runner.run(request).await?;

        debug!(
            exit_code = result.exit_code,
            outputs = result.outputs.len(),
            output_files = result.output_files.len(),
            "Command sequence finished"
        );

        Ok(result)
    }
}
