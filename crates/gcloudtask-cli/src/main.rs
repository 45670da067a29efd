//! gcloudtask CLI - run a gcloud task definition locally.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use gcloudtask_core::{CommandRunner, GcloudTask, RunContext, TempWorkDir, Variables};
use gcloudtask_runner::{DockerRunner, ProcessRunner};

/// gcloudtask - run gcloud command sequences as workflow tasks
#[derive(Parser)]
#[command(name = "gcloudtask")]
#[command(about = "Run gcloud command sequences as workflow tasks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a task definition
    Run {
        /// Path to the YAML task definition
        file: PathBuf,

        /// Template variables, key=value; may repeat
        #[arg(short = 'v', long = "var", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,

        /// Execution backend
        #[arg(short, long, value_enum, default_value = "docker")]
        runner: RunnerKind,

        /// Keep the working directory on disk after the run
        #[arg(long)]
        keep_workdir: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RunnerKind {
    /// Local subprocess; requires gcloud on the host
    Process,
    /// Container via the docker CLI
    Docker,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected key=value, got '{s}'"))
}

/// Report printed to stdout after a run; logs go to stderr.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    run_id: String,
    exit_code: i32,
    outputs: HashMap<String, serde_json::Value>,
    output_files: Vec<PathBuf>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            file,
            vars,
            runner,
            keep_workdir,
        } => match run_task(file, vars, runner, keep_workdir).await {
            Ok(exit_code) => ExitCode::from(exit_code),
            Err(e) => {
                error!(error = %e, "Task run failed");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run_task(
    file: PathBuf,
    vars: Vec<(String, String)>,
    runner_kind: RunnerKind,
    keep_workdir: bool,
) -> Result<u8, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(&file)?;
    let task: GcloudTask = serde_yaml::from_str(&raw)?;

    let mut variables = Variables::new();
    for (key, value) in vars {
        variables.insert(key, value);
    }

    let workdir = TempWorkDir::new()?;
    let run_id = Uuid::new_v4();
    info!(%run_id, file = %file.display(), "Starting task run");

    let runner: Box<dyn CommandRunner> = match runner_kind {
        RunnerKind::Process => Box::new(ProcessRunner::new()),
        RunnerKind::Docker => Box::new(DockerRunner::new()),
    };

    let started_at = Utc::now();
    let result = {
        let ctx = RunContext {
            renderer: &variables,
            workdir: &workdir,
        };
        task.run(&ctx, runner.as_ref()).await?
    };
    let finished_at = Utc::now();

    let report = RunReport {
        run_id: run_id.to_string(),
        exit_code: result.exit_code,
        outputs: result.outputs,
        output_files: result.output_files,
        started_at,
        finished_at,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if keep_workdir {
        let path = workdir.into_path();
        info!(path = %path.display(), "Working directory kept");
    }

    Ok(exit_status(result.exit_code))
}

/// Map the command sequence's exit code onto the process exit status.
fn exit_status(exit_code: i32) -> u8 {
    u8::try_from(exit_code).unwrap_or(1)
}
