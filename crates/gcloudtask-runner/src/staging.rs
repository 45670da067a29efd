//! File staging shared by the reference runners.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use gcloudtask_core::RunnerError;

/// Reject declarations that would escape the working directory.
fn ensure_relative(name: &str) -> Result<(), RunnerError> {
    let path = Path::new(name);
    if path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(RunnerError::Staging(format!(
            "'{name}' must stay inside the working directory"
        )));
    }
    Ok(())
}

/// Write declared input files into the working directory.
///
/// Names are taken relative to the working directory; parent directories
/// are created as needed.
pub(crate) fn stage_input_files(
    working_dir: &Path,
    input_files: &HashMap<String, String>,
) -> Result<(), RunnerError> {
    for (name, content) in input_files {
        ensure_relative(name)?;
        let path = working_dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        debug!(file = %path.display(), "Staged input file");
    }
    Ok(())
}

/// Collect declared output files that exist after the run.
///
/// Missing declared files are logged, not errors; the caller decides what
/// an absent output means.
pub(crate) fn collect_output_files(working_dir: &Path, declared: &[String]) -> Vec<PathBuf> {
    let mut produced = Vec::new();
    for name in declared {
        let path = working_dir.join(name);
        if path.is_file() {
            produced.push(path);
        } else {
            warn!(file = %name, "Declared output file was not produced");
        }
    }
    produced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_files_with_nested_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut input_files = HashMap::new();
        input_files.insert("config/settings.yaml".to_string(), "a: 1\n".to_string());

        stage_input_files(dir.path(), &input_files).unwrap();

        assert_eq!(
            std::fs::read_to_string(dir.path().join("config/settings.yaml")).unwrap(),
            "a: 1\n"
        );
    }

    #[test]
    fn test_rejects_escaping_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut input_files = HashMap::new();
        input_files.insert("../evil.sh".to_string(), "rm -rf /".to_string());

        let err = stage_input_files(dir.path(), &input_files).unwrap_err();
        assert!(matches!(err, RunnerError::Staging(_)));
    }

    #[test]
    fn test_rejects_absolute_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mut input_files = HashMap::new();
        input_files.insert("/etc/passwd".to_string(), String::new());

        assert!(stage_input_files(dir.path(), &input_files).is_err());
    }

    #[test]
    fn test_collects_only_existing_outputs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("report.json"), "{}").unwrap();

        let produced = collect_output_files(
            dir.path(),
            &["report.json".to_string(), "missing.json".to_string()],
        );

        assert_eq!(produced, vec![dir.path().join("report.json")]);
    }
}
