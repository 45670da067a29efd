//! Per-execution working directory scope.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use uuid::Uuid;

/// A per-execution filesystem sandbox.
///
/// Holds staged input/output files and temp credential files. The
/// orchestrator creates and tears the scope down; tasks only request file
/// creation inside it.
pub trait WorkDir: Send + Sync {
    /// Root of the sandbox.
    fn path(&self) -> &Path;

    /// Create a fresh file inside the sandbox with the given contents and
    /// return its path.
    fn create_temp_file(&self, contents: &[u8]) -> io::Result<PathBuf>;
}

/// Working directory backed by a [`tempfile::TempDir`].
///
/// The directory and everything inside it are removed on drop.
#[derive(Debug)]
pub struct TempWorkDir {
    dir: TempDir,
}

impl TempWorkDir {
    /// Create a fresh sandbox under the system temp directory.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
        })
    }

    /// Persist the directory on disk and return its path.
    ///
    /// After this call the directory is no longer removed on drop.
    pub fn into_path(self) -> PathBuf {
        self.dir.into_path()
    }
}

impl WorkDir for TempWorkDir {
    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn create_temp_file(&self, contents: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.path().join(Uuid::new_v4().to_string());
        std::fs::write(&path, contents)?;

        // Credential material lands here; keep it owner-readable only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))?;
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_file_is_created_inside_the_scope() {
        let workdir = TempWorkDir::new().unwrap();
        let path = workdir.create_temp_file(b"{\"type\":\"service_account\"}").unwrap();

        assert!(path.starts_with(workdir.path()));
        assert_eq!(
            std::fs::read(&path).unwrap(),
            b"{\"type\":\"service_account\"}"
        );
    }

    #[test]
    fn test_each_temp_file_is_distinct() {
        let workdir = TempWorkDir::new().unwrap();
        let a = workdir.create_temp_file(b"a").unwrap();
        let b = workdir.create_temp_file(b"b").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_scope_teardown_removes_files() {
        let workdir = TempWorkDir::new().unwrap();
        let root = workdir.path().to_path_buf();
        let path = workdir.create_temp_file(b"secret").unwrap();
        drop(workdir);

        assert!(!path.exists());
        assert!(!root.exists());
    }
}
