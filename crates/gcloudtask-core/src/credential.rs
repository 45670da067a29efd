//! Credential materialization: a rendered secret becomes an on-disk key
//! file discoverable by gcloud.

use crate::error::TaskError;
use crate::workdir::WorkDir;

/// Generic credential-file variable read by Google client libraries.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// gcloud-specific override pointing at the same file.
pub const CREDENTIAL_OVERRIDE_ENV: &str = "CLOUDSDK_AUTH_CREDENTIAL_FILE_OVERRIDE";

/// Write the service account key into a temp file inside the working
/// directory and return the env bindings that make gcloud discover it.
///
/// The secret must already be fully rendered; no templating happens here.
/// Returns an empty binding set when no secret is configured, creating no
/// file. The file's lifetime is owned by the working-directory scope.
pub fn materialize(
    workdir: &dyn WorkDir,
    secret: Option<&str>,
) -> Result<Vec<(String, String)>, TaskError> {
    let Some(secret) = secret else {
        return Ok(Vec::new());
    };

    let path = workdir
        .create_temp_file(secret.as_bytes())
        .map_err(TaskError::CredentialIo)?;
    let path = path.to_string_lossy().into_owned();

    Ok(vec![
        (CREDENTIALS_ENV.to_string(), path.clone()),
        (CREDENTIAL_OVERRIDE_ENV.to_string(), path),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workdir::TempWorkDir;

    #[test]
    fn test_no_secret_creates_no_file() {
        let workdir = TempWorkDir::new().unwrap();
        let bindings = materialize(&workdir, None).unwrap();

        assert!(bindings.is_empty());
        assert_eq!(std::fs::read_dir(workdir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_secret_yields_one_file_and_both_bindings() {
        let workdir = TempWorkDir::new().unwrap();
        let bindings = materialize(&workdir, Some("{\"type\":\"service_account\"}")).unwrap();

        assert_eq!(std::fs::read_dir(workdir.path()).unwrap().count(), 1);
        assert_eq!(bindings.len(), 2);

        let keys: Vec<&str> = bindings.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&CREDENTIALS_ENV));
        assert!(keys.contains(&CREDENTIAL_OVERRIDE_ENV));

        // Both bindings point at the same file, holding the secret bytes.
        assert_eq!(bindings[0].1, bindings[1].1);
        assert_eq!(
            std::fs::read_to_string(&bindings[0].1).unwrap(),
            "{\"type\":\"service_account\"}"
        );
    }
}
