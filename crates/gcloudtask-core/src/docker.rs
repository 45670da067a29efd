//! Container options forwarded to the runner.

use serde::{Deserialize, Serialize};

/// Image used when the task does not declare one.
pub const DEFAULT_IMAGE: &str = "google/cloud-sdk";

/// Image pull behavior for container-backed runners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PullPolicy {
    Always,
    IfNotPresent,
    Never,
}

impl PullPolicy {
    /// Value for the docker CLI `--pull` flag.
    pub fn as_flag(&self) -> &'static str {
        match self {
            PullPolicy::Always => "always",
            PullPolicy::IfNotPresent => "missing",
            PullPolicy::Never => "never",
        }
    }
}

/// Options for container-backed runners.
///
/// Only `image` carries an implicit default; every other option must be
/// explicit and passes through to the runner unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DockerOptions {
    /// Container image. Defaults to [`DEFAULT_IMAGE`] when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Image pull behavior.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pull_policy: Option<PullPolicy>,

    /// User (`uid[:gid]`) to run as inside the container.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Entrypoint override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entrypoint: Option<String>,

    /// Container network mode, e.g. `bridge`, `host`, `none`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_mode: Option<String>,

    /// Additional volume binds in `host:container` form.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volumes: Option<Vec<String>>,

    /// CPU limit, e.g. `0.5`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpus: Option<String>,

    /// Memory limit, e.g. `256m`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

impl DockerOptions {
    /// Apply implicit defaults, leaving every explicit option untouched.
    pub fn with_defaults(mut self) -> Self {
        if self.image.is_none() {
            self.image = Some(DEFAULT_IMAGE.to_string());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_image_gets_the_default() {
        let options = DockerOptions::default().with_defaults();
        assert_eq!(options.image.as_deref(), Some(DEFAULT_IMAGE));
    }

    #[test]
    fn test_explicit_image_is_preserved() {
        let options = DockerOptions {
            image: Some("google/cloud-sdk:slim".to_string()),
            ..Default::default()
        }
        .with_defaults();

        assert_eq!(options.image.as_deref(), Some("google/cloud-sdk:slim"));
    }

    #[test]
    fn test_other_options_pass_through_unchanged() {
        let options = DockerOptions {
            pull_policy: Some(PullPolicy::Never),
            user: Some("1000:1000".to_string()),
            memory: Some("256m".to_string()),
            ..Default::default()
        };

        let defaulted = options.clone().with_defaults();
        assert_eq!(defaulted.pull_policy, options.pull_policy);
        assert_eq!(defaulted.user, options.user);
        assert_eq!(defaulted.memory, options.memory);
    }

    #[test]
    fn test_pull_policy_deserializes_screaming_case() {
        let options: DockerOptions =
            serde_json::from_str(r#"{"image":"busybox","pullPolicy":"IF_NOT_PRESENT"}"#).unwrap();
        assert_eq!(options.pull_policy, Some(PullPolicy::IfNotPresent));
        assert_eq!(options.pull_policy.unwrap().as_flag(), "missing");
    }
}
