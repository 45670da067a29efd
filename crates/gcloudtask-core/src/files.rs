//! File-staging declarations, forwarded verbatim to the runner.

use serde::{Deserialize, Serialize};

/// Selection of namespace-hosted files to stage into the working directory.
///
/// Opaque to the task core: the orchestrator's runner decides how (and
/// whether) these are materialized. The reference runners ignore them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NamespaceFiles {
    /// Whether namespace files are staged at all.
    pub enabled: bool,

    /// Glob patterns to include.
    pub include: Vec<String>,

    /// Glob patterns to exclude.
    pub exclude: Vec<String>,
}

impl Default for NamespaceFiles {
    fn default() -> Self {
        Self {
            enabled: true,
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }
}
