//! Environment composition with a fixed precedence order.

use std::collections::HashMap;

/// Environment variable gcloud reads the scoped project from.
pub const PROJECT_ENV: &str = "CLOUDSDK_CORE_PROJECT";

/// Merge the three environment sources into the final mapping.
///
/// Precedence, later overwrites earlier on key collision:
/// credential bindings, then the project binding, then user-declared
/// overrides. Keys pass through unvalidated; the result is deterministic
/// for identical inputs.
pub fn compose(
    credential_bindings: Vec<(String, String)>,
    project_id: Option<String>,
    user_env: Vec<(String, String)>,
) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.extend(credential_bindings);
    if let Some(project) = project_id {
        env.insert(PROJECT_ENV.to_string(), project);
    }
    env.extend(user_env);
    env
}
