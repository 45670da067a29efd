//! Variable rendering for templated task properties.
//!
//! The workflow engine resolves `{{ expression }}` placeholders against a
//! run-scoped variable context before this crate touches the values. The
//! [`Renderer`] trait is that boundary; [`Variables`] is a map-backed
//! implementation for local runs and tests.

use std::collections::HashMap;

use thiserror::Error;

/// Errors raised while rendering a templated string.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template referenced a variable that is not defined.
    #[error("Undefined variable '{0}' in template")]
    UndefinedVariable(String),

    /// A `{{` placeholder was never closed.
    #[error("Unclosed '{{{{' placeholder in template")]
    UnclosedPlaceholder,
}

/// Resolves `{{ expression }}` placeholders in a templated string.
pub trait Renderer: Send + Sync {
    /// Render a single templated string.
    ///
    /// Fails if a referenced variable is undefined.
    fn render(&self, template: &str) -> Result<String, RenderError>;
}

/// Map-backed renderer for `{{ var }}` placeholders.
///
/// Whitespace inside the braces is ignored: `{{bucket}}` and
/// `{{ bucket }}` resolve the same variable. Text outside placeholders
/// passes through untouched.
#[derive(Debug, Clone, Default)]
pub struct Variables {
    values: HashMap<String, String>,
}

impl Variables {
    /// Create an empty variable context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to add a variable.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Add a variable to the context.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }
}

impl Renderer for Variables {
    fn render(&self, template: &str) -> Result<String, RenderError> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find("{{") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find("}}").ok_or(RenderError::UnclosedPlaceholder)?;
            let name = after[..end].trim();
            let value = self
                .values
                .get(name)
                .ok_or_else(|| RenderError::UndefinedVariable(name.to_string()))?;
            out.push_str(value);
            rest = &after[end + 2..];
        }

        out.push_str(rest);
        Ok(out)
    }
}
