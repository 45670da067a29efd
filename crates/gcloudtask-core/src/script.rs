//! Command assembly: logical command lines into one runner-ready
//! invocation.

use crate::docker::DockerOptions;

/// Interpreter prefix the script body is executed through.
pub const INTERPRETER: [&str; 2] = ["/bin/sh", "-c"];

/// A runner-ready invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledInvocation {
    /// Interpreter argv prefix, `/bin/sh -c`.
    pub interpreter: Vec<String>,

    /// Newline-joined command lines, exactly as declared.
    pub script: String,

    /// Runner options with the image default applied.
    pub docker: DockerOptions,
}

/// Join rendered command lines into a single invocation.
///
/// Line order and text are preserved verbatim; the only transformation is
/// the newline join. The docker image default is applied here, once.
pub fn assemble(commands: &[String], docker: DockerOptions) -> AssembledInvocation {
    AssembledInvocation {
        interpreter: INTERPRETER.iter().map(|s| s.to_string()).collect(),
        script: commands.join("\n"),
        docker: docker.with_defaults(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::DEFAULT_IMAGE;

    #[test]
    fn test_preserves_order_and_text() {
        let commands = vec![
            "gcloud container clusters create simple-cluster --region=europe-west3".to_string(),
            "gcloud container clusters list".to_string(),
        ];

        let invocation = assemble(&commands, DockerOptions::default());

        assert_eq!(
            invocation.script,
            "gcloud container clusters create simple-cluster --region=europe-west3\n\
             gcloud container clusters list"
        );
        let first = invocation.script.find("clusters create").unwrap();
        let second = invocation.script.find("clusters list").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_single_command_has_no_trailing_newline() {
        let commands = vec!["gcloud pubsub topics list".to_string()];
        let invocation = assemble(&commands, DockerOptions::default());
        assert_eq!(invocation.script, "gcloud pubsub topics list");
    }

    #[test]
    fn test_uses_the_shell_interpreter() {
        let invocation = assemble(&["true".to_string()], DockerOptions::default());
        assert_eq!(invocation.interpreter, vec!["/bin/sh", "-c"]);
    }

    #[test]
    fn test_applies_image_default() {
        let invocation = assemble(&["true".to_string()], DockerOptions::default());
        assert_eq!(invocation.docker.image.as_deref(), Some(DEFAULT_IMAGE));
    }
}
