//! External command execution.
//!
//! Every external tool (hdiutil, sips, iconutil) is reached through the
//! [`CommandRunner`] trait, so tests and embedders can substitute their own
//! implementation without touching process-wide state.

use crate::bundler::error::{Error, Result};
use async_trait::async_trait;
use std::path::Path;

/// Runs one external command to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args`, returning captured stdout and stderr.
    ///
    /// A non-zero exit status is an [`Error::ExternalTool`] carrying the
    /// captured output.
    async fn run(&self, program: &str, args: &[String]) -> Result<String>;
}

/// Renders a command line for logs and error messages.
pub fn display_command(program: &str, args: &[String]) -> String {
    let mut rendered = program.to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

/// Converts a path to a command argument, rejecting non-UTF8 paths.
pub fn path_arg(path: &Path) -> Result<String> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        Error::GenericError(format!(
            "Path contains non-UTF8 characters: {}",
            path.display()
        ))
    })
}

/// [`CommandRunner`] backed by `tokio::process`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemCommandRunner;

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String> {
        let command = display_command(program, args);
        log::debug!("Running [{}]", command);

        let output = tokio::process::Command::new(program)
            .args(args)
            .output()
            .await
            .map_err(|e| Error::ExternalTool {
                command: command.clone(),
                status: "failed to spawn".to_string(),
                output: e.to_string(),
            })?;

        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(Error::ExternalTool {
                command,
                status: output.status.to_string(),
                output: captured.trim().to_string(),
            });
        }

        Ok(captured)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn path_arg_rejects_non_utf8() {
        use std::os::unix::ffi::OsStrExt;

        assert_eq!(path_arg(Path::new("/tmp/Greeter.dmg")).unwrap(), "/tmp/Greeter.dmg");
        let invalid = Path::new(std::ffi::OsStr::from_bytes(b"/tmp/icon\xff.png"));
        let err = path_arg(invalid).unwrap_err();
        assert!(err.to_string().contains("non-UTF8"));
    }

    #[tokio::test]
    async fn captures_output_of_successful_command() {
        let out = SystemCommandRunner
            .run("sh", &["-c".into(), "echo attached; echo warn >&2".into()])
            .await
            .unwrap();
        assert!(out.contains("attached"));
        assert!(out.contains("warn"));
    }

    #[tokio::test]
    async fn non_zero_exit_is_external_tool_error() {
        let err = SystemCommandRunner
            .run("sh", &["-c".into(), "echo resource busy >&2; exit 16".into()])
            .await
            .unwrap_err();
        match err {
            Error::ExternalTool { command, output, .. } => {
                assert!(command.starts_with("sh -c"));
                assert_eq!(output, "resource busy");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_external_tool_error() {
        let err = SystemCommandRunner
            .run("kodegen-definitely-not-installed", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ExternalTool { ref status, .. } if status == "failed to spawn"));
    }
}
