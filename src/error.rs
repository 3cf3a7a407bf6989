//! Top-level error types for the DMG bundler binary.
//!
//! Library failures arrive as [`crate::bundler::Error`]; this module adds the
//! argument and environment problems the command line surface can hit before
//! a build starts.

use thiserror::Error;

/// Result type alias for bundler operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for all bundler operations
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Bundler errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),

    /// Generic errors from anyhow, rendered with their context chain
    #[error("{0:#}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Required macOS utilities are not installed
    #[error("Required tools not found in PATH: {}", tools.join(", "))]
    MissingTools {
        /// Tool names
        tools: Vec<String>,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl BundlerError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        use crate::bundler::Error as Inner;

        match self {
            BundlerError::Cli(CliError::MissingTools { .. }) => vec![
                "DMG creation requires macOS with hdiutil, sips and iconutil".to_string(),
                "Install the Xcode command line tools: xcode-select --install".to_string(),
            ],
            BundlerError::Bundler(e) => match e.root_cause() {
                Inner::AlreadyExists { path } => vec![format!(
                    "Remove {} or choose another --output-dir",
                    path.display()
                )],
                Inner::Validation(_) => {
                    vec!["Pass the missing values as flags or through --manifest".to_string()]
                }
                Inner::MountTimeout { .. } | Inner::UnmountTimeout { .. } => vec![
                    "Check `hdiutil info` for stale volumes and detach them".to_string(),
                    "Raise --poll-attempts on slow machines".to_string(),
                ],
                _ => vec!["Check the error message above for specific details".to_string()],
            },
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, BundlerError::Cli(CliError::MissingTools { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{Error, FieldErrors};
    use std::path::PathBuf;

    #[test]
    fn missing_tools_lists_every_tool() {
        let err = BundlerError::from(CliError::MissingTools {
            tools: vec!["hdiutil".into(), "sips".into()],
        });
        assert_eq!(
            err.to_string(),
            "CLI error: Required tools not found in PATH: hdiutil, sips"
        );
        assert!(!err.is_recoverable());
    }

    #[test]
    fn suggestions_follow_root_cause() {
        let err = BundlerError::from(
            Error::AlreadyExists {
                path: PathBuf::from("out/Greeter.dmg"),
            }
            .at(crate::bundler::Stage::CheckArtifact),
        );
        assert!(err.recovery_suggestions()[0].contains("out/Greeter.dmg"));

        let mut fields = FieldErrors::default();
        fields.push("app-name", "cannot be blank");
        let err = BundlerError::from(Error::Validation(fields));
        assert!(err.recovery_suggestions()[0].contains("--manifest"));
    }

    #[test]
    fn anyhow_errors_keep_their_context_chain() {
        let err = BundlerError::from(
            anyhow::anyhow!("task 7 panicked").context("build task did not complete"),
        );
        assert_eq!(err.to_string(), "build task did not complete: task 7 panicked");
    }
}
