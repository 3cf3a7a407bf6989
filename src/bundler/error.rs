//! Error taxonomy for bundle and disk image operations.
//!
//! Every failure raised inside the pipeline is wrapped with the [`Stage`] it
//! happened in, so the rendered message reads as a causal chain from the
//! failing stage down to the originating error.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for bundler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage a failure is attributed to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Stage {
    /// Checking the build request for missing or malformed fields
    Validate,
    /// Refusing to overwrite an existing artifact
    CheckArtifact,
    /// Creating the scratch workspace
    CreateWorkspace,
    /// Creating the `.app` directory skeleton
    CreateBundleDirectories,
    /// Rendering the icon at every required size
    RenderIcons,
    /// Compiling rendered sizes into `icon.icns`
    CompileIcons,
    /// Copying the binary into `Contents/MacOS`
    CopyBinary,
    /// Writing `Contents/Info.plist`
    WriteInfoPlist,
    /// Allocating the writable container
    CreateContainer,
    /// Attaching the container and waiting for the mount point
    Attach,
    /// Adding the Applications shortcut and the bundle to the volume
    Populate,
    /// Detaching the container and waiting for the mount point to vanish
    Detach,
    /// Converting the container into the compressed artifact
    Convert,
    /// Removing the scratch workspace
    Cleanup,
}

impl Stage {
    /// Human readable description used in error chains and progress output.
    pub fn description(self) -> &'static str {
        match self {
            Stage::Validate => "validating build request",
            Stage::CheckArtifact => "checking for an existing DMG",
            Stage::CreateWorkspace => "creating scratch workspace",
            Stage::CreateBundleDirectories => "creating app bundle directories",
            Stage::RenderIcons => "rendering icons",
            Stage::CompileIcons => "compiling icon set",
            Stage::CopyBinary => "copying app binary",
            Stage::WriteInfoPlist => "writing Info.plist",
            Stage::CreateContainer => "creating DMG template",
            Stage::Attach => "mounting DMG template",
            Stage::Populate => "setting up DMG template",
            Stage::Detach => "unmounting DMG template",
            Stage::Convert => "converting DMG template to final DMG",
            Stage::Cleanup => "removing scratch workspace",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A single invalid field of a build request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldError {
    /// Field name as exposed on the command line
    pub field: &'static str,
    /// What is wrong with it
    pub message: String,
}

/// Every invalid field of a build request, reported together.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FieldErrors(pub Vec<FieldError>);

impl FieldErrors {
    /// Records an invalid field.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Returns true when no field failed.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of the offending fields, in the order they were checked.
    pub fn fields(&self) -> Vec<&'static str> {
        self.0.iter().map(|e| e.field).collect()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

/// Main error type for bundle and DMG operations
#[derive(Error, Debug)]
pub enum Error {
    /// Required request fields are missing or malformed
    #[error("invalid build request: {0}")]
    Validation(FieldErrors),

    /// The final DMG is already present in the output directory
    #[error("DMG file already exists: [{}]", path.display())]
    AlreadyExists {
        /// Path of the existing artifact
        path: PathBuf,
    },

    /// Filesystem primitive failed
    #[error("{context} [{}]: {source}", path.display())]
    Fs {
        /// What was being attempted
        context: String,
        /// Offending path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// External tool exited unsuccessfully or could not be spawned
    #[error("command [{command}] failed ({status}): output: [{output}]")]
    ExternalTool {
        /// Rendered command line
        command: String,
        /// Exit status description
        status: String,
        /// Captured stdout and stderr
        output: String,
    },

    /// The mount point never appeared after attach
    #[error("volume {} was not mounted after {attempts} attempts", mount_point.display())]
    MountTimeout {
        /// Expected mount point
        mount_point: PathBuf,
        /// Observations made before giving up
        attempts: u32,
    },

    /// The mount point never disappeared after detach
    #[error("volume {} was still mounted after {attempts} attempts", mount_point.display())]
    UnmountTimeout {
        /// Mount point that stayed visible
        mount_point: PathBuf,
        /// Observations made before giving up
        attempts: u32,
    },

    /// Failure attributed to a pipeline stage
    #[error("error when {stage}: {source}")]
    Stage {
        /// Stage that failed
        stage: Stage,
        /// Cause
        #[source]
        source: Box<Error>,
    },

    /// Failure with free-form context
    #[error("{context}: {source}")]
    Context {
        /// What was being attempted
        context: String,
        /// Cause
        #[source]
        source: Box<Error>,
    },

    /// Generic error message
    #[error("{0}")]
    GenericError(String),

    /// IO errors without a known path
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Directory traversal errors
    #[error("{0}")]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix errors while mirroring a tree
    #[error("{0}")]
    StripPrefix(#[from] std::path::StripPrefixError),
}

impl Error {
    /// Wraps this error with the stage it happened in.
    pub fn at(self, stage: Stage) -> Self {
        Error::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Walks stage and context wrappers down to the originating error.
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::Stage { source, .. } | Error::Context { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Innermost stage recorded in the chain, if any.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Error::Stage { stage, source } => source.failed_stage().or(Some(*stage)),
            Error::Context { source, .. } => source.failed_stage(),
            _ => None,
        }
    }
}

/// Attaches a [`Stage`] to a failing result.
pub trait StageExt<T> {
    /// Wraps the error with `stage`.
    fn stage(self, stage: Stage) -> Result<T>;
}

impl<T> StageExt<T> for Result<T> {
    fn stage(self, stage: Stage) -> Result<T> {
        self.map_err(|e| e.at(stage))
    }
}

/// Adds free-form context to results and options.
pub trait Context<T> {
    /// Adds a static context message.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds a lazily built context message.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context {
            context: context.to_string(),
            source: Box::new(e),
        })
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context {
            context: f().to_string(),
            source: Box::new(e),
        })
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Converts raw IO failures into [`Error::Fs`] carrying the offending path.
pub trait ErrorExt<T> {
    /// Wraps the error with a message and the path being operated on.
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::Fs {
            context: context.to_string(),
            path: path.as_ref().to_path_buf(),
            source,
        })
    }
}

/// Returns early with a [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_chain_names_every_stage() {
        let err = Error::MountTimeout {
            mount_point: PathBuf::from("/Volumes/Greeter"),
            attempts: 10,
        }
        .at(Stage::Attach)
        .at(Stage::Convert);

        let message = err.to_string();
        assert!(message.starts_with("error when converting DMG template to final DMG"));
        assert!(message.contains("error when mounting DMG template"));
        assert!(message.contains("/Volumes/Greeter"));
        assert_eq!(err.failed_stage(), Some(Stage::Attach));
        assert!(matches!(err.root_cause(), Error::MountTimeout { attempts: 10, .. }));
    }

    #[test]
    fn field_errors_render_in_order() {
        let mut errors = FieldErrors::default();
        errors.push("app-name", "cannot be blank");
        errors.push("bundle-identifier", "cannot contain spaces");

        assert_eq!(
            errors.to_string(),
            "app-name: cannot be blank; bundle-identifier: cannot contain spaces"
        );
        assert_eq!(errors.fields(), vec!["app-name", "bundle-identifier"]);
    }

    #[test]
    fn fs_context_keeps_path() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        let err = result.fs_context("creating directory", "/tmp/out").unwrap_err();
        assert!(matches!(&err, Error::Fs { path, .. } if path == Path::new("/tmp/out")));
        assert!(err.to_string().contains("creating directory [/tmp/out]"));
    }
}
