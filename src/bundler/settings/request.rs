//! Build request: the five inputs every DMG build needs.

use crate::bundler::error::{Error, FieldErrors, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Parameters of one DMG build.
///
/// All fields are required and must be non-blank. Construct directly, through
/// [`BuildRequestBuilder`](super::BuildRequestBuilder), or from the CLI.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_dmg::bundler::BuildRequest;
///
/// let request = BuildRequest {
///     app_name: "Greeter".into(),
///     binary_path: "./Greeter".into(),
///     bundle_identifier: "com.example.greeter".into(),
///     icon_path: "./icon.png".into(),
///     output_dir: "./out".into(),
/// };
/// assert!(request.validate().is_ok());
/// ```
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BuildRequest {
    /// Application name; names the `.app`, the volume and the `.dmg`.
    pub app_name: String,

    /// Path to the compiled application binary.
    pub binary_path: String,

    /// Bundle identifier in reverse domain notation (e.g. `com.example.app`).
    pub bundle_identifier: String,

    /// Path to the source icon image (png, jpg, gif or tiff).
    pub icon_path: String,

    /// Directory the final `{app_name}.dmg` is written to.
    pub output_dir: String,
}

impl BuildRequest {
    /// Checks every field and reports all failures together.
    ///
    /// Performs no IO.
    pub fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::default();

        let required = [
            ("app-name", &self.app_name),
            ("binary-path", &self.binary_path),
            ("bundle-identifier", &self.bundle_identifier),
            ("icon-path", &self.icon_path),
            ("output-dir", &self.output_dir),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                errors.push(field, "cannot be blank");
            }
        }

        let identifier = self.bundle_identifier.trim();
        if !identifier.is_empty() && self.bundle_identifier.chars().any(char::is_whitespace) {
            errors.push("bundle-identifier", "cannot contain spaces");
        }

        // The name becomes a path component under the mount root.
        if self.app_name.contains('/') {
            errors.push("app-name", "cannot contain '/'");
        } else if !self.app_name.trim().is_empty() && !is_single_component(&self.app_name) {
            errors.push("app-name", "must be a plain file name, not '.' or '..'");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }

    /// Returns the `{app_name}.app` directory name.
    pub fn bundle_dir_name(&self) -> String {
        format!("{}.app", self.app_name)
    }

    /// Returns the output directory as a path.
    pub fn output_dir(&self) -> &Path {
        Path::new(&self.output_dir)
    }

    /// Returns the location of the final artifact, `{output_dir}/{app_name}.dmg`.
    pub fn artifact_path(&self) -> PathBuf {
        self.output_dir().join(format!("{}.dmg", self.app_name))
    }

    /// Returns the binary path.
    pub fn binary_path(&self) -> &Path {
        Path::new(&self.binary_path)
    }

    /// Returns the icon path.
    pub fn icon_path(&self) -> &Path {
        Path::new(&self.icon_path)
    }
}

/// True when `name` names exactly one entry, so `{root}/{name}` stays inside `root`.
fn is_single_component(name: &str) -> bool {
    name != "." && name != ".." && Path::new(name).file_name() == Some(OsStr::new(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeter() -> BuildRequest {
        BuildRequest {
            app_name: "Greeter".into(),
            binary_path: "./Greeter".into(),
            bundle_identifier: "com.example.greeter".into(),
            icon_path: "./icon.png".into(),
            output_dir: "./out".into(),
        }
    }

    #[test]
    fn accepts_complete_request() {
        assert!(greeter().validate().is_ok());
        assert_eq!(greeter().artifact_path(), PathBuf::from("./out/Greeter.dmg"));
        assert_eq!(greeter().bundle_dir_name(), "Greeter.app");
    }

    #[test]
    fn reports_every_blank_field() {
        let request = BuildRequest {
            app_name: "Greeter".into(),
            icon_path: "  ".into(),
            ..Default::default()
        };

        match request.validate() {
            Err(Error::Validation(errors)) => assert_eq!(
                errors.fields(),
                vec!["binary-path", "bundle-identifier", "icon-path", "output-dir"]
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_spaces_in_bundle_identifier() {
        let request = BuildRequest {
            bundle_identifier: "com.example.my app".into(),
            ..greeter()
        };
        let err = request.validate().unwrap_err();
        assert!(err.to_string().contains("bundle-identifier: cannot contain spaces"));
    }

    #[test]
    fn rejects_names_that_escape_the_mount_root() {
        for name in [".", ".."] {
            let request = BuildRequest {
                app_name: name.into(),
                ..greeter()
            };
            match request.validate() {
                Err(Error::Validation(errors)) => assert_eq!(errors.fields(), vec!["app-name"]),
                other => panic!("expected validation error for {name:?}, got {other:?}"),
            }
        }

        let nested = BuildRequest {
            app_name: "tools/Greeter".into(),
            ..greeter()
        };
        let err = nested.validate().unwrap_err();
        assert!(err.to_string().contains("app-name: cannot contain '/'"));
    }

    #[test]
    fn accepts_dotted_names() {
        for name in ["Greeter 2.0", ".hidden", "Greeter."] {
            let request = BuildRequest {
                app_name: name.into(),
                ..greeter()
            };
            assert!(request.validate().is_ok(), "{name:?} should be accepted");
        }
    }
}
