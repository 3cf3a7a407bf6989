//! Builder for constructing a BuildRequest.

use super::BuildRequest;
use std::path::Path;

/// Builder for constructing [`BuildRequest`].
///
/// Missing fields are left blank and reported by [`BuildRequest::validate`],
/// so the builder itself never fails.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_dmg::bundler::BuildRequestBuilder;
///
/// let request = BuildRequestBuilder::new()
///     .app_name("Greeter")
///     .binary_path("target/release/greeter")
///     .bundle_identifier("com.example.greeter")
///     .icon_path("assets/img/icon.png")
///     .output_dir("dist")
///     .build();
/// assert_eq!(request.artifact_path().file_name().unwrap(), "Greeter.dmg");
/// ```
#[derive(Default)]
pub struct BuildRequestBuilder {
    request: BuildRequest,
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl BuildRequestBuilder {
    /// Creates a new request builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the application name.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.request.app_name = name.into();
        self
    }

    /// Sets the compiled binary to bundle.
    pub fn binary_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.request.binary_path = path_string(path.as_ref());
        self
    }

    /// Sets the bundle identifier.
    pub fn bundle_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.request.bundle_identifier = identifier.into();
        self
    }

    /// Sets the source icon image.
    pub fn icon_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.request.icon_path = path_string(path.as_ref());
        self
    }

    /// Sets the directory receiving the final DMG.
    pub fn output_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.request.output_dir = path_string(path.as_ref());
        self
    }

    /// Fills blank fields from another request, keeping values already set.
    pub fn or_defaults(mut self, defaults: &BuildRequest) -> Self {
        let fill = |own: &mut String, other: &String| {
            if own.trim().is_empty() {
                own.clone_from(other);
            }
        };
        fill(&mut self.request.app_name, &defaults.app_name);
        fill(&mut self.request.binary_path, &defaults.binary_path);
        fill(&mut self.request.bundle_identifier, &defaults.bundle_identifier);
        fill(&mut self.request.icon_path, &defaults.icon_path);
        fill(&mut self.request.output_dir, &defaults.output_dir);
        self
    }

    /// Returns the assembled request.
    pub fn build(self) -> BuildRequest {
        self.request
    }
}
