//! Build request defaults from a Cargo.toml.
//!
//! Reads `[package]`, `[[bin]]`, `[package.metadata.bundle]` and
//! `[package.metadata.bundle.dmg]` so a crate can be packaged with nothing
//! more than `--manifest Cargo.toml --output-dir dist`.

use crate::bundler::{BuildRequest, DmgSettings};
use crate::error::{BundlerError, CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides from `[package.metadata.bundle.dmg]`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DmgOverrides {
    /// Container size, e.g. `"200m"`
    pub size: Option<String>,
    /// Container filesystem, e.g. `"HFS+"`
    pub filesystem: Option<String>,
    /// Partition layout
    pub layout: Option<String>,
    /// Final image format, e.g. `"ULFO"`
    pub format: Option<String>,
    /// Initial poll delay and per-attempt increment, in milliseconds
    pub poll_interval_ms: Option<u64>,
    /// Poll attempts after attach and detach
    pub poll_attempts: Option<u32>,
}

impl DmgOverrides {
    /// Writes every value present onto `settings`.
    pub fn apply(&self, settings: &mut DmgSettings) {
        if let Some(size) = &self.size {
            settings.size.clone_from(size);
        }
        if let Some(filesystem) = &self.filesystem {
            settings.filesystem.clone_from(filesystem);
        }
        if let Some(layout) = &self.layout {
            settings.layout.clone_from(layout);
        }
        if let Some(format) = &self.format {
            settings.format.clone_from(format);
        }
        if let Some(ms) = self.poll_interval_ms {
            settings.backoff.initial = Duration::from_millis(ms);
            settings.backoff.increment = Duration::from_millis(ms);
        }
        if let Some(attempts) = self.poll_attempts {
            settings.backoff.max_attempts = attempts;
        }
    }
}

/// Everything a manifest contributes to a build.
#[derive(Clone, Debug, Default)]
pub struct CargoManifest {
    /// Request fields found in the manifest; blank where absent
    pub request: BuildRequest,
    /// Container overrides
    pub dmg: DmgOverrides,
}

fn invalid(reason: impl Into<String>) -> BundlerError {
    BundlerError::Cli(CliError::InvalidArguments {
        reason: reason.into(),
    })
}

fn path_string(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

/// Load build defaults from Cargo.toml (single read + parse)
pub fn load_manifest(cargo_toml_path: &Path) -> Result<CargoManifest> {
    let manifest = std::fs::read_to_string(cargo_toml_path).map_err(|e| {
        BundlerError::Cli(CliError::ExecutionFailed {
            command: "read_cargo_toml".to_string(),
            reason: format!("Failed to read {}: {}", cargo_toml_path.display(), e),
        })
    })?;

    let cargo_dir = cargo_toml_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    parse_manifest(&manifest, &cargo_dir)
}

/// Parses manifest text; relative paths resolve against `cargo_dir`.
pub fn parse_manifest(manifest: &str, cargo_dir: &Path) -> Result<CargoManifest> {
    let toml_value: toml::Value = toml::from_str(manifest)?;

    let package = toml_value
        .get("package")
        .ok_or_else(|| invalid("No [package] section in Cargo.toml"))?;

    let package_name = package
        .get("name")
        .and_then(|v| v.as_str())
        .ok_or_else(|| invalid("Missing 'name' in [package]"))?;

    // Try [[bin]] section first, fall back to the package name
    let binary_name = toml_value
        .get("bin")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|first| first.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or(package_name);

    let bundle = package
        .get("metadata")
        .and_then(|m| m.get("bundle"));

    let app_name = bundle
        .and_then(|b| b.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or(package_name)
        .to_string();

    let bundle_identifier = bundle
        .and_then(|b| b.get("identifier"))
        .and_then(|v| v.as_str())
        .map(String::from)
        .unwrap_or_default();

    // `icon` may be a single path or a list; the first entry is the source image
    let icon = bundle
        .and_then(|b| b.get("icon"))
        .and_then(|v| match v {
            toml::Value::String(s) => Some(s.as_str()),
            toml::Value::Array(arr) => arr.first().and_then(|v| v.as_str()),
            _ => None,
        })
        .map(|icon| cargo_dir.join(icon))
        .or_else(|| discover_icon(cargo_dir));

    let dmg = match bundle.and_then(|b| b.get("dmg")) {
        Some(section) => section
            .clone()
            .try_into::<DmgOverrides>()
            .map_err(|e| invalid(format!("Invalid [package.metadata.bundle.dmg]: {e}")))?,
        None => DmgOverrides::default(),
    };

    Ok(CargoManifest {
        request: BuildRequest {
            app_name,
            binary_path: path_string(cargo_dir.join("target").join("release").join(binary_name)),
            bundle_identifier,
            icon_path: icon.map(path_string).unwrap_or_default(),
            output_dir: String::new(),
        },
        dmg,
    })
}

/// Looks for the source icon in the conventional `assets/img/` location.
fn discover_icon(package_root: &Path) -> Option<PathBuf> {
    let assets_dir = package_root.join("assets").join("img");
    ["icon.png", "icon_512x512@2x.png", "icon_512x512.png"]
        .iter()
        .map(|name| assets_dir.join(name))
        .find(|path| {
            let found = path.is_file();
            if found {
                log::info!("Found source icon: {}", path.display());
            }
            found
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[package]
name = "greeter"
version = "0.1.0"

[[bin]]
name = "greeter-cli"
path = "src/main.rs"

[package.metadata.bundle]
name = "Greeter"
identifier = "com.example.greeter"
icon = ["assets/icon.png", "assets/icon@2x.png"]

[package.metadata.bundle.dmg]
size = "200m"
poll_attempts = 20
"#;

    #[test]
    fn reads_request_defaults() {
        let manifest = parse_manifest(MANIFEST, Path::new("/src/greeter")).unwrap();

        assert_eq!(manifest.request.app_name, "Greeter");
        assert_eq!(manifest.request.bundle_identifier, "com.example.greeter");
        assert_eq!(manifest.request.binary_path, "/src/greeter/target/release/greeter-cli");
        assert_eq!(manifest.request.icon_path, "/src/greeter/assets/icon.png");
        assert!(manifest.request.output_dir.is_empty());
    }

    #[test]
    fn applies_dmg_overrides() {
        let manifest = parse_manifest(MANIFEST, Path::new("/src/greeter")).unwrap();
        let mut settings = DmgSettings::default();
        manifest.dmg.apply(&mut settings);

        assert_eq!(settings.size, "200m");
        assert_eq!(settings.filesystem, "APFS");
        assert_eq!(settings.backoff.max_attempts, 20);
    }

    #[test]
    fn falls_back_to_package_name() {
        let manifest = parse_manifest(
            "[package]\nname = \"tool\"\nversion = \"1.0.0\"\n",
            Path::new("/nonexistent"),
        )
        .unwrap();

        assert_eq!(manifest.request.app_name, "tool");
        assert!(manifest.request.bundle_identifier.is_empty());
        assert!(manifest.request.icon_path.is_empty());
        assert_eq!(manifest.dmg, DmgOverrides::default());
    }

    #[test]
    fn rejects_manifest_without_package() {
        let err = parse_manifest("[workspace]\n", Path::new(".")).unwrap_err();
        assert!(err.to_string().contains("No [package] section"));
    }
}
