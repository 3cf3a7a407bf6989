//! Command line argument parsing and validation.
//!
//! Every request field may come from a flag, a `KODEGEN_DMG_*` environment
//! variable, or a Cargo manifest passed with `--manifest`, in that order of
//! precedence.

use crate::bundler::{BuildRequest, BuildRequestBuilder, DmgSettings};
use crate::metadata::DmgOverrides;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// macOS DMG bundler for Rust binaries
#[derive(Parser, Debug, Default)]
#[command(
    name = "kodegen_bundler_dmg",
    version,
    about = "Packages a binary and an icon into a drag-to-install macOS DMG",
    long_about = "Packages a compiled binary and an icon image into {Name}.app, then wraps it
into a compressed, read-only {Name}.dmg with an Applications shortcut.

Usage:
  kodegen_bundler_dmg --app-name Greeter --binary-path ./Greeter \\
      --bundle-identifier com.example.greeter --icon-path ./icon.png --output-dir ./out
  kodegen_bundler_dmg --manifest Cargo.toml --output-dir dist

Requires hdiutil, sips and iconutil (macOS).
Exit code 0 = DMG guaranteed to exist at {output-dir}/{app-name}.dmg."
)]
pub struct Args {
    /// Application name; becomes {Name}.app, the volume label and {Name}.dmg
    #[arg(long, visible_alias = "appName", env = "KODEGEN_DMG_APP_NAME", value_name = "NAME")]
    pub app_name: Option<String>,

    /// Compiled application binary
    #[arg(
        long,
        visible_alias = "appBinaryPath",
        env = "KODEGEN_DMG_BINARY_PATH",
        value_name = "PATH"
    )]
    pub binary_path: Option<PathBuf>,

    /// Bundle identifier, e.g. com.example.greeter
    #[arg(
        long,
        visible_alias = "bundleIdentifier",
        env = "KODEGEN_DMG_BUNDLE_IDENTIFIER",
        value_name = "ID"
    )]
    pub bundle_identifier: Option<String>,

    /// Source icon image
    #[arg(long, visible_alias = "iconPath", env = "KODEGEN_DMG_ICON_PATH", value_name = "PATH")]
    pub icon_path: Option<PathBuf>,

    /// Directory receiving {Name}.dmg
    #[arg(
        short = 'o',
        long,
        visible_alias = "outputDir",
        env = "KODEGEN_DMG_OUTPUT_DIR",
        value_name = "DIR"
    )]
    pub output_dir: Option<PathBuf>,

    /// Cargo.toml to read defaults from ([package] and [package.metadata.bundle])
    #[arg(short = 'm', long, env = "KODEGEN_DMG_MANIFEST", value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Writable container size passed to hdiutil create
    #[arg(long, env = "KODEGEN_DMG_SIZE", value_name = "SIZE")]
    pub size: Option<String>,

    /// Container filesystem
    #[arg(long, env = "KODEGEN_DMG_FILESYSTEM", value_name = "FS")]
    pub filesystem: Option<String>,

    /// Container partition layout
    #[arg(long, env = "KODEGEN_DMG_LAYOUT", value_name = "LAYOUT")]
    pub layout: Option<String>,

    /// Compressed image format of the final DMG
    #[arg(long, env = "KODEGEN_DMG_FORMAT", value_name = "FORMAT")]
    pub format: Option<String>,

    /// Directory volumes are attached under
    #[arg(long, env = "KODEGEN_DMG_MOUNT_ROOT", value_name = "DIR")]
    pub mount_root: Option<PathBuf>,

    /// Initial mount poll delay and per-attempt increment, in milliseconds
    #[arg(long, env = "KODEGEN_DMG_POLL_INTERVAL_MS", value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Mount and unmount poll attempts
    #[arg(
        long,
        env = "KODEGEN_DMG_POLL_ATTEMPTS",
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub poll_attempts: Option<u32>,

    /// Print every completed stage
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors and the artifact path
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Builds the request; flags win over `defaults`.
    pub fn build_request(&self, defaults: &BuildRequest) -> BuildRequest {
        let mut builder = BuildRequestBuilder::new();
        if let Some(name) = &self.app_name {
            builder = builder.app_name(name);
        }
        if let Some(path) = &self.binary_path {
            builder = builder.binary_path(path);
        }
        if let Some(id) = &self.bundle_identifier {
            builder = builder.bundle_identifier(id);
        }
        if let Some(path) = &self.icon_path {
            builder = builder.icon_path(path);
        }
        if let Some(dir) = &self.output_dir {
            builder = builder.output_dir(dir);
        }
        builder.or_defaults(defaults).build()
    }

    /// Container settings: defaults, then manifest overrides, then flags.
    pub fn dmg_settings(&self, manifest: &DmgOverrides) -> DmgSettings {
        let mut settings = DmgSettings::default();
        manifest.apply(&mut settings);

        DmgOverrides {
            size: self.size.clone(),
            filesystem: self.filesystem.clone(),
            layout: self.layout.clone(),
            format: self.format.clone(),
            poll_interval_ms: self.poll_interval_ms,
            poll_attempts: self.poll_attempts,
        }
        .apply(&mut settings);

        if let Some(root) = &self.mount_root {
            settings.mount_root.clone_from(root);
        }
        settings
    }

    /// Upper bound on a single mount or unmount wait, for display.
    pub fn describe_poll(settings: &DmgSettings) -> String {
        let total: Duration = settings.backoff.total_wait();
        format!(
            "{} attempts, up to {:.1}s",
            settings.backoff.attempts(),
            total.as_secs_f64()
        )
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(args.verbose, args.quiet);
        Self { output }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) -> std::io::Result<()> {
        self.output.verbose(message)
    }

    /// Print success message (alias for success_println for convenience)
    pub fn success(&self, message: &str) -> std::io::Result<()> {
        self.output.success(message)
    }

    /// Print warning message
    pub fn warn(&self, message: &str) -> std::io::Result<()> {
        self.output.warn(message)
    }

    /// Print section header
    pub fn section(&self, title: &str) -> std::io::Result<()> {
        self.output.section(title)
    }

    /// Print indented text
    pub fn indent(&self, message: &str) -> std::io::Result<()> {
        self.output.indent(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("kodegen_bundler_dmg").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn flags_override_manifest_defaults() {
        let args = parse(&["--app-name", "Greeter", "--output-dir", "out"]);
        let defaults = BuildRequest {
            app_name: "greeter".into(),
            binary_path: "target/release/greeter".into(),
            bundle_identifier: "com.example.greeter".into(),
            icon_path: "assets/img/icon.png".into(),
            output_dir: String::new(),
        };

        let request = args.build_request(&defaults);
        assert_eq!(request.app_name, "Greeter");
        assert_eq!(request.binary_path, "target/release/greeter");
        assert_eq!(request.output_dir, "out");
    }

    #[test]
    fn camel_case_aliases_are_accepted() {
        let args = parse(&["--appName", "Greeter", "--bundleIdentifier", "com.example.greeter"]);
        assert_eq!(args.app_name.as_deref(), Some("Greeter"));
        assert_eq!(args.bundle_identifier.as_deref(), Some("com.example.greeter"));
    }

    #[test]
    fn settings_layer_flags_over_manifest() {
        let args = parse(&["--size", "300m", "--poll-attempts", "3"]);
        let manifest = DmgOverrides {
            size: Some("200m".into()),
            filesystem: Some("HFS+".into()),
            ..Default::default()
        };

        let settings = args.dmg_settings(&manifest);
        assert_eq!(settings.size, "300m");
        assert_eq!(settings.filesystem, "HFS+");
        assert_eq!(settings.layout, "GPTSPUD");
        assert_eq!(settings.backoff.max_attempts, 3);
    }

    #[test]
    fn zero_poll_attempts_is_rejected() {
        let result = Args::try_parse_from(["kodegen_bundler_dmg", "--poll-attempts", "0"]);
        assert!(result.is_err());
    }
}
