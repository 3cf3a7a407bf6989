//! macOS disk image settings.

use crate::bundler::utils::retry::LinearBackoff;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default size of the writable container.
pub const DEFAULT_CONTAINER_SIZE: &str = "100m";
/// Default filesystem of the writable container.
pub const DEFAULT_FILESYSTEM: &str = "APFS";
/// Default partition layout of the writable container.
pub const DEFAULT_LAYOUT: &str = "GPTSPUD";
/// Default compressed read-only format of the final artifact.
pub const DEFAULT_FORMAT: &str = "UDZO";
/// Where attached volumes appear.
pub const DEFAULT_MOUNT_ROOT: &str = "/Volumes";

/// macOS DMG disk image configuration.
///
/// Describes the writable container the app bundle is staged in, the
/// compressed format it is converted to, and how long to wait for the
/// operating system to reflect attach and detach.
///
/// # Configuration
///
/// Add to `Cargo.toml`:
///
/// ```toml
/// [package.metadata.bundle.dmg]
/// size = "200m"
/// filesystem = "HFS+"
/// poll_interval_ms = 250
/// poll_attempts = 20
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DmgSettings {
    /// Container size passed to `hdiutil create -size`.
    ///
    /// Default: `100m`
    pub size: String,

    /// Container filesystem passed to `hdiutil create -fs`.
    ///
    /// Default: `APFS`
    pub filesystem: String,

    /// Partition layout passed to `hdiutil create -layout`.
    ///
    /// Default: `GPTSPUD`
    pub layout: String,

    /// Final image format passed to `hdiutil convert -format`.
    ///
    /// Default: `UDZO`
    pub format: String,

    /// Directory attached volumes show up under.
    ///
    /// Default: `/Volumes`
    pub mount_root: PathBuf,

    /// Poll schedule after attach and detach.
    ///
    /// Default: 100ms initial delay, +100ms per attempt, 10 attempts
    pub backoff: LinearBackoff,
}

impl Default for DmgSettings {
    fn default() -> Self {
        Self {
            size: DEFAULT_CONTAINER_SIZE.to_string(),
            filesystem: DEFAULT_FILESYSTEM.to_string(),
            layout: DEFAULT_LAYOUT.to_string(),
            format: DEFAULT_FORMAT.to_string(),
            mount_root: PathBuf::from(DEFAULT_MOUNT_ROOT),
            backoff: LinearBackoff::new(Duration::from_millis(100), Duration::from_millis(100), 10),
        }
    }
}

impl DmgSettings {
    /// Returns the mount point a volume labelled `label` is attached to.
    pub fn mount_point(&self, label: &str) -> PathBuf {
        self.mount_root.join(label)
    }

    /// Returns the mount root.
    pub fn mount_root(&self) -> &Path {
        &self.mount_root
    }
}
