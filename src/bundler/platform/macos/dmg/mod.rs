//! macOS DMG disk image creator.
//!
//! Creates drag-to-install DMG files using the native hdiutil tool. The DMG
//! holds the `.app` bundle and an `Applications` shortcut.
//!
//! # Architecture
//!
//! - [`DiskImageTool`] - the four container operations (plus forced detach)
//! - [`Hdiutil`] - `DiskImageTool` backed by `hdiutil`, split across
//!   `creation`, `mount` and `conversion`
//! - `pipeline` - the create → attach → populate → detach → convert sequence

mod conversion;
mod creation;
mod mount;
mod pipeline;

use crate::bundler::{
    error::Result,
    process::CommandRunner,
    settings::{DEFAULT_MOUNT_ROOT, DmgSettings},
    utils::retry::LinearBackoff,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use pipeline::{ContainerState, DmgPipeline, check_artifact_absent};

/// Parameters of the writable container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerSpec<'a> {
    /// Size, e.g. `100m`
    pub size: &'a str,
    /// Filesystem, e.g. `APFS`
    pub filesystem: &'a str,
    /// Volume label; also names the mount point
    pub label: &'a str,
    /// Partition layout, e.g. `GPTSPUD`
    pub layout: &'a str,
}

impl<'a> ContainerSpec<'a> {
    /// Container described by `settings`, labelled `label`.
    pub fn from_settings(settings: &'a DmgSettings, label: &'a str) -> Self {
        Self {
            size: &settings.size,
            filesystem: &settings.filesystem,
            label,
            layout: &settings.layout,
        }
    }
}

/// Disk image container operations.
///
/// Each method issues exactly one external invocation. Attach and detach
/// additionally wait for the mount point to appear or vanish; the invocation
/// itself is never retried.
#[async_trait]
pub trait DiskImageTool: Send + Sync {
    /// Allocates an empty writable container at `output`.
    async fn create(&self, spec: &ContainerSpec<'_>, output: &Path) -> Result<()>;

    /// Attaches `container` and returns its mount point once it is visible.
    ///
    /// Fails with [`Error::MountTimeout`](crate::bundler::Error::MountTimeout) when it never becomes visible.
    async fn attach(&self, label: &str, container: &Path) -> Result<PathBuf>;

    /// Detaches the volume and returns once the mount point is gone.
    ///
    /// Fails with [`Error::UnmountTimeout`](crate::bundler::Error::UnmountTimeout) when it stays visible.
    async fn detach(&self, mount_point: &Path) -> Result<()>;

    /// Best-effort forced detach used while unwinding a failed build.
    async fn force_detach(&self, mount_point: &Path) -> Result<()>;

    /// Converts a detached container into the compressed artifact at `output`.
    async fn convert(&self, container: &Path, output: &Path) -> Result<()>;
}

/// [`DiskImageTool`] driving `hdiutil`.
#[derive(Clone)]
pub struct Hdiutil {
    runner: Arc<dyn CommandRunner>,
    mount_root: PathBuf,
    explicit_mount_point: bool,
    backoff: LinearBackoff,
    format: String,
}

impl std::fmt::Debug for Hdiutil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hdiutil")
            .field("mount_root", &self.mount_root)
            .field("backoff", &self.backoff)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

impl Hdiutil {
    /// Creates a driver executing through `runner` with the mount root,
    /// poll schedule and output format from `settings`.
    ///
    /// A mount root other than `/Volumes` is passed to `hdiutil attach`
    /// through `-mountpoint`.
    pub fn new(runner: Arc<dyn CommandRunner>, settings: &DmgSettings) -> Self {
        Self {
            runner,
            explicit_mount_point: settings.mount_root() != Path::new(DEFAULT_MOUNT_ROOT),
            mount_root: settings.mount_root.clone(),
            backoff: settings.backoff,
            format: settings.format.clone(),
        }
    }
}

#[async_trait]
impl DiskImageTool for Hdiutil {
    async fn create(&self, spec: &ContainerSpec<'_>, output: &Path) -> Result<()> {
        self.create_container(spec, output).await
    }

    async fn attach(&self, label: &str, container: &Path) -> Result<PathBuf> {
        self.attach_container(label, container).await
    }

    async fn detach(&self, mount_point: &Path) -> Result<()> {
        self.detach_volume(mount_point).await
    }

    async fn force_detach(&self, mount_point: &Path) -> Result<()> {
        self.force_detach_volume(mount_point).await
    }

    async fn convert(&self, container: &Path, output: &Path) -> Result<()> {
        self.convert_container(container, output).await
    }
}
