//! Disk image assembly: create → attach → populate → detach → convert.
//!
//! Stages run strictly in order and each one is terminal on failure. Once the
//! container is attached, every failure path detaches it again before
//! returning, so no volume outlives the build. The container itself lives in
//! the scratch workspace and disappears with it.

use super::{ContainerSpec, DiskImageTool};
use crate::bundler::{
    error::{Context, Error, Result, Stage, StageExt},
    platform::macos::app::AppBundle,
    progress::{BuildObserver, run_stage},
    settings::DmgSettings,
    utils::fs,
};
use std::fmt;
use std::path::{Path, PathBuf};

/// Target of the `Applications` shortcut placed next to the bundle.
const APPLICATIONS_DIR: &str = "/Applications";

/// Lifecycle of the writable container within one build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerState {
    /// Container file allocated
    Created,
    /// Volume visible under the mount root
    Attached,
    /// Shortcut and bundle copied onto the volume
    Populated,
    /// Volume no longer visible
    Detached,
    /// Compressed artifact written
    Converted,
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerState::Created => "created",
            ContainerState::Attached => "attached",
            ContainerState::Populated => "populated",
            ContainerState::Detached => "detached",
            ContainerState::Converted => "converted",
        };
        f.write_str(name)
    }
}

/// Fails with [`Error::AlreadyExists`] when `artifact` is already present.
///
/// Advisory only: nothing stops another process from creating the file
/// between this check and the final conversion.
pub async fn check_artifact_absent(artifact: &Path) -> Result<()> {
    let exists = fs::file_exists(artifact).await.with_context(|| {
        format!(
            "error when checking if DMG file already exists at [{}]",
            artifact.display()
        )
    })?;
    if exists {
        return Err(Error::AlreadyExists {
            path: artifact.to_path_buf(),
        });
    }
    Ok(())
}

/// Wraps an assembled [`AppBundle`] into the final compressed DMG.
pub struct DmgPipeline<'a> {
    tool: &'a dyn DiskImageTool,
    settings: &'a DmgSettings,
    observer: &'a dyn BuildObserver,
}

impl<'a> DmgPipeline<'a> {
    /// Creates a pipeline over `tool` using the container parameters in `settings`.
    pub fn new(
        tool: &'a dyn DiskImageTool,
        settings: &'a DmgSettings,
        observer: &'a dyn BuildObserver,
    ) -> Self {
        Self {
            tool,
            settings,
            observer,
        }
    }

    /// Produces `{output_dir}/{Name}.dmg` from `app`.
    ///
    /// The writable container is staged in `workspace`. On failure no volume
    /// stays attached and no partial artifact is left in `output_dir`.
    pub async fn run(&self, app: &AppBundle, workspace: &Path, output_dir: &Path) -> Result<PathBuf> {
        let volume = app.volume_name()?;
        let artifact = output_dir.join(format!("{volume}.dmg"));
        log::info!("Creating DMG for {}", volume);

        run_stage(self.observer, Stage::CheckArtifact, check_artifact_absent(&artifact)).await?;

        let container = workspace.join(format!("{volume}-template.dmg"));
        let spec = ContainerSpec::from_settings(self.settings, volume);
        run_stage(
            self.observer,
            Stage::CreateContainer,
            self.tool.create(&spec, &container),
        )
        .await?;
        self.entered(ContainerState::Created, &container);

        let mount_point = match run_stage(
            self.observer,
            Stage::Attach,
            self.tool.attach(volume, &container),
        )
        .await
        {
            Ok(mount_point) => mount_point,
            Err(e) => {
                // attach may have succeeded without the mount ever showing up
                if matches!(e.root_cause(), Error::MountTimeout { .. }) {
                    self.release(&self.settings.mount_point(volume)).await;
                }
                return Err(e);
            }
        };
        self.entered(ContainerState::Attached, &mount_point);

        if let Err(e) = run_stage(
            self.observer,
            Stage::Populate,
            populate(&mount_point, &app.path),
        )
        .await
        {
            self.release(&mount_point).await;
            return Err(e);
        }
        self.entered(ContainerState::Populated, &mount_point);

        if let Err(e) = run_stage(self.observer, Stage::Detach, self.tool.detach(&mount_point)).await {
            self.release(&mount_point).await;
            return Err(e);
        }
        self.entered(ContainerState::Detached, &container);

        let preexisting = fs::path_exists(&artifact).await.stage(Stage::Convert)?;
        if let Err(e) = run_stage(
            self.observer,
            Stage::Convert,
            self.tool.convert(&container, &artifact),
        )
        .await
        {
            if !preexisting {
                if let Err(cleanup) = fs::remove_file(&artifact).await {
                    log::warn!("Failed to remove partial DMG: {}", cleanup);
                }
            }
            return Err(e);
        }
        self.entered(ContainerState::Converted, &artifact);

        log::info!("✓ Created DMG: {}", artifact.display());
        Ok(artifact)
    }

    fn entered(&self, state: ContainerState, path: &Path) {
        log::debug!("DMG template {}: {}", state, path.display());
    }

    /// Forcibly detaches `mount_point` while unwinding; failures are logged only.
    async fn release(&self, mount_point: &Path) {
        log::warn!("Detaching {} after failed build", mount_point.display());
        if let Err(e) = self.tool.force_detach(mount_point).await {
            log::warn!("DMG detach had issues: {}", e);
        }
    }
}

/// Adds the Applications shortcut and copies the bundle onto the volume.
async fn populate(mount_point: &Path, app_bundle: &Path) -> Result<()> {
    let link = mount_point.join("Applications");
    fs::create_dir_symlink(Path::new(APPLICATIONS_DIR), &link)
        .await
        .context("error when creating symlink for Applications folder")?;

    let app_name = app_bundle
        .file_name()
        .ok_or_else(|| Error::GenericError("Invalid app bundle path".into()))?;
    let staged_app = mount_point.join(app_name);
    log::debug!("Copying .app to volume: {}", staged_app.display());
    fs::copy_dir(app_bundle, &staged_app).await.with_context(|| {
        format!(
            "error when copying app bundle to mounted DMG template at [{}]",
            mount_point.display()
        )
    })?;
    Ok(())
}
