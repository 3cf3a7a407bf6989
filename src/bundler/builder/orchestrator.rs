//! Main build orchestration.
//!
//! This module provides the [`Bundler`] that turns a [`BuildRequest`] into a
//! DMG: validate, check for an existing artifact, assemble the `.app` in a
//! scratch workspace, wrap it into a disk image, and always remove the
//! workspace afterwards.

use super::{checksum::calculate_sha256, workspace::ScratchWorkspace};
use crate::bundler::{
    error::{Context, ErrorExt, Result, Stage, StageExt},
    platform::macos::{
        app::bundle_app,
        dmg::{DiskImageTool, DmgPipeline, Hdiutil, check_artifact_absent},
        icon::{IconTool, SipsIconTool},
    },
    process::{CommandRunner, SystemCommandRunner},
    progress::{BuildObserver, NoopObserver, run_stage},
    settings::{BuildRequest, DmgSettings},
    utils::fs,
};
use path_absolutize::Absolutize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A finished DMG.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltArtifact {
    /// Absolute path of `{output_dir}/{Name}.dmg`
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
    /// Hex-encoded SHA-256 of the file
    pub checksum: String,
    /// Scratch workspace that could not be removed; left for the caller to delete
    pub leftover_workspace: Option<PathBuf>,
}

/// Build orchestrator.
///
/// Holds the container settings and the external tools a build runs through.
/// Tools are injected, so concurrent builds in one process share nothing but
/// what the caller hands in.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_dmg::bundler::{Bundler, BuildRequestBuilder, DmgSettings};
///
/// # async fn example() -> kodegen_bundler_dmg::bundler::Result<()> {
/// let request = BuildRequestBuilder::new()
///     .app_name("Greeter")
///     .binary_path("./Greeter")
///     .bundle_identifier("com.example.greeter")
///     .icon_path("./icon.png")
///     .output_dir("./out")
///     .build();
///
/// let artifact = Bundler::new(DmgSettings::default()).build(&request).await?;
/// println!("Created {} (sha256 {})", artifact.path.display(), artifact.checksum);
/// # Ok(())
/// # }
/// ```
pub struct Bundler {
    settings: DmgSettings,
    images: Arc<dyn DiskImageTool>,
    icons: Arc<dyn IconTool>,
    observer: Arc<dyn BuildObserver>,
}

impl std::fmt::Debug for Bundler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundler")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Bundler {
    /// Creates a bundler running the system `hdiutil`, `sips` and `iconutil`.
    pub fn new(settings: DmgSettings) -> Self {
        Self::with_runner(settings, Arc::new(SystemCommandRunner))
    }

    /// Creates a bundler whose tools execute through `runner`.
    pub fn with_runner(settings: DmgSettings, runner: Arc<dyn CommandRunner>) -> Self {
        let images = Arc::new(Hdiutil::new(runner.clone(), &settings));
        let icons = Arc::new(SipsIconTool::new(runner));
        Self::with_tools(settings, images, icons)
    }

    /// Creates a bundler from explicit tool implementations.
    pub fn with_tools(
        settings: DmgSettings,
        images: Arc<dyn DiskImageTool>,
        icons: Arc<dyn IconTool>,
    ) -> Self {
        Self {
            settings,
            images,
            icons,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Reports stage transitions to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn BuildObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Returns the container settings.
    pub fn settings(&self) -> &DmgSettings {
        &self.settings
    }

    /// Builds `{output_dir}/{app_name}.dmg`.
    ///
    /// Nothing is written when validation fails or the artifact already
    /// exists. Otherwise a scratch workspace is created in the output
    /// directory and removed again whether or not the build succeeds. If it
    /// cannot be removed after a successful build, its path is returned in
    /// [`BuiltArtifact::leftover_workspace`].
    pub async fn build(&self, request: &BuildRequest) -> Result<BuiltArtifact> {
        let observer = self.observer.as_ref();

        run_stage(observer, Stage::Validate, async { request.validate() }).await?;

        let artifact = request.artifact_path();
        check_artifact_absent(&artifact)
            .await
            .stage(Stage::CheckArtifact)?;

        let workspace = run_stage(
            observer,
            Stage::CreateWorkspace,
            ScratchWorkspace::create(request.output_dir()),
        )
        .await?;

        let workspace_path = workspace.path().to_path_buf();
        let outcome = self.assemble(request, &workspace).await;

        let cleanup = run_stage(observer, Stage::Cleanup, remove_workspace(workspace)).await;
        let (dmg_path, leftover_workspace) = settle(outcome, cleanup, workspace_path)?;

        let mut artifact = self.describe(dmg_path).await?;
        artifact.leftover_workspace = leftover_workspace;
        Ok(artifact)
    }

    /// Runs [`Bundler::build`] on a tokio task.
    ///
    /// Lets interactive callers keep rendering progress while the build
    /// runs. The build itself is still strictly sequential.
    pub fn spawn(self: Arc<Self>, request: BuildRequest) -> JoinHandle<Result<BuiltArtifact>> {
        tokio::spawn(async move { self.build(&request).await })
    }

    async fn assemble(&self, request: &BuildRequest, workspace: &ScratchWorkspace) -> Result<PathBuf> {
        let app = bundle_app(
            request,
            workspace.path(),
            self.icons.as_ref(),
            self.observer.as_ref(),
        )
        .await
        .context("error when creating app bundle")?;

        DmgPipeline::new(self.images.as_ref(), &self.settings, self.observer.as_ref())
            .run(&app, workspace.path(), request.output_dir())
            .await
            .context("error when creating app DMG")
    }

    async fn describe(&self, dmg_path: PathBuf) -> Result<BuiltArtifact> {
        let path = dmg_path
            .absolutize()
            .fs_context("error when resolving artifact path", &dmg_path)?
            .into_owned();
        let metadata = tokio::fs::metadata(&path)
            .await
            .fs_context("reading artifact metadata", &path)?;
        if !metadata.is_file() {
            crate::bail!("DMG conversion did not produce a file at {}", path.display());
        }
        let checksum = calculate_sha256(&path).await?;

        Ok(BuiltArtifact {
            path,
            size: metadata.len(),
            checksum,
            leftover_workspace: None,
        })
    }
}

/// Deletes the workspace, retrying once for files released late.
async fn remove_workspace(workspace: ScratchWorkspace) -> Result<()> {
    let path = workspace.path().to_path_buf();
    if let Err(e) = workspace.close() {
        log::debug!("Retrying scratch workspace removal: {}", e);
        fs::remove_dir_all(&path).await?;
    }
    Ok(())
}

/// Combines the build outcome with workspace removal.
///
/// A removal failure never masks a build error. After a successful build it
/// is reported as the leftover workspace path.
fn settle(
    outcome: Result<PathBuf>,
    cleanup: Result<()>,
    workspace: PathBuf,
) -> Result<(PathBuf, Option<PathBuf>)> {
    match (outcome, cleanup) {
        (Ok(path), Ok(())) => Ok((path, None)),
        (Ok(path), Err(e)) => {
            log::warn!("DMG created but scratch workspace was not removed: {}", e);
            Ok((path, Some(workspace)))
        }
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(cleanup)) => {
            log::warn!("{}", cleanup);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::Error;

    fn removal_failed() -> Result<()> {
        Err(Error::GenericError("Directory not empty".into()).at(Stage::Cleanup))
    }

    #[test]
    fn clean_success_has_no_leftover() {
        let settled = settle(Ok("out/Greeter.dmg".into()), Ok(()), "out/tmp-1".into()).unwrap();
        assert_eq!(settled, (PathBuf::from("out/Greeter.dmg"), None));
    }

    #[test]
    fn failed_removal_after_success_reports_workspace() {
        let settled = settle(Ok("out/Greeter.dmg".into()), removal_failed(), "out/tmp-1".into())
            .unwrap();
        assert_eq!(settled.1, Some(PathBuf::from("out/tmp-1")));
    }

    #[test]
    fn failed_removal_never_masks_build_error() {
        let build_failed = Err(Error::GenericError("convert failed".into()).at(Stage::Convert));
        let err = settle(build_failed, removal_failed(), "out/tmp-1".into()).unwrap_err();
        assert_eq!(err.failed_stage(), Some(Stage::Convert));
    }
}
