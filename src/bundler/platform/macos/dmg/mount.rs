//! Attaching and detaching the writable container.
//!
//! `hdiutil attach` and `hdiutil detach` return before the volume appears
//! under (or disappears from) the mount root, so both operations poll the
//! mount point with the configured [`LinearBackoff`](crate::bundler::utils::retry::LinearBackoff).

use super::Hdiutil;
use crate::bundler::{
    error::{Context, Error, ErrorExt, Result},
    process::path_arg,
    utils::retry::{PollError, poll_until},
};
use std::path::{Path, PathBuf};

impl Hdiutil {
    /// Attaches `container` and waits until `{mount_root}/{label}` is visible.
    pub(super) async fn attach_container(&self, label: &str, container: &Path) -> Result<PathBuf> {
        log::debug!("Mounting DMG template...");

        let mount_point = self.mount_root.join(label);
        let mut args = vec!["attach".to_string(), path_arg(container)?];
        if self.explicit_mount_point {
            args.push("-mountpoint".to_string());
            args.push(path_arg(&mount_point)?);
        }

        self.runner
            .run("hdiutil", &args)
            .await
            .with_context(|| format!("error when attaching dmg {}", container.display()))?;

        let observed: &Path = &mount_point;
        let polled = poll_until(&self.backoff, || tokio::fs::try_exists(observed)).await;
        match polled {
            Ok(attempts) => {
                log::debug!(
                    "DMG mounted at {} after {} observation(s)",
                    mount_point.display(),
                    attempts
                );
                Ok(mount_point)
            }
            Err(PollError::Exhausted(exhausted)) => Err(Error::MountTimeout {
                mount_point,
                attempts: exhausted.attempts,
            }),
            Err(PollError::Observe(e)) => {
                Err(e).fs_context("error when checking for mounted volume", &mount_point)
            }
        }
    }

    /// Detaches the volume at `mount_point` and waits until it is gone.
    pub(super) async fn detach_volume(&self, mount_point: &Path) -> Result<()> {
        log::debug!("Detaching DMG...");

        let args = vec!["detach".to_string(), path_arg(mount_point)?];
        self.runner
            .run("hdiutil", &args)
            .await
            .with_context(|| format!("error when detaching dmg {}", mount_point.display()))?;

        let still_mounted =
            || async move { tokio::fs::try_exists(mount_point).await.map(|found| !found) };
        match poll_until(&self.backoff, still_mounted).await {
            Ok(attempts) => {
                log::debug!(
                    "DMG unmounted from {} after {} observation(s)",
                    mount_point.display(),
                    attempts
                );
                Ok(())
            }
            Err(PollError::Exhausted(exhausted)) => Err(Error::UnmountTimeout {
                mount_point: mount_point.to_path_buf(),
                attempts: exhausted.attempts,
            }),
            Err(PollError::Observe(e)) => {
                Err(e).fs_context("error when checking for unmounted volume", mount_point)
            }
        }
    }

    /// Forcibly detaches `mount_point` without waiting.
    pub(super) async fn force_detach_volume(&self, mount_point: &Path) -> Result<()> {
        let args = vec![
            "detach".to_string(),
            path_arg(mount_point)?,
            "-force".to_string(),
        ];
        self.runner
            .run("hdiutil", &args)
            .await
            .with_context(|| format!("error when force detaching dmg {}", mount_point.display()))?;
        Ok(())
    }
}
