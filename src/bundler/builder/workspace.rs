//! Scratch workspace owned by a single build.

use crate::bundler::error::{ErrorExt, Result};
use crate::bundler::utils::fs;
use std::path::Path;
use tempfile::TempDir;

/// Prefix of scratch directories created in the output directory.
pub const WORKSPACE_PREFIX: &str = "tmp-";

/// Uniquely named temporary directory inside the output directory.
///
/// Removed by [`ScratchWorkspace::close`], or on drop if a build is
/// abandoned before reaching it.
#[derive(Debug)]
pub struct ScratchWorkspace {
    dir: TempDir,
}

impl ScratchWorkspace {
    /// Creates `output_dir` if needed and a fresh workspace inside it.
    pub async fn create(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir).await?;

        let dir = tempfile::Builder::new()
            .prefix(WORKSPACE_PREFIX)
            .tempdir_in(output_dir)
            .fs_context("error when creating temp working directory", output_dir)?;
        log::debug!("Created scratch workspace: {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Workspace path.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Deletes the workspace and everything below it.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        self.dir
            .close()
            .fs_context("error when deleting temp working directory", &path)?;
        log::debug!("Removed scratch workspace: {}", path.display());
        Ok(())
    }
}
