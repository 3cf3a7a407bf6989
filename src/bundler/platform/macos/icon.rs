//! ICNS icon creation using `sips` and `iconutil`.
//!
//! The source image is scaled to every size in [`ICON_SIZES`] inside an
//! `icon.iconset` directory, which `iconutil` then folds into `icon.icns`.

use crate::bundler::error::{Context, Result};
use crate::bundler::process::{CommandRunner, path_arg};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Pixel sizes rendered for the icon set, smallest first.
pub const ICON_SIZES: [u32; 7] = [16, 32, 64, 128, 256, 512, 1024];

/// Name of the compiled icon inside `Contents/Resources`.
pub const ICNS_FILE_NAME: &str = "icon.icns";

/// Directory the rendered sizes are collected in.
pub const ICONSET_DIR_NAME: &str = "icon.iconset";

/// File name of one rendered size inside the icon set.
pub fn rendition_file_name(size: u32) -> String {
    format!("icon_{size}x{size}.png")
}

/// Renders and compiles application icons.
#[async_trait]
pub trait IconTool: Send + Sync {
    /// Scales `source` to each of `sizes` into `iconset_dir`.
    ///
    /// Stops at the first size that fails; no partial icon set is usable.
    async fn render(&self, source: &Path, iconset_dir: &Path, sizes: &[u32]) -> Result<()>;

    /// Compiles `iconset_dir` into [`ICNS_FILE_NAME`] inside `resources_dir`.
    ///
    /// Returns the path of the written icon.
    async fn compile(&self, iconset_dir: &Path, resources_dir: &Path) -> Result<PathBuf>;
}

/// [`IconTool`] driving the macOS `sips` and `iconutil` utilities.
#[derive(Clone)]
pub struct SipsIconTool {
    runner: Arc<dyn CommandRunner>,
}

impl SipsIconTool {
    /// Creates an icon tool executing commands through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl std::fmt::Debug for SipsIconTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SipsIconTool").finish_non_exhaustive()
    }
}

#[async_trait]
impl IconTool for SipsIconTool {
    async fn render(&self, source: &Path, iconset_dir: &Path, sizes: &[u32]) -> Result<()> {
        let source_arg = path_arg(source)?;
        for &size in sizes {
            let out = iconset_dir.join(rendition_file_name(size));
            let args = vec![
                "-z".to_string(),
                size.to_string(),
                size.to_string(),
                source_arg.clone(),
                "--out".to_string(),
                path_arg(&out)?,
            ];
            self.runner
                .run("sips", &args)
                .await
                .with_context(|| format!("error when generating icon with size {size}"))?;
            log::debug!("Rendered {}x{} icon: {}", size, size, out.display());
        }
        Ok(())
    }

    async fn compile(&self, iconset_dir: &Path, resources_dir: &Path) -> Result<PathBuf> {
        let icns = resources_dir.join(ICNS_FILE_NAME);
        let args = vec![
            "-c".to_string(),
            "icns".to_string(),
            "-o".to_string(),
            path_arg(&icns)?,
            path_arg(iconset_dir)?,
        ];
        self.runner
            .run("iconutil", &args)
            .await
            .context("error when generating icon set")?;

        log::info!("Created ICNS file: {}", icns.display());
        Ok(icns)
    }
}
