//! DMG format conversion utilities.
//!
//! The container is staged read-write so the bundle can be copied in; the
//! distributed artifact is the compressed read-only conversion (UDZO by
//! default). Conversion must happen after detach.

use super::Hdiutil;
use crate::bundler::error::{Context, Result};
use crate::bundler::process::path_arg;
use std::path::Path;

impl Hdiutil {
    /// Converts the detached container into the compressed artifact at `output`.
    pub(super) async fn convert_container(&self, container: &Path, output: &Path) -> Result<()> {
        log::info!("Converting DMG to compressed format...");

        let args = vec![
            "convert".to_string(),
            path_arg(container)?,
            "-format".to_string(),
            self.format.clone(),
            "-o".to_string(),
            path_arg(output)?,
        ];

        self.runner
            .run("hdiutil", &args)
            .await
            .with_context(|| format!("error when converting dmg file {}", container.display()))?;

        log::info!("✓ DMG converted to compressed {} format", self.format);
        Ok(())
    }
}
