//! Writable container creation using `hdiutil create`.

use super::{ContainerSpec, Hdiutil};
use crate::bundler::error::{Context, Result};
use crate::bundler::process::path_arg;
use std::path::Path;

impl Hdiutil {
    /// Allocates an empty writable container at `output`.
    ///
    /// The volume inside is labelled `spec.label`, which later decides the
    /// mount point.
    pub(super) async fn create_container(&self, spec: &ContainerSpec<'_>, output: &Path) -> Result<()> {
        let args = vec![
            "create".to_string(),
            "-size".to_string(),
            spec.size.to_string(),
            "-fs".to_string(),
            spec.filesystem.to_string(),
            "-volname".to_string(),
            spec.label.to_string(),
            "-layout".to_string(),
            spec.layout.to_string(),
            "-o".to_string(),
            path_arg(output)?,
        ];

        self.runner
            .run("hdiutil", &args)
            .await
            .with_context(|| format!("error when creating dmg with name {}", spec.label))?;

        log::info!(
            "✓ Created {} {} container: {}",
            spec.size,
            spec.filesystem,
            output.display()
        );
        Ok(())
    }
}
