//! Command line interface for the DMG bundler.

mod args;
mod output;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;

use crate::bundler::{BuildRequest, BuiltArtifact, Bundler, DmgSettings, builder::tool_detection};
use crate::error::{CliError, Result};
use crate::metadata::{self, CargoManifest};
use std::sync::Arc;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(&args).await
}

/// Runs one build for already parsed arguments.
pub async fn execute(args: &Args) -> Result<i32> {
    let config = create_runtime_config(args);

    let manifest = match &args.manifest {
        Some(path) => {
            config.verbose_println(&format!("Reading defaults from {}", path.display()))?;
            metadata::load_manifest(path)?
        }
        None => CargoManifest::default(),
    };

    let request = args.build_request(&manifest.request);
    request.validate()?;

    let missing = tool_detection::missing_tools();
    if !missing.is_empty() {
        return Err(CliError::MissingTools {
            tools: missing.into_iter().map(String::from).collect(),
        }
        .into());
    }

    let settings = args.dmg_settings(&manifest.dmg);
    config.section(&format!("Bundling {}", request.bundle_dir_name()))?;
    config.verbose_println(&format!(
        "Container: {} {} {} -> {}, mount poll {}",
        settings.size,
        settings.filesystem,
        settings.layout,
        settings.format,
        Args::describe_poll(&settings)
    ))?;

    let artifact = build(settings, request, config.output().clone()).await?;

    if args.quiet {
        println!("{}", artifact.path.display());
    }
    config.success(&format!("DMG created successfully at: {}", artifact.path.display()))?;
    config.indent(&format!("size:   {} bytes", artifact.size))?;
    config.indent(&format!("sha256: {}", artifact.checksum))?;
    if let Some(leftover) = &artifact.leftover_workspace {
        config.warn(&format!(
            "Scratch workspace could not be removed, delete it manually: {}",
            leftover.display()
        ))?;
    }

    Ok(0)
}

async fn build(
    settings: DmgSettings,
    request: BuildRequest,
    output: OutputManager,
) -> Result<BuiltArtifact> {
    let bundler = Arc::new(Bundler::new(settings).with_observer(Arc::new(output)));

    let artifact = bundler
        .spawn(request)
        .await
        .map_err(|e| anyhow::Error::new(e).context("build task did not complete"))??;

    Ok(artifact)
}

/// Create runtime configuration from arguments
pub fn create_runtime_config(args: &Args) -> RuntimeConfig {
    RuntimeConfig::from(args)
}
