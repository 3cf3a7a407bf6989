//! macOS `.app` bundle assembly.
//!
//! Lays out the bundle inside the scratch workspace:
//!
//! ```text
//! {Name}.app/
//! └── Contents/
//!     ├── Info.plist
//!     ├── MacOS/{binary}
//!     └── Resources/icon.icns
//! ```
//!
//! Each step is a precondition for the next and the first failure aborts the
//! assembly. Partial contents are left for the caller, which removes the whole
//! workspace.

use super::icon::{ICON_SIZES, ICONSET_DIR_NAME, IconTool};
use super::info_plist::render_info_plist;
use crate::bundler::{
    error::{Error, Result, Stage},
    progress::{BuildObserver, run_stage},
    settings::BuildRequest,
    utils::fs,
};
use std::path::{Path, PathBuf};

/// A fully assembled application bundle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppBundle {
    /// The `{Name}.app` directory
    pub path: PathBuf,
    /// The binary inside `Contents/MacOS`
    pub executable: PathBuf,
    /// The compiled icon inside `Contents/Resources`
    pub icon: PathBuf,
    /// `Contents/Info.plist`
    pub info_plist: PathBuf,
}

impl AppBundle {
    /// Volume label and artifact stem: the bundle name without `.app`.
    pub fn volume_name(&self) -> Result<&str> {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|stem| *stem != "." && *stem != "..")
            .ok_or_else(|| {
                Error::GenericError(format!("Invalid app bundle path: {}", self.path.display()))
            })
    }
}

/// Paths of the bundle skeleton.
struct BundleLayout {
    root: PathBuf,
    contents: PathBuf,
    macos: PathBuf,
    resources: PathBuf,
    iconset: PathBuf,
}

impl BundleLayout {
    fn new(bundle_dir_name: &str, workspace: &Path) -> Self {
        let root = workspace.join(bundle_dir_name);
        let contents = root.join("Contents");
        Self {
            macos: contents.join("MacOS"),
            resources: contents.join("Resources"),
            iconset: workspace.join(ICONSET_DIR_NAME),
            contents,
            root,
        }
    }
}

/// Builds `{app_name}.app` in `workspace` from a validated request.
pub async fn bundle_app(
    request: &BuildRequest,
    workspace: &Path,
    icons: &dyn IconTool,
    observer: &dyn BuildObserver,
) -> Result<AppBundle> {
    log::info!("Creating app bundle for {}", request.app_name);

    let layout = BundleLayout::new(&request.bundle_dir_name(), workspace);

    run_stage(observer, Stage::CreateBundleDirectories, async {
        for dir in [&layout.root, &layout.iconset, &layout.macos, &layout.resources] {
            fs::create_dir_all(dir).await?;
        }
        Ok::<_, Error>(())
    })
    .await?;

    run_stage(
        observer,
        Stage::RenderIcons,
        icons.render(request.icon_path(), &layout.iconset, &ICON_SIZES),
    )
    .await?;

    let icon = run_stage(
        observer,
        Stage::CompileIcons,
        icons.compile(&layout.iconset, &layout.resources),
    )
    .await?;

    let executable = run_stage(
        observer,
        Stage::CopyBinary,
        fs::copy_file_into(request.binary_path(), &layout.macos),
    )
    .await?;

    let info_plist = run_stage(observer, Stage::WriteInfoPlist, async {
        let executable_name = executable
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                Error::GenericError(format!(
                    "binary path is not valid UTF-8: {}",
                    executable.display()
                ))
            })?;
        let plist_path = layout.contents.join("Info.plist");
        let plist = render_info_plist(executable_name, &request.bundle_identifier);
        fs::write_file(&plist_path, plist.as_bytes()).await?;
        Ok::<_, Error>(plist_path)
    })
    .await?;

    log::info!("✓ Created app bundle: {}", layout.root.display());

    Ok(AppBundle {
        path: layout.root,
        executable,
        icon,
        info_plist,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle_at(path: &str) -> AppBundle {
        AppBundle {
            path: PathBuf::from(path),
            executable: PathBuf::new(),
            icon: PathBuf::new(),
            info_plist: PathBuf::new(),
        }
    }

    #[test]
    fn volume_name_is_bundle_stem() {
        assert_eq!(bundle_at("/tmp/ws/Greeter.app").volume_name().unwrap(), "Greeter");
        assert_eq!(bundle_at("/tmp/ws/.hidden.app").volume_name().unwrap(), ".hidden");
    }

    #[test]
    fn volume_name_rejects_parent_directory() {
        assert!(bundle_at("/tmp/ws/...app").volume_name().is_err());
    }
}
