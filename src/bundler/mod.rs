//! macOS DMG bundler.
//!
//! Turns a compiled binary and an icon image into a drag-to-install disk
//! image:
//!
//! 1. [`BuildRequest`] is validated before anything touches the disk
//! 2. A `{Name}.app` bundle is assembled in a scratch workspace
//! 3. The bundle is copied onto a freshly created, attached container next
//!    to an `Applications` shortcut
//! 4. The container is detached and converted into `{Name}.dmg`
//! 5. The scratch workspace is removed on every path
//!
//! External tools are reached through [`CommandRunner`], [`DiskImageTool`]
//! and [`IconTool`], all injectable through [`Bundler`].

pub mod builder;
pub mod error;
pub mod platform;
pub mod process;
pub mod progress;
pub mod settings;
pub mod utils;

pub use builder::{BuiltArtifact, Bundler};
pub use error::{Error, FieldError, FieldErrors, Result, Stage};
pub use platform::macos::{
    app::AppBundle,
    dmg::{ContainerSpec, ContainerState, DiskImageTool, DmgPipeline, Hdiutil},
    icon::{ICON_SIZES, IconTool, SipsIconTool},
};
pub use process::{CommandRunner, SystemCommandRunner};
pub use progress::{BuildObserver, NoopObserver};
pub use settings::{BuildRequest, BuildRequestBuilder, DmgSettings};
pub use utils::retry::LinearBackoff;
