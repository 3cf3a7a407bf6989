//! Configuration structures for DMG builds.
//!
//! [`BuildRequest`] carries the per-build inputs, [`DmgSettings`] the
//! container parameters and poll schedule shared by every build.

mod builder;
mod macos;
mod request;

// Re-export all public types
pub use builder::BuildRequestBuilder;
pub use macos::{
    DEFAULT_CONTAINER_SIZE, DEFAULT_FILESYSTEM, DEFAULT_FORMAT, DEFAULT_LAYOUT,
    DEFAULT_MOUNT_ROOT, DmgSettings,
};
pub use request::BuildRequest;
