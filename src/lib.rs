//! macOS DMG bundler library
//!
//! Packages a compiled binary and an icon image into `{Name}.app`, wraps it
//! into a writable disk image next to an `Applications` shortcut, and
//! finalizes it into a compressed, read-only `{Name}.dmg`.
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use bundler::{BuildRequest, BuildRequestBuilder, BuiltArtifact, Bundler, DmgSettings};
pub use error::{BundlerError, CliError, Result};
