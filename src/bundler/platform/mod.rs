//! Platform-specific bundling.
//!
//! Only macOS is supported: the bundle layout, icon format and disk image
//! tooling are all native to it.

pub mod macos;
