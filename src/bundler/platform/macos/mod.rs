//! macOS bundling: `.app` assembly, ICNS icons and DMG disk images.

pub mod app;
pub mod dmg;
pub mod icon;
pub mod info_plist;
