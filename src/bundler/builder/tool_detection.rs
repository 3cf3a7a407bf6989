//! External tool detection and availability checking.
//!
//! A DMG build shells out to three macOS utilities. Checking for them up
//! front turns a confusing mid-build spawn failure into a clear message
//! before anything is written to disk.

/// Utilities a DMG build invokes.
pub const REQUIRED_TOOLS: [&str; 3] = ["hdiutil", "sips", "iconutil"];

/// Returns the required tools that cannot be found in `PATH`.
pub fn missing_tools() -> Vec<&'static str> {
    REQUIRED_TOOLS
        .iter()
        .copied()
        .filter(|tool| match which::which(tool) {
            Ok(path) => {
                log::debug!("Found {} at: {}", tool, path.display());
                false
            }
            Err(e) => {
                log::debug!("{} not found in PATH: {}", tool, e);
                true
            }
        })
        .collect()
}
