//! Kodegen Bundler DMG - drag-to-install disk images for Rust binaries.
//!
//! This binary creates `{Name}.dmg` from a compiled binary and an icon with
//! proper error handling and artifact verification.

use kodegen_bundler_dmg::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            for suggestion in e.recovery_suggestions() {
                eprintln!("  hint: {}", suggestion);
            }
            1
        }
    };

    process::exit(exit_code);
}
