//! Command line behavior that does not need the macOS tools.

use assert_cmd::Command;
use predicates::prelude::*;

fn bundler() -> Command {
    let mut cmd = Command::cargo_bin("kodegen_bundler_dmg").unwrap();
    cmd.env_clear();
    cmd
}

#[test]
fn help_lists_request_flags() {
    bundler()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--app-name"))
        .stdout(predicate::str::contains("--bundle-identifier"))
        .stdout(predicate::str::contains("--manifest"));
}

#[test]
fn missing_fields_fail_validation() {
    bundler()
        .args(["--app-name", "Greeter"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("binary-path: cannot be blank"))
        .stderr(predicate::str::contains("output-dir: cannot be blank"))
        .stderr(predicate::str::contains("app-name").not());
}

#[test]
fn spaces_in_bundle_identifier_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    bundler()
        .args(["--app-name", "Greeter"])
        .args(["--binary-path", "./Greeter"])
        .args(["--bundle-identifier", "com.example.my app"])
        .args(["--icon-path", "./icon.png"])
        .arg("--output-dir")
        .arg(dir.path().join("out"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bundle-identifier: cannot contain spaces"));

    assert!(!dir.path().join("out").exists());
}

#[test]
fn environment_supplies_fields() {
    bundler()
        .env("KODEGEN_DMG_APP_NAME", "Greeter")
        .env("KODEGEN_DMG_BINARY_PATH", "./Greeter")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("bundle-identifier: cannot be blank"))
        .stderr(predicate::str::contains("binary-path").not());
}

#[test]
fn unreadable_manifest_is_reported() {
    bundler()
        .args(["--manifest", "/nonexistent/Cargo.toml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read /nonexistent/Cargo.toml"));
}

#[test]
fn manifest_fills_request_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = dir.path().join("Cargo.toml");
    std::fs::write(
        &manifest,
        "[package]\nname = \"greeter\"\nversion = \"0.1.0\"\n\n\
         [package.metadata.bundle]\nidentifier = \"com.example.greeter\"\nicon = \"icon.png\"\n",
    )
    .unwrap();

    // only the output directory is left to supply
    bundler()
        .arg("--manifest")
        .arg(&manifest)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("output-dir: cannot be blank"))
        .stderr(predicate::str::contains("app-name").not())
        .stderr(predicate::str::contains("bundle-identifier").not());
}

#[test]
fn zero_poll_attempts_is_an_argument_error() {
    bundler()
        .args(["--poll-attempts", "0"])
        .assert()
        .code(2);
}
