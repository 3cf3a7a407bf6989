//! Shared fixtures: a scripted stand-in for hdiutil, sips and iconutil.

#![allow(dead_code)]

use async_trait::async_trait;
use kodegen_bundler_dmg::bundler::{
    BuildRequest, BuildRequestBuilder, Bundler, CommandRunner, DmgSettings, Error, LinearBackoff,
    Result,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use walkdir::WalkDir;

/// Emulates the macOS disk image and icon utilities on the local filesystem.
///
/// `attach` creates the `-mountpoint` directory, `detach` removes it, and
/// every command that takes `-o`/`--out` writes a small file there.
#[derive(Default)]
pub struct FakeRunner {
    /// Every invocation as `program arg...`
    pub calls: Mutex<Vec<Vec<String>>>,
    /// Relative paths found on the volume right before each detach
    pub volume_contents: Mutex<Vec<String>>,
    /// `sips` fails when asked for this size
    pub fail_icon_size: Option<u32>,
    /// `attach` succeeds but the mount point never shows up
    pub mount_never_appears: bool,
    /// A plain `detach` leaves the mount point in place
    pub unmount_stuck: bool,
    /// `convert` writes a partial artifact and then fails
    pub convert_fails: bool,
}

fn value_after<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn tool_failure(program: &str, args: &[String], output: &str) -> Error {
    Error::ExternalTool {
        command: format!("{} {}", program, args.join(" ")),
        status: "exit status: 1".to_string(),
        output: output.to_string(),
    }
}

fn write(path: &str, contents: &str) {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

impl FakeRunner {
    /// Invocations of `program`, arguments only.
    pub fn calls_to(&self, program: &str) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call[0] == program)
            .map(|call| call[1..].to_vec())
            .collect()
    }

    /// `hdiutil` subcommands in invocation order, with `-force` marked.
    pub fn hdiutil_sequence(&self) -> Vec<String> {
        self.calls_to("hdiutil")
            .into_iter()
            .map(|args| {
                if args.iter().any(|a| a == "-force") {
                    format!("{} -force", args[0])
                } else {
                    args[0].clone()
                }
            })
            .collect()
    }

    fn snapshot(&self, mount_point: &Path) {
        let mut contents = self.volume_contents.lock().unwrap();
        for entry in WalkDir::new(mount_point).min_depth(1).sort_by_file_name() {
            let entry = entry.unwrap();
            let relative = entry.path().strip_prefix(mount_point).unwrap();
            contents.push(relative.to_string_lossy().into_owned());
        }
    }

    fn hdiutil(&self, args: &[String]) -> Result<String> {
        match args[0].as_str() {
            "create" => {
                let output = value_after(args, "-o").unwrap();
                write(output, "writable container");
                Ok(format!("created: {output}"))
            }
            "attach" => {
                let mount_point = value_after(args, "-mountpoint").unwrap();
                if !self.mount_never_appears {
                    std::fs::create_dir_all(mount_point).unwrap();
                }
                Ok(format!("/dev/disk4s1\tApple_APFS\t{mount_point}"))
            }
            "detach" => {
                let mount_point = Path::new(&args[1]);
                let forced = args.iter().any(|a| a == "-force");
                if mount_point.exists() && !forced {
                    self.snapshot(mount_point);
                }
                if forced || !self.unmount_stuck {
                    let _ = std::fs::remove_dir_all(mount_point);
                }
                Ok(format!("\"{}\" ejected.", mount_point.display()))
            }
            "convert" => {
                let output = value_after(args, "-o").unwrap();
                if self.convert_fails {
                    write(output, "partial");
                    return Err(tool_failure("hdiutil", args, "hdiutil: convert failed - No space left on device"));
                }
                write(output, "compressed read-only image");
                Ok(format!("created: {output}"))
            }
            other => panic!("unexpected hdiutil subcommand {other}"),
        }
    }

    fn sips(&self, args: &[String]) -> Result<String> {
        let size: u32 = args[1].parse().unwrap();
        if self.fail_icon_size == Some(size) {
            return Err(tool_failure("sips", args, "Error: Unable to render destination image"));
        }
        write(value_after(args, "--out").unwrap(), "png");
        Ok(String::new())
    }

    fn iconutil(&self, args: &[String]) -> Result<String> {
        write(value_after(args, "-o").unwrap(), "icns");
        Ok(String::new())
    }
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().cloned());
        self.calls.lock().unwrap().push(call);

        match program {
            "hdiutil" => self.hdiutil(args),
            "sips" => self.sips(args),
            "iconutil" => self.iconutil(args),
            other => panic!("unexpected program {other}"),
        }
    }
}

/// A binary, an icon and an empty output directory in a temporary tree.
pub struct Fixture {
    pub root: TempDir,
    pub request: BuildRequest,
}

impl Fixture {
    pub fn new() -> Self {
        let root = TempDir::new().unwrap();
        let binary = root.path().join("build").join("Greeter");
        let icon = root.path().join("icon.png");
        std::fs::create_dir_all(binary.parent().unwrap()).unwrap();
        std::fs::write(&binary, b"\x7fELF greeter").unwrap();
        std::fs::write(&icon, b"\x89PNG").unwrap();

        let request = BuildRequestBuilder::new()
            .app_name("Greeter")
            .binary_path(&binary)
            .bundle_identifier("com.example.greeter")
            .icon_path(&icon)
            .output_dir(root.path().join("out"))
            .build();

        Self { root, request }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.path().join("out")
    }

    pub fn mount_root(&self) -> PathBuf {
        self.root.path().join("volumes")
    }

    /// Fast polling against the fixture's own mount root.
    pub fn settings(&self) -> DmgSettings {
        DmgSettings {
            mount_root: self.mount_root(),
            backoff: LinearBackoff::new(Duration::from_millis(1), Duration::from_millis(1), 3),
            ..DmgSettings::default()
        }
    }

    pub fn bundler(&self, runner: Arc<FakeRunner>) -> Bundler {
        Bundler::with_runner(self.settings(), runner)
    }

    /// File names currently in the output directory, sorted.
    pub fn output_entries(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.output_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
