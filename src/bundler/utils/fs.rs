//! File system utilities for bundling.
//!
//! Provides safe file operations with automatic directory creation,
//! symlink preservation, and errors that carry the offending path.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{
    io::{self},
    path::{Path, PathBuf},
};
use tokio::fs;

/// Creates all of the directories of the specified path.
///
/// Succeeds when the directory already exists.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .fs_context("error when creating directory path", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("error when deleting directory", path),
    }
}

/// Removes a file if it exists.
pub async fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("error when deleting file", path),
    }
}

/// Reports whether a regular file exists at `path`.
///
/// A directory at `path` is an error, not a missing file.
pub async fn file_exists(path: &Path) -> Result<bool> {
    match fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Err(Error::GenericError(format!(
            "[{}] is a directory, not a file",
            path.display()
        ))),
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).fs_context("error when checking if file exists", path),
    }
}

/// Returns whether `path` exists; a broken symlink counts as absent.
pub async fn path_exists(path: &Path) -> Result<bool> {
    fs::try_exists(path)
        .await
        .fs_context("error when checking if path exists", path)
}

/// Returns the type of the entry at `path`, or `None` when nothing is there.
async fn entry_type(path: &Path) -> Result<Option<std::fs::FileType>> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(Some(metadata.file_type())),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).fs_context("error when reading metadata", path),
    }
}

/// Writes `contents` to `path`, replacing any existing file.
pub async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents)
        .await
        .fs_context("error when writing to file", path)
}

/// Makes a symbolic link to a directory.
#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Creates `link` pointing at the directory `target`.
///
/// The target does not need to exist on this machine.
pub async fn create_dir_symlink(target: &Path, link: &Path) -> Result<()> {
    let target = target.to_path_buf();
    let link_owned = link.to_path_buf();
    tokio::task::spawn_blocking(move || symlink_dir(&target, &link_owned))
        .await
        .map_err(|e| Error::GenericError(format!("Symlink task panicked: {}", e)))?
        .fs_context("error when creating symlink", link)
}

/// Copies a regular file into `dest_dir`, keeping its file name.
///
/// Fails if the source path is a directory or doesn't exist. Permission bits,
/// including the executable bit, are preserved. Returns the new file's path.
pub async fn copy_file_into(from: &Path, dest_dir: &Path) -> Result<PathBuf> {
    match entry_type(from).await? {
        None => return Err(Error::GenericError(format!("{from:?} does not exist"))),
        Some(kind) if !kind.is_file() => {
            return Err(Error::GenericError(format!("{from:?} is not a file")));
        }
        Some(_) => {}
    }
    let file_name = from
        .file_name()
        .ok_or_else(|| Error::GenericError(format!("{from:?} has no file name")))?;
    let to = dest_dir.join(file_name);

    fs::create_dir_all(dest_dir)
        .await
        .fs_context("error when creating directory path", dest_dir)?;
    fs::copy(from, &to)
        .await
        .fs_context("error when copying file", &to)?;
    Ok(to)
}

/// Recursively copies a directory from one path to another, creating any
/// parent directories of the destination path as necessary.
///
/// Preserves symlinks on platforms that support them.
/// Fails if the source path is not a directory or doesn't exist.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    match entry_type(from).await? {
        None => return Err(Error::GenericError(format!("{from:?} does not exist"))),
        Some(kind) if !kind.is_dir() => {
            return Err(Error::GenericError(format!("{from:?} is not a Directory")));
        }
        Some(_) => {}
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    // Offload blocking work to dedicated thread pool
    tokio::task::spawn_blocking(move || -> Result<()> {
        if let Some(parent) = to.parent() {
            std::fs::create_dir_all(parent).fs_context("error when creating directory path", parent)?;
        }

        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry?;
            let rel_path = entry.path().strip_prefix(&from)?;
            let dest_path = to.join(rel_path);

            if entry.file_type().is_symlink() {
                let target = std::fs::read_link(entry.path())
                    .fs_context("error when reading symlink", entry.path())?;
                let linked = if entry.path().is_dir() {
                    symlink_dir(&target, &dest_path)
                } else {
                    symlink_file(&target, &dest_path)
                };
                linked.fs_context("error when creating symlink", &dest_path)?;
            } else if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest_path)
                    .fs_context("error when creating directory path", &dest_path)?;
            } else {
                std::fs::copy(entry.path(), &dest_path)
                    .fs_context("error when copying file", &dest_path)?;
            }
        }

        Ok(())
    })
    .await
    .map_err(|e| Error::GenericError(format!("Directory copy task panicked: {}", e)))?
}
