//! Mirror a dotfile tree into the home directory
//!
//! The walk never follows symlinks: links in the source are reproduced as
//! links in the target. Files are compared byte for byte, so a second sync
//! of an unchanged tree writes nothing.

use dotstrap_errors::{Error, SyncError};
use dotstrap_types::SyncSummary;
use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Tuning for one sync
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Names or relative paths never copied (and never pruned)
    pub exclude: Vec<String>,
    /// Remove entries of tracked subdirectories absent from the source
    pub prune: bool,
}

impl SyncOptions {
    fn is_excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|pattern| {
            relative == Path::new(pattern)
                || relative
                    .components()
                    .any(|c| c.as_os_str() == OsStr::new(pattern))
        })
    }
}

fn io_error(operation: &'static str, path: &Path, err: &std::io::Error) -> SyncError {
    SyncError::Io {
        operation,
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Mirror `source` into `target`.
///
/// # Errors
///
/// Returns `SyncError::SourceNotFound` if `source` is not a directory, or a
/// `SyncError` describing the first filesystem operation that failed.
pub fn sync_tree(source: &Path, target: &Path, options: &SyncOptions) -> Result<SyncSummary, Error> {
    if !source.is_dir() {
        return Err(SyncError::SourceNotFound {
            path: source.display().to_string(),
        }
        .into());
    }
    fs::create_dir_all(target).map_err(|e| io_error("create", target, &e))?;

    let mut summary = SyncSummary::default();
    let mut tracked: Vec<PathBuf> = Vec::new();

    let walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
            // The target may live inside the source tree
            !options.is_excluded(relative) && entry.path() != target
        });

    for entry in walker {
        let entry = entry.map_err(|e| SyncError::WalkFailed {
            path: source.display().to_string(),
            message: e.to_string(),
        })?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| Error::internal(e.to_string()))?;
        let dest = target.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            tracked.push(relative.to_path_buf());
            if sync_dir(&dest)? {
                summary.dirs_created += 1;
            }
        } else if file_type.is_symlink() {
            if sync_symlink(entry.path(), &dest)? {
                summary.symlinks_written += 1;
            } else {
                summary.files_unchanged += 1;
            }
        } else if sync_file(entry.path(), &dest)? {
            debug!(path = %relative.display(), "Copied");
            summary.files_copied += 1;
        } else {
            summary.files_unchanged += 1;
        }
    }

    if options.prune {
        for relative in &tracked {
            summary.pruned += prune_dir(source, target, relative, options)?;
        }
    }

    info!(source = %source.display(), target = %target.display(), %summary, "Dotfiles synced");
    Ok(summary)
}

/// Returns whether a directory had to be created
fn sync_dir(dest: &Path) -> Result<bool, SyncError> {
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.is_dir() => return Ok(false),
        Ok(_) => remove_entry(dest)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(io_error("inspect", dest, &e)),
    }
    fs::create_dir(dest).map_err(|e| io_error("create", dest, &e))?;
    Ok(true)
}

/// Returns whether the file was written
fn sync_file(src: &Path, dest: &Path) -> Result<bool, SyncError> {
    match fs::symlink_metadata(dest) {
        Ok(meta) if meta.is_file() => {
            if same_contents(src, dest, meta.len())? {
                return Ok(false);
            }
        }
        Ok(_) => remove_entry(dest)?,
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => return Err(io_error("inspect", dest, &e)),
    }
    fs::copy(src, dest).map_err(|e| io_error("copy", dest, &e))?;
    Ok(true)
}

fn same_contents(src: &Path, dest: &Path, dest_len: u64) -> Result<bool, SyncError> {
    let src_len = fs::metadata(src)
        .map_err(|e| io_error("inspect", src, &e))?
        .len();
    if src_len != dest_len {
        return Ok(false);
    }
    let left = fs::read(src).map_err(|e| io_error("read", src, &e))?;
    let right = fs::read(dest).map_err(|e| io_error("read", dest, &e))?;
    Ok(left == right)
}

/// Returns whether the link was (re)written
fn sync_symlink(src: &Path, dest: &Path) -> Result<bool, SyncError> {
    let link = fs::read_link(src).map_err(|e| io_error("read link", src, &e))?;
    match fs::read_link(dest) {
        Ok(existing) if existing == link => return Ok(false),
        Ok(_) => remove_entry(dest)?,
        Err(_) => {
            if fs::symlink_metadata(dest).is_ok() {
                remove_entry(dest)?;
            }
        }
    }
    create_symlink(&link, dest)?;
    Ok(true)
}

#[cfg(unix)]
fn create_symlink(link: &Path, dest: &Path) -> Result<(), SyncError> {
    std::os::unix::fs::symlink(link, dest).map_err(|e| io_error("link", dest, &e))
}

#[cfg(not(unix))]
fn create_symlink(link: &Path, dest: &Path) -> Result<(), SyncError> {
    let resolved = dest.parent().map_or_else(|| link.to_path_buf(), |p| p.join(link));
    fs::copy(&resolved, dest)
        .map(|_| ())
        .map_err(|e| io_error("copy", dest, &e))
}

/// Remove whatever is at `path`; absent is fine
fn remove_entry(path: &Path) -> Result<(), SyncError> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => Err(e),
    };
    result.map_err(|e| io_error("remove", path, &e))
}

fn prune_dir(
    source: &Path,
    target: &Path,
    relative: &Path,
    options: &SyncOptions,
) -> Result<usize, SyncError> {
    let dest_dir = target.join(relative);
    let entries = fs::read_dir(&dest_dir).map_err(|e| io_error("list", &dest_dir, &e))?;

    let mut pruned = 0;
    for entry in entries {
        let entry = entry.map_err(|e| io_error("list", &dest_dir, &e))?;
        let child = relative.join(entry.file_name());
        if options.is_excluded(&child) {
            continue;
        }
        if fs::symlink_metadata(source.join(&child)).is_err() {
            remove_entry(&entry.path())?;
            info!(path = %child.display(), "Pruned stale entry");
            pruned += 1;
        }
    }
    Ok(pruned)
}
