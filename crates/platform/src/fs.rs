//! Filesystem convenience helpers.
//!
//! These are blocking on purpose: they run between sequential steps and from
//! `Drop` implementations, where no runtime is available.

use dotstrap_errors::PlatformError;
use std::io::ErrorKind;
use std::path::Path;

/// Result type for filesystem operations
pub type Result<T> = std::result::Result<T, PlatformError>;

fn fs_error(operation: &str, path: &Path, err: &std::io::Error) -> PlatformError {
    PlatformError::FilesystemOperationFailed {
        operation: operation.to_string(),
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Create a directory and all of its parents
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| fs_error("create_dir_all", path, &e))
}

/// Remove a directory tree, treating an absent directory as success
///
/// Returns whether anything was removed.
///
/// # Errors
///
/// Returns an error for any failure other than the path not existing.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(fs_error("remove_dir_all", path, &e)),
    }
}

/// Write `contents` to `path`, creating parent directories first
///
/// # Errors
///
/// Returns an error if a parent directory or the file cannot be written.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_dir(parent)?;
        }
    }
    std::fs::write(path, contents).map_err(|e| fs_error("write", path, &e))
}
