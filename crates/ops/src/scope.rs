//! Scoped directories that live only for the duration of a run
//!
//! [`ScopedDirs`] removes its directories when dropped, so every exit path
//! out of the runner (including `?` on a failed step) cleans up. The success
//! path calls [`ScopedDirs::release`] to surface removal errors.

use dotstrap_config::ScopeConfig;
use dotstrap_errors::{Error, OpsError};
use dotstrap_platform::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A directory exported to the initializer through an environment variable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedDir {
    pub var: String,
    pub path: PathBuf,
}

/// The set of directories a run will create and remove
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeLayout {
    pub dirs: Vec<ScopedDir>,
}

impl ScopeLayout {
    /// Layout from settings; relative paths are placed under `base_dir`
    #[must_use]
    pub fn from_config(scope: &ScopeConfig, base_dir: &Path) -> Self {
        Self {
            dirs: vec![
                ScopedDir {
                    var: scope.cache_var.clone(),
                    path: base_dir.join(&scope.cache_dir),
                },
                ScopedDir {
                    var: scope.runtime_var.clone(),
                    path: base_dir.join(&scope.runtime_dir),
                },
            ],
        }
    }
}

/// RAII guard owning the scoped directories
#[derive(Debug)]
pub struct ScopedDirs {
    dirs: Vec<ScopedDir>,
    released: bool,
}

impl ScopedDirs {
    /// Create every directory in `layout`.
    ///
    /// If one directory cannot be created, the ones already created are
    /// removed again before the error is returned.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::ScopeSetupFailed` if a directory cannot be created.
    pub fn acquire(layout: &ScopeLayout) -> Result<Self, Error> {
        let mut guard = Self {
            dirs: Vec::with_capacity(layout.dirs.len()),
            released: false,
        };

        for dir in &layout.dirs {
            if dir.path.exists() {
                debug!(path = %dir.path.display(), "Reusing leftover scoped directory");
            }
            fs::ensure_dir(&dir.path).map_err(|e| OpsError::ScopeSetupFailed {
                path: dir.path.display().to_string(),
                message: e.to_string(),
            })?;
            info!(var = %dir.var, path = %dir.path.display(), "Scoped directory ready");
            guard.dirs.push(dir.clone());
        }

        Ok(guard)
    }

    /// Environment overrides for the initializer
    pub fn env(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.dirs.iter().map(|d| (d.var.as_str(), d.path.as_path()))
    }

    /// Remove the directories now, reporting the first failure.
    ///
    /// Every directory is attempted even if an earlier one fails. A
    /// directory that is already gone is not an error.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::CleanupFailed` for the first directory that could
    /// not be removed.
    pub fn release(mut self) -> Result<(), Error> {
        self.released = true;
        let mut first_error = None;
        for dir in &self.dirs {
            if let Err(e) = remove(dir) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn remove(dir: &ScopedDir) -> Result<(), Error> {
    match fs::remove_dir_if_exists(&dir.path) {
        Ok(true) => {
            info!(path = %dir.path.display(), "Removed scoped directory");
            Ok(())
        }
        Ok(false) => {
            debug!(path = %dir.path.display(), "Scoped directory already absent");
            Ok(())
        }
        Err(e) => Err(OpsError::CleanupFailed {
            path: dir.path.display().to_string(),
            message: e.to_string(),
        }
        .into()),
    }
}

impl Drop for ScopedDirs {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        // Never propagates: an earlier failure owns the exit code.
        for dir in &self.dirs {
            if let Err(e) = remove(dir) {
                warn!(error = %e, "Failed to remove scoped directory");
            }
        }
    }
}
