//! Operations context for dependency injection

use dotstrap_config::Config;
use dotstrap_errors::{ConfigError, Error, OpsError};
use dotstrap_platform::Platform;
use std::path::{Path, PathBuf};

/// Operations context providing access to everything a run needs
#[derive(Debug)]
pub struct OpsCtx {
    /// Process execution
    pub platform: Platform,
    /// Runner settings
    pub config: Config,
    /// Directory the run was started from; scoped directories live here
    pub base_dir: PathBuf,
    /// Home directory used for `~` expansion and as the dotfile target
    pub home_dir: PathBuf,
}

impl OpsCtx {
    // No public constructor - use OpsContextBuilder instead

    /// Expand a settings path against the home directory
    #[must_use]
    pub fn expand(&self, raw: &str) -> PathBuf {
        dotstrap_config::expand_home(raw, &self.home_dir)
    }

    /// Resolve a settings path relative to the base directory
    #[must_use]
    pub fn in_base_dir(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }
}

/// Builder for `OpsCtx`
pub struct OpsContextBuilder {
    platform: Option<Platform>,
    config: Option<Config>,
    base_dir: Option<PathBuf>,
    home_dir: Option<PathBuf>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            platform: None,
            config: None,
            base_dir: None,
            home_dir: None,
        }
    }

    /// Set platform
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Set base directory (defaults to the current directory)
    #[must_use]
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Set home directory (defaults to the user's home)
    #[must_use]
    pub fn with_home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = Some(dir.into());
        self
    }

    /// Build the context
    ///
    /// # Errors
    ///
    /// Returns an error if the platform or configuration is missing, or if
    /// the current or home directory cannot be determined.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let platform = self.platform.ok_or_else(|| OpsError::MissingComponent {
            component: "platform".to_string(),
        })?;

        let config = self.config.ok_or_else(|| OpsError::MissingComponent {
            component: "config".to_string(),
        })?;

        let base_dir = match self.base_dir {
            Some(dir) => dir,
            None => std::env::current_dir().map_err(|e| ConfigError::CurrentDirUnavailable {
                message: e.to_string(),
            })?,
        };

        let home_dir = match self.home_dir {
            Some(dir) => dir,
            None => dotstrap_config::home_dir()?,
        };

        Ok(OpsCtx {
            platform,
            config,
            base_dir,
            home_dir,
        })
    }
}

impl Default for OpsContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
