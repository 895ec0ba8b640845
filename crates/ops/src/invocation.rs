//! Positional argument handling for the initializer

use dotstrap_config::{expand_home, DelegateConfig};
use dotstrap_errors::OpsError;
use std::path::Path;

/// Values handed to the initializer's `--config` and `--workspace`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationArgs {
    pub config: String,
    pub workspace: String,
    /// True when the defaults were substituted
    pub defaulted: bool,
}

impl InvocationArgs {
    /// Resolve positional arguments.
    ///
    /// Exactly two arguments are passed through verbatim. No arguments
    /// selects the configured defaults, with `~` in the workspace expanded
    /// against `home`. Every other count is a usage error.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::Usage` for any count other than 0 or 2.
    pub fn resolve(
        positional: &[String],
        defaults: &DelegateConfig,
        home: &Path,
    ) -> Result<Self, OpsError> {
        match positional {
            [] => Ok(Self {
                config: defaults.default_config.clone(),
                workspace: expand_home(&defaults.default_workspace, home)
                    .display()
                    .to_string(),
                defaulted: true,
            }),
            [config, workspace] => Ok(Self {
                config: config.clone(),
                workspace: workspace.clone(),
                defaulted: false,
            }),
            other => Err(OpsError::Usage { given: other.len() }),
        }
    }
}
