//! Shell plugin manager installer (oh-my-zsh by default)

use crate::step::StepOutcome;
use crate::OpsCtx;
use dotstrap_config::PluginManagerConfig;
use dotstrap_errors::{Error, OpsError};
use dotstrap_platform::PlatformContext;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

/// Download-and-run installer for the plugin manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginInstall {
    pub url: String,
    pub args: Vec<String>,
    /// Presence of this directory means the manager is already installed
    pub dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
}

impl PluginInstall {
    #[must_use]
    pub fn from_config(config: &PluginManagerConfig, ctx: &OpsCtx) -> Self {
        Self {
            url: config.url.clone(),
            args: config.args.clone(),
            dir: config.dir.as_deref().map(|d| ctx.expand(d)),
            env: config.env.clone(),
        }
    }

    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.dir.as_ref().is_some_and(|d| d.exists())
    }

    #[must_use]
    pub fn display(&self) -> String {
        let mut line = format!("sh -c \"$(curl -fsSL {})\" \"\"", self.url);
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Fetch the installer script and run it.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::StepFailed` if the download or the script exits
    /// non-zero, or a platform error if either cannot be spawned.
    pub async fn run(&self, ctx: &OpsCtx, step: &str) -> Result<StepOutcome, Error> {
        if let Some(dir) = self.dir.as_ref().filter(|_| self.is_installed()) {
            return Ok(StepOutcome::Skipped(format!(
                "already installed at {}",
                dir.display()
            )));
        }

        let platform_ctx = PlatformContext::for_step(step);

        let mut download = ctx.platform.command("curl");
        download.args(["-fsSL", self.url.as_str()]);
        let script = ctx.platform.execute_command(&platform_ctx, download).await?;
        if !script.success() {
            return Err(OpsError::StepFailed {
                step: step.to_string(),
                message: format!("download of {} failed: {}", self.url, script.stderr_lossy().trim()),
                code: script.code,
            }
            .into());
        }

        let mut install = ctx.platform.command("sh");
        install
            .arg("-c")
            .arg(script.stdout_lossy())
            .arg("")
            .args(&self.args)
            .inherit_stdio();
        for (key, value) in &self.env {
            install.env(key.clone(), value);
        }

        info!(url = %self.url, "Running plugin manager installer");
        let output = ctx.platform.execute_command(&platform_ctx, install).await?;
        if output.success() {
            Ok(StepOutcome::Completed(None))
        } else {
            Err(OpsError::StepFailed {
                step: step.to_string(),
                message: "installer script failed".to_string(),
                code: output.code,
            }
            .into())
        }
    }
}
