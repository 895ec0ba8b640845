//! Shell completion generation

use crate::step::StepOutcome;
use crate::OpsCtx;
use dotstrap_config::CompletionsConfig;
use dotstrap_errors::{Error, OpsError};
use dotstrap_platform::{fs, PlatformContext};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionSpec {
    pub tool: String,
    pub shell: String,
    pub output: PathBuf,
}

impl CompletionSpec {
    #[must_use]
    pub fn from_config(config: &CompletionsConfig, ctx: &OpsCtx) -> Self {
        Self {
            tool: config.tool.clone(),
            shell: config.shell.clone(),
            output: ctx.expand(&config.output),
        }
    }

    #[must_use]
    pub fn display(&self) -> String {
        format!(
            "{} --completions {} > {}",
            self.tool,
            self.shell,
            self.output.display()
        )
    }

    /// Write the tool's completion script; skipped when the tool is absent.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::StepFailed` if the tool exits non-zero, or a
    /// platform error if the output cannot be written.
    pub async fn run(&self, ctx: &OpsCtx, step: &str) -> Result<StepOutcome, Error> {
        if ctx.platform.which(&self.tool).await.is_err() {
            return Ok(StepOutcome::Skipped(format!("{} not found", self.tool)));
        }

        let mut cmd = ctx.platform.command(&self.tool);
        cmd.args(["--completions", self.shell.as_str()]);
        let output = ctx
            .platform
            .execute_command(&PlatformContext::for_step(step), cmd)
            .await?;
        if !output.success() {
            return Err(OpsError::StepFailed {
                step: step.to_string(),
                message: output.stderr_lossy().trim().to_string(),
                code: output.code,
            }
            .into());
        }

        fs::write_file(&self.output, &output.stdout)?;
        info!(path = %self.output.display(), "Wrote completions");
        Ok(StepOutcome::Completed(Some(self.output.display().to_string())))
    }
}
