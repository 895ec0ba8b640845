//! External initializer invocation

use crate::invocation::InvocationArgs;
use crate::scope::ScopedDirs;
use crate::OpsCtx;
use dotstrap_config::DelegateConfig;
use dotstrap_errors::{Error, OpsError};
use dotstrap_platform::{PlatformCommand, PlatformContext};
use std::path::PathBuf;
use tracing::info;

/// Fully resolved initializer command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateInvocation {
    pub program: String,
    /// Leading arguments followed by `--config <c> --workspace <w>`
    pub args: Vec<String>,
    pub current_dir: PathBuf,
}

impl DelegateInvocation {
    #[must_use]
    pub fn new(delegate: &DelegateConfig, invocation: &InvocationArgs, current_dir: PathBuf) -> Self {
        let mut args = delegate.args.clone();
        args.extend([
            "--config".to_string(),
            invocation.config.clone(),
            "--workspace".to_string(),
            invocation.workspace.clone(),
        ]);
        Self {
            program: delegate.program.clone(),
            args,
            current_dir,
        }
    }

    /// Command line as shown in plans and logs
    #[must_use]
    pub fn display(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Build the child command, adding the scoped directories to its
    /// environment only.
    #[must_use]
    pub fn command(&self, scope: Option<&ScopedDirs>) -> PlatformCommand {
        let mut cmd = PlatformCommand::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.current_dir)
            .inherit_stdio();
        if let Some(scope) = scope {
            for (var, path) in scope.env() {
                cmd.env(var, path);
            }
        }
        cmd
    }

    /// Run the initializer to completion.
    ///
    /// # Errors
    ///
    /// Returns `OpsError::DelegateFailed` carrying the child's exit code if
    /// it exits non-zero or is killed by a signal.
    pub async fn run(
        &self,
        ctx: &OpsCtx,
        step: &str,
        scope: Option<&ScopedDirs>,
    ) -> Result<(), Error> {
        info!(command = %self.display(), "Running initializer");
        let output = ctx
            .platform
            .execute_command(&PlatformContext::for_step(step), self.command(scope))
            .await?;

        if output.success() {
            Ok(())
        } else {
            Err(OpsError::DelegateFailed {
                program: self.program.clone(),
                code: output.code,
            }
            .into())
        }
    }
}
