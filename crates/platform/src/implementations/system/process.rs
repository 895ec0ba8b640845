//! Process operations implemented with `tokio::process`

use async_trait::async_trait;
use dotstrap_errors::{Error, PlatformError};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::core::PlatformContext;
use crate::process::{CommandOutput, PlatformCommand, ProcessOperations, StdioMode};

/// Host implementation of process operations
pub struct SystemProcessOperations;

impl SystemProcessOperations {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemProcessOperations {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessOperations for SystemProcessOperations {
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        let start = Instant::now();
        let step = ctx.step().unwrap_or("-");
        debug!(step, command = %cmd.display(), "Executing command");

        let mut command = Command::new(cmd.program());
        command.args(cmd.get_args());

        if let Some(dir) = cmd.get_current_dir() {
            command.current_dir(dir);
        }

        for (key, value) in cmd.get_env_vars() {
            command.env(key, value);
        }

        let spawn_error = |e: std::io::Error| {
            Error::from(PlatformError::ProcessExecutionFailed {
                command: cmd.program().to_string(),
                message: e.to_string(),
            })
        };

        let output = match cmd.stdio() {
            StdioMode::Capture => {
                let output = command
                    .stdin(Stdio::null())
                    .output()
                    .await
                    .map_err(spawn_error)?;
                CommandOutput {
                    code: output.status.code(),
                    stdout: output.stdout,
                    stderr: output.stderr,
                }
            }
            StdioMode::Inherit => {
                let status = command.status().await.map_err(spawn_error)?;
                CommandOutput {
                    code: status.code(),
                    ..CommandOutput::default()
                }
            }
        };

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        if output.success() {
            debug!(step, program = cmd.program(), duration_ms, "Command finished");
        } else {
            warn!(
                step,
                program = cmd.program(),
                code = ?output.code,
                duration_ms,
                "Command exited unsuccessfully"
            );
        }

        Ok(output)
    }

    async fn which(&self, program: &str) -> Result<PathBuf, Error> {
        which::which(program).map_err(|_| {
            Error::from(PlatformError::CommandNotFound {
                command: program.to_string(),
            })
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exit_code_is_reported_not_raised() {
        let ops = SystemProcessOperations::new();
        let mut cmd = PlatformCommand::new("sh");
        cmd.args(["-c", "exit 3"]);

        let output = ops
            .execute_command(&PlatformContext::new(), cmd)
            .await
            .unwrap();
        assert_eq!(output.code, Some(3));
        assert!(!output.success());
    }

    #[tokio::test]
    async fn test_env_overrides_reach_the_child_only() {
        let ops = SystemProcessOperations::new();
        let mut cmd = PlatformCommand::new("sh");
        cmd.args(["-c", "printf %s \"$DOTSTRAP_TEST_VALUE\""])
            .env("DOTSTRAP_TEST_VALUE", "scoped");

        let output = ops
            .execute_command(&PlatformContext::new(), cmd)
            .await
            .unwrap();
        assert_eq!(output.stdout_lossy(), "scoped");
        assert!(std::env::var("DOTSTRAP_TEST_VALUE").is_err());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_an_error() {
        let ops = SystemProcessOperations::new();
        let cmd = PlatformCommand::new("dotstrap-no-such-program-xyz");

        let result = ops.execute_command(&PlatformContext::new(), cmd).await;
        assert!(matches!(
            result,
            Err(Error::Platform(PlatformError::ProcessExecutionFailed { .. }))
        ));
    }

    #[tokio::test]
    async fn test_which() {
        let ops = SystemProcessOperations::new();
        assert!(ops.which("sh").await.is_ok());
        assert!(matches!(
            ops.which("dotstrap-no-such-program-xyz").await,
            Err(Error::Platform(PlatformError::CommandNotFound { .. }))
        ));
    }
}
