//! Process execution operations

use async_trait::async_trait;
use dotstrap_errors::Error;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::core::PlatformContext;

/// How the child's standard streams are wired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdioMode {
    /// stdout and stderr are collected into [`CommandOutput`]
    #[default]
    Capture,
    /// The child shares the runner's terminal
    Inherit,
}

/// Platform-specific command builder and execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCommand {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    env: BTreeMap<String, OsString>,
    stdio: StdioMode,
}

impl PlatformCommand {
    /// Create a new platform command
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            current_dir: None,
            env: BTreeMap::new(),
            stdio: StdioMode::Capture,
        }
    }

    /// Add an argument to the command
    pub fn arg<S: AsRef<str>>(&mut self, arg: S) -> &mut Self {
        self.args.push(arg.as_ref().to_string());
        self
    }

    /// Add multiple arguments to the command
    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string());
        }
        self
    }

    /// Set the working directory for the command
    pub fn current_dir<P: Into<PathBuf>>(&mut self, dir: P) -> &mut Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set an environment variable for the child only
    pub fn env<K: Into<String>, V: AsRef<OsStr>>(&mut self, key: K, value: V) -> &mut Self {
        self.env.insert(key.into(), value.as_ref().to_os_string());
        self
    }

    /// Let the child write directly to the runner's terminal
    pub fn inherit_stdio(&mut self) -> &mut Self {
        self.stdio = StdioMode::Inherit;
        self
    }

    /// Get the program name
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Get the arguments
    #[must_use]
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Get the current directory
    #[must_use]
    pub fn get_current_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// Get the environment overrides
    #[must_use]
    pub fn get_env_vars(&self) -> &BTreeMap<String, OsString> {
        &self.env
    }

    #[must_use]
    pub fn stdio(&self) -> StdioMode {
        self.stdio
    }

    /// Program and arguments joined for log output
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output from command execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Output of a process that exited with `code` and printed nothing
    #[must_use]
    pub fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Trait for process execution operations
///
/// A non-zero exit is not an error at this layer; callers decide what a
/// failed command means. Only failing to spawn is reported as `Err`.
#[async_trait]
pub trait ProcessOperations: Send + Sync {
    /// Execute a command and return the output
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error>;

    /// Create a new command builder
    fn create_command(&self, program: &str) -> PlatformCommand {
        PlatformCommand::new(program)
    }

    /// Find the path to an executable
    async fn which(&self, program: &str) -> Result<PathBuf, Error>;
}
