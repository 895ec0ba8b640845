//! Core platform abstractions and context management

use std::collections::BTreeMap;

use crate::process::{CommandOutput, PlatformCommand, ProcessOperations};
use dotstrap_errors::Error;

/// Context for platform operations, carrying metadata for log records
#[derive(Debug, Clone, Default)]
pub struct PlatformContext {
    operation_metadata: BTreeMap<String, String>,
}

impl PlatformContext {
    /// Create an empty context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context tagged with the step that issues the operations
    #[must_use]
    pub fn for_step(label: &str) -> Self {
        let mut ctx = Self::new();
        ctx.add_metadata("step".to_string(), label.to_string());
        ctx
    }

    /// Label of the step this context belongs to, if any
    #[must_use]
    pub fn step(&self) -> Option<&str> {
        self.operation_metadata.get("step").map(String::as_str)
    }

    /// Add custom metadata to the context
    pub fn add_metadata(&mut self, key: String, value: String) {
        self.operation_metadata.insert(key, value);
    }
}

/// Main platform abstraction providing access to all platform operations
pub struct Platform {
    process_ops: Box<dyn ProcessOperations>,
}

impl Platform {
    /// Create a new platform instance with the specified implementation
    #[must_use]
    pub fn new(process_ops: Box<dyn ProcessOperations>) -> Self {
        Self { process_ops }
    }

    /// Platform backed by the host operating system
    #[must_use]
    pub fn current() -> Self {
        crate::implementations::system::SystemPlatform::new()
    }

    /// Access process operations
    #[must_use]
    pub fn process(&self) -> &dyn ProcessOperations {
        &*self.process_ops
    }

    /// Convenience method: Execute a command and get output
    ///
    /// # Errors
    ///
    /// Returns an error if the command cannot be spawned.
    pub async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<CommandOutput, Error> {
        self.process().execute_command(ctx, cmd).await
    }

    /// Convenience method: Create a new command builder
    #[must_use]
    pub fn command(&self, program: &str) -> PlatformCommand {
        self.process().create_command(program)
    }

    /// Convenience method: Locate an executable on PATH
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::CommandNotFound` if the program is not on PATH.
    pub async fn which(&self, program: &str) -> Result<std::path::PathBuf, Error> {
        self.process().which(program).await
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
