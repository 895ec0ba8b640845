//! Process and filesystem errors raised by the platform layer

use thiserror::Error;

/// Errors that can occur during platform operations
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("process execution failed: {command} - {message}")]
    ProcessExecutionFailed { command: String, message: String },

    #[error("command not found: {command}")]
    CommandNotFound { command: String },

    #[error("filesystem operation failed: {operation} on {path} - {message}")]
    FilesystemOperationFailed {
        operation: String,
        path: String,
        message: String,
    },
}

impl PlatformError {
    pub(crate) fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::CommandNotFound { .. } => Some("Install the missing program or fix PATH."),
            Self::FilesystemOperationFailed { .. } => {
                Some("Check that the path is writable by the current user.")
            }
            _ => None,
        }
    }

    pub(crate) fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::ProcessExecutionFailed { .. } => "platform.spawn",
            Self::CommandNotFound { .. } => "platform.command_not_found",
            Self::FilesystemOperationFailed { .. } => "platform.filesystem",
        })
    }
}
