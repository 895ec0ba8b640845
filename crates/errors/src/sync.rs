//! Dotfile sync error types

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SyncError {
    #[error("source directory not found: {path}")]
    SourceNotFound { path: String },

    #[error("failed to walk {path}: {message}")]
    WalkFailed { path: String, message: String },

    #[error("failed to {operation} {path}: {message}")]
    Io {
        operation: &'static str,
        path: String,
        message: String,
    },
}

impl SyncError {
    pub(crate) fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::SourceNotFound { .. } => "sync.source_not_found",
            Self::WalkFailed { .. } => "sync.walk",
            Self::Io { .. } => "sync.io",
        })
    }
}
