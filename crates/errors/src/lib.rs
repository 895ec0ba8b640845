#![warn(mismatched_lifetime_syntaxes)]
#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for dotstrap
//!
//! Errors are organized by domain. Every domain error is `Clone` so that
//! reports and renderers can hold on to them.

use std::borrow::Cow;

use thiserror::Error;

pub mod config;
pub mod ops;
pub mod platform;
pub mod sync;

pub use config::ConfigError;
pub use ops::OpsError;
pub use platform::PlatformError;
pub use sync::SyncError;

/// Generic error type for cross-crate boundaries
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("{0}")]
    Ops(#[from] OpsError),

    #[error("dotfile sync error: {0}")]
    Sync(#[from] SyncError),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("I/O error: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
        path: Option<std::path::PathBuf>,
    },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Process exit status this error should terminate the runner with.
    ///
    /// Failed commands propagate their own exit code; everything else,
    /// including commands killed by a signal, maps to 1.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Ops(err) => err.exit_code(),
            _ => 1,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
            path: None,
        }
    }
}

#[allow(clippy::ref_option)]
pub(crate) fn describe_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit status {code}"),
        None => "no exit status".to_string(),
    }
}

/// Result type alias for dotstrap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Minimal interface for rendering user-facing error information without
/// requiring heavyweight envelopes.
pub trait UserFacingError {
    /// Short message suitable for CLI output.
    fn user_message(&self) -> Cow<'_, str>;

    /// Optional remediation hint.
    fn user_hint(&self) -> Option<&'static str> {
        None
    }

    /// Stable error code for structured reporting.
    fn user_code(&self) -> Option<&'static str> {
        None
    }
}

impl UserFacingError for Error {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Error::Config(err) => err.user_message(),
            Error::Ops(err) => err.user_message(),
            Error::Io { message, .. } => Cow::Owned(message.clone()),
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_hint(),
            Error::Ops(err) => err.user_hint(),
            Error::Platform(err) => err.user_hint(),
            Error::Sync(_) => Some("Check permissions on the dotfile source and your home directory."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        match self {
            Error::Config(err) => err.user_code(),
            Error::Ops(err) => err.user_code(),
            Error::Platform(err) => err.user_code(),
            Error::Sync(err) => err.user_code(),
            Error::Internal(_) => Some("error.internal"),
            Error::Io { .. } => Some("error.io"),
        }
    }
}
