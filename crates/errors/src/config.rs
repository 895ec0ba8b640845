//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("settings file not found: {path}")]
    NotFound { path: String },

    #[error("failed to read settings file {path}: {message}")]
    ReadFailed { path: String, message: String },

    #[error("parse error: {message}")]
    ParseError { message: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("home directory could not be determined")]
    HomeDirUnavailable,

    #[error("current directory could not be determined: {message}")]
    CurrentDirUnavailable { message: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Pass an existing file with --settings or omit it to use the defaults.")
            }
            Self::ReadFailed { .. } => Some("Check that the settings path is a readable file."),
            Self::ParseError { .. } | Self::InvalidValue { .. } => {
                Some("Fix the settings value and retry the command.")
            }
            Self::HomeDirUnavailable => Some("Set the HOME environment variable."),
            Self::CurrentDirUnavailable { .. } => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::NotFound { .. } => "config.not_found",
            Self::ReadFailed { .. } => "config.read",
            Self::ParseError { .. } => "config.parse",
            Self::InvalidValue { .. } => "config.invalid_value",
            Self::HomeDirUnavailable => "config.home_unavailable",
            Self::CurrentDirUnavailable { .. } => "config.cwd_unavailable",
        })
    }
}
