//! Runner error types

use std::borrow::Cow;

use crate::{describe_status, UserFacingError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OpsError {
    #[error("expected 0 or 2 positional arguments (CONFIG WORKSPACE), got {given}")]
    Usage { given: usize },

    #[error("step `{step}` failed: {message}")]
    StepFailed {
        step: String,
        message: String,
        code: Option<i32>,
    },

    #[error("initializer `{program}` failed with {}", describe_status(.code))]
    DelegateFailed { program: String, code: Option<i32> },

    #[error("package installation failed for [{packages}]")]
    PackageInstallFailed { packages: String, code: Option<i32> },

    #[error("could not remove scoped directory {path}: {message}")]
    CleanupFailed { path: String, message: String },

    #[error("could not prepare scoped directory {path}: {message}")]
    ScopeSetupFailed { path: String, message: String },

    #[error("package manager command is empty")]
    EmptyPackageManager,

    #[error("component not found: {component}")]
    MissingComponent { component: String },

    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

impl OpsError {
    /// Exit status for this failure (see [`crate::Error::exit_code`]).
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::StepFailed {
                code: Some(code), ..
            }
            | Self::DelegateFailed {
                code: Some(code), ..
            }
            | Self::PackageInstallFailed {
                code: Some(code), ..
            } if *code != 0 => *code,
            _ => 1,
        }
    }
}

impl UserFacingError for OpsError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Usage { .. } => {
                Some("Pass both CONFIG and WORKSPACE, or neither to use the defaults.")
            }
            Self::PackageInstallFailed { .. } | Self::EmptyPackageManager => {
                Some("Check `packages.manager` in the settings file.")
            }
            Self::CleanupFailed { .. } => Some("Remove the directory manually."),
            _ => None,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::Usage { .. } => "ops.usage",
            Self::StepFailed { .. } => "ops.step_failed",
            Self::DelegateFailed { .. } => "ops.delegate_failed",
            Self::PackageInstallFailed { .. } => "ops.package_install",
            Self::CleanupFailed { .. } => "ops.cleanup",
            Self::ScopeSetupFailed { .. } => "ops.scope_setup",
            Self::EmptyPackageManager => "ops.empty_package_manager",
            Self::MissingComponent { .. } => "ops.missing_component",
            Self::SerializationError { .. } => "ops.serialization",
        })
    }
}
