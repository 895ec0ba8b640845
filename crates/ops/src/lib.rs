#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Bootstrap orchestration for dotstrap
//!
//! Builds an ordered [`Plan`] from the runner settings and executes it
//! step by step, stopping at the first fatal failure. Scoped directories
//! handed to the initializer are owned by a guard and removed on every
//! exit path.

mod commands;
mod context;
pub mod delegate;
pub mod dotfiles;
pub mod invocation;
pub mod packages;
pub mod runner;
pub mod scope;
pub mod step;

pub use commands::{bootstrap, plan, resolve_plan, sync};
pub use context::{OpsContextBuilder, OpsCtx};
pub use invocation::InvocationArgs;
pub use scope::{ScopeLayout, ScopedDir, ScopedDirs};
pub use step::{Plan, Step, StepKind, StepOutcome};

use dotstrap_errors::Error;
use dotstrap_types::{PlanReport, RunReport};

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Resolved plan, nothing executed
    Plan(PlanReport),
    /// Completed run
    Run(RunReport),
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            dotstrap_errors::OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// Check if this is a success result
    #[must_use]
    pub fn is_success(&self) -> bool {
        match self {
            Self::Plan(_) => true,
            Self::Run(report) => report.is_success(),
        }
    }
}
