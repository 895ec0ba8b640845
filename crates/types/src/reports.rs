//! Report type definitions for plans and runs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of a single step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    /// The step ran and did its work
    Completed,
    /// The step had nothing to do
    Skipped,
    /// The step failed but was not fatal
    Failed,
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Per-step entry in a run report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepReport {
    pub label: String,
    pub status: StepStatus,
    /// Free-form detail, e.g. which packages were installed
    pub detail: Option<String>,
    pub duration_ms: u64,
}

/// Result of a complete run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// Initializer arguments; absent for dotfile-only runs
    pub config: Option<String>,
    pub workspace: Option<String>,
    pub steps: Vec<StepReport>,
    pub duration_ms: u64,
}

impl RunReport {
    /// True when no step reported a failure
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.steps.iter().all(|s| s.status != StepStatus::Failed)
    }
}

/// One step of a plan, as shown by `dotstrap plan`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanEntry {
    pub index: usize,
    pub label: String,
    pub fatal: bool,
    /// Human readable description of what the step runs
    pub action: String,
}

/// Resolved plan for one invocation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanReport {
    pub config: Option<String>,
    pub workspace: Option<String>,
    /// True when the defaults were substituted for missing arguments
    pub defaulted: bool,
    pub steps: Vec<PlanEntry>,
}

/// Counters gathered while mirroring dotfiles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub files_copied: usize,
    pub files_unchanged: usize,
    pub symlinks_written: usize,
    pub dirs_created: usize,
    pub pruned: usize,
}

impl std::fmt::Display for SyncSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} copied, {} unchanged, {} symlinks, {} dirs created, {} pruned",
            self.files_copied,
            self.files_unchanged,
            self.symlinks_written,
            self.dirs_created,
            self.pruned
        )
    }
}
