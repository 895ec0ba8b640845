//! Steps and the plan they form

use crate::delegate::DelegateInvocation;
use crate::dotfiles::{CompletionSpec, PluginInstall, SyncOptions};
use crate::invocation::InvocationArgs;
use crate::packages::describe_install;
use crate::scope::ScopeLayout;
use crate::OpsCtx;
use dotstrap_types::{PlanEntry, PlanReport};
use std::path::PathBuf;

pub const INSTALL_PACKAGES: &str = "Install packages";
pub const ENSURE_TOOLS: &str = "Ensure tools";
pub const SYNC_DOTFILES: &str = "Sync dotfiles";
pub const INSTALL_PLUGIN_MANAGER: &str = "Install plugin manager";
pub const GENERATE_COMPLETIONS: &str = "Generate completions";
pub const ACQUIRE_SCOPE: &str = "Prepare scoped directories";
pub const RUN_DELEGATE: &str = "Run initializer";
pub const RELEASE_SCOPE: &str = "Remove scoped directories";

/// What a step does
#[derive(Debug, Clone)]
pub enum StepKind {
    InstallPackages { packages: Vec<String> },
    EnsureTools { tools: Vec<String> },
    SyncDotfiles {
        source: PathBuf,
        target: PathBuf,
        options: SyncOptions,
    },
    InstallPluginManager(PluginInstall),
    GenerateCompletions(CompletionSpec),
    AcquireScope(ScopeLayout),
    Delegate(DelegateInvocation),
    ReleaseScope,
}

/// One unit of work in a run
#[derive(Debug, Clone)]
pub struct Step {
    pub label: &'static str,
    pub kind: StepKind,
    /// A failing fatal step aborts the run
    pub fatal: bool,
}

impl Step {
    fn required(label: &'static str, kind: StepKind) -> Self {
        Self {
            label,
            kind,
            fatal: true,
        }
    }

    /// Human readable action for plan output
    #[must_use]
    pub fn describe(&self, ctx: &OpsCtx) -> String {
        match &self.kind {
            StepKind::InstallPackages { packages } => {
                describe_install(&ctx.config.packages.manager, packages)
            }
            StepKind::EnsureTools { tools } => format!("install if missing: {}", tools.join(", ")),
            StepKind::SyncDotfiles { source, target, .. } => {
                format!("mirror {} -> {}", source.display(), target.display())
            }
            StepKind::InstallPluginManager(plugin) => plugin.display(),
            StepKind::GenerateCompletions(spec) => spec.display(),
            StepKind::AcquireScope(layout) => layout
                .dirs
                .iter()
                .map(|d| format!("{}={}", d.var, d.path.display()))
                .collect::<Vec<_>>()
                .join(" "),
            StepKind::Delegate(delegate) => delegate.display(),
            StepKind::ReleaseScope => "remove scoped directories".to_string(),
        }
    }
}

/// Result of a step that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed(Option<String>),
    Skipped(String),
}

/// Ordered steps for one invocation
#[derive(Debug, Clone)]
pub struct Plan {
    /// Absent when no initializer runs
    pub invocation: Option<InvocationArgs>,
    pub steps: Vec<Step>,
}

impl Plan {
    /// Build the plan.
    ///
    /// Order: packages, tools, dotfiles (when requested), then the scoped
    /// initializer run when `invocation` is given.
    #[must_use]
    pub fn build(ctx: &OpsCtx, invocation: Option<InvocationArgs>, include_dotfiles: bool) -> Self {
        let config = &ctx.config;
        let mut steps = Vec::new();

        if !config.packages.install.is_empty() {
            steps.push(Step::required(
                INSTALL_PACKAGES,
                StepKind::InstallPackages {
                    packages: config.packages.install.clone(),
                },
            ));
        }
        if !config.packages.ensure.is_empty() {
            steps.push(Step::required(
                ENSURE_TOOLS,
                StepKind::EnsureTools {
                    tools: config.packages.ensure.clone(),
                },
            ));
        }

        if include_dotfiles {
            let source = config.dotfiles.source.as_ref().map_or_else(
                || ctx.base_dir.clone(),
                |p| ctx.in_base_dir(&ctx.expand(&p.to_string_lossy())),
            );
            let target = config.dotfiles.target.as_ref().map_or_else(
                || ctx.home_dir.clone(),
                |p| ctx.in_base_dir(&ctx.expand(&p.to_string_lossy())),
            );
            // Scoped directories may be left over inside the source tree
            let mut exclude = config.dotfiles.exclude.clone();
            let layout = ScopeLayout::from_config(&config.scope, &ctx.base_dir);
            exclude.extend(layout.dirs.iter().filter_map(|d| {
                d.path
                    .strip_prefix(&source)
                    .ok()
                    .map(|rel| rel.to_string_lossy().into_owned())
            }));
            steps.push(Step::required(
                SYNC_DOTFILES,
                StepKind::SyncDotfiles {
                    source,
                    target,
                    options: SyncOptions {
                        exclude,
                        prune: config.dotfiles.prune,
                    },
                },
            ));
            if config.plugin_manager.enabled {
                steps.push(Step::required(
                    INSTALL_PLUGIN_MANAGER,
                    StepKind::InstallPluginManager(PluginInstall::from_config(
                        &config.plugin_manager,
                        ctx,
                    )),
                ));
            }
            if config.completions.enabled {
                steps.push(Step::required(
                    GENERATE_COMPLETIONS,
                    StepKind::GenerateCompletions(CompletionSpec::from_config(
                        &config.completions,
                        ctx,
                    )),
                ));
            }
        }

        if let Some(args) = &invocation {
            steps.push(Step::required(
                ACQUIRE_SCOPE,
                StepKind::AcquireScope(ScopeLayout::from_config(&config.scope, &ctx.base_dir)),
            ));
            steps.push(Step::required(
                RUN_DELEGATE,
                StepKind::Delegate(DelegateInvocation::new(
                    &config.delegate,
                    args,
                    ctx.base_dir.clone(),
                )),
            ));
            steps.push(Step::required(RELEASE_SCOPE, StepKind::ReleaseScope));
        }

        Self { invocation, steps }
    }

    /// Serializable view of the plan
    #[must_use]
    pub fn report(&self, ctx: &OpsCtx) -> PlanReport {
        PlanReport {
            config: self.invocation.as_ref().map(|i| i.config.clone()),
            workspace: self.invocation.as_ref().map(|i| i.workspace.clone()),
            defaulted: self.invocation.as_ref().is_some_and(|i| i.defaulted),
            steps: self
                .steps
                .iter()
                .enumerate()
                .map(|(index, step)| PlanEntry {
                    index: index + 1,
                    label: step.label.to_string(),
                    fatal: step.fatal,
                    action: step.describe(ctx),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn labels(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.label).collect()
    }
}
