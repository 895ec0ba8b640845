//! Sequential, fail-fast plan execution

use crate::dotfiles::sync_tree;
use crate::packages;
use crate::scope::ScopedDirs;
use crate::step::{Plan, Step, StepKind, StepOutcome};
use crate::OpsCtx;
use dotstrap_errors::Error;
use dotstrap_types::{RunReport, StepReport, StepStatus};
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Execute every step of `plan` in order.
///
/// The first failing fatal step aborts the run and its error is returned.
/// Scoped directories acquired earlier are removed before this returns,
/// whichever way it returns.
///
/// # Errors
///
/// Returns the error of the first fatal step that failed.
pub async fn execute(ctx: &OpsCtx, plan: &Plan) -> Result<RunReport, Error> {
    let run_id = Uuid::new_v4();
    let span = info_span!("run", %run_id);
    run_steps(ctx, plan, run_id).instrument(span).await
}

async fn run_steps(ctx: &OpsCtx, plan: &Plan, run_id: Uuid) -> Result<RunReport, Error> {
    let started = Instant::now();
    // Dropped on every early return, removing the directories
    let mut scope: Option<ScopedDirs> = None;
    let mut reports = Vec::with_capacity(plan.steps.len());

    for step in &plan.steps {
        let step_started = Instant::now();
        info!(step = step.label, "Starting step");

        let result = run_step(ctx, step, &mut scope).await;
        let duration_ms = elapsed_ms(step_started);

        let (status, detail) = match result {
            Ok(StepOutcome::Completed(detail)) => (StepStatus::Completed, detail),
            Ok(StepOutcome::Skipped(reason)) => {
                info!(step = step.label, %reason, "Step skipped");
                (StepStatus::Skipped, Some(reason))
            }
            Err(e) if step.fatal => {
                warn!(step = step.label, error = %e, "Step failed, aborting run");
                return Err(e);
            }
            Err(e) => {
                warn!(step = step.label, error = %e, "Non-fatal step failed");
                (StepStatus::Failed, Some(e.to_string()))
            }
        };

        reports.push(StepReport {
            label: step.label.to_string(),
            status,
            detail,
            duration_ms,
        });
    }

    // A plan without an explicit release step still cleans up
    if let Some(guard) = scope.take() {
        guard.release()?;
    }

    let duration_ms = elapsed_ms(started);
    info!(duration_ms, "Run finished");
    Ok(RunReport {
        run_id,
        config: plan.invocation.as_ref().map(|i| i.config.clone()),
        workspace: plan.invocation.as_ref().map(|i| i.workspace.clone()),
        steps: reports,
        duration_ms,
    })
}

async fn run_step(
    ctx: &OpsCtx,
    step: &Step,
    scope: &mut Option<ScopedDirs>,
) -> Result<StepOutcome, Error> {
    match &step.kind {
        StepKind::InstallPackages { packages } => {
            packages::install(ctx, step.label, packages).await?;
            Ok(StepOutcome::Completed(Some(packages.join(", "))))
        }
        StepKind::EnsureTools { tools } => {
            let missing = packages::missing_tools(ctx, tools).await;
            if missing.is_empty() {
                return Ok(StepOutcome::Skipped("all tools present".to_string()));
            }
            packages::install(ctx, step.label, &missing).await?;
            Ok(StepOutcome::Completed(Some(missing.join(", "))))
        }
        StepKind::SyncDotfiles {
            source,
            target,
            options,
        } => {
            let summary = sync_tree(source, target, options)?;
            Ok(StepOutcome::Completed(Some(summary.to_string())))
        }
        StepKind::InstallPluginManager(plugin) => plugin.run(ctx, step.label).await,
        StepKind::GenerateCompletions(spec) => spec.run(ctx, step.label).await,
        StepKind::AcquireScope(layout) => {
            // Replacing an existing guard drops it, removing its directories
            *scope = Some(ScopedDirs::acquire(layout)?);
            Ok(StepOutcome::Completed(None))
        }
        StepKind::Delegate(delegate) => {
            delegate.run(ctx, step.label, scope.as_ref()).await?;
            Ok(StepOutcome::Completed(None))
        }
        StepKind::ReleaseScope => match scope.take() {
            Some(guard) => {
                guard.release()?;
                Ok(StepOutcome::Completed(None))
            }
            None => Ok(StepOutcome::Skipped("nothing to remove".to_string())),
        },
    }
}
