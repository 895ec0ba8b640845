//! High-level operations invoked by the CLI

use crate::invocation::InvocationArgs;
use crate::runner;
use crate::step::Plan;
use crate::OpsCtx;
use dotstrap_errors::Error;
use dotstrap_types::{PlanReport, RunReport};
use tracing::info;

/// Resolve the plan for `run` without executing anything.
///
/// # Errors
///
/// Returns `OpsError::Usage` for an invalid positional argument count.
pub fn resolve_plan(ctx: &OpsCtx, positional: &[String], dotfiles: bool) -> Result<Plan, Error> {
    let invocation = InvocationArgs::resolve(positional, &ctx.config.delegate, &ctx.home_dir)?;
    let include_dotfiles = dotfiles || ctx.config.dotfiles.enabled;
    let invocation = ctx.config.delegate.enabled.then_some(invocation);
    Ok(Plan::build(ctx, invocation, include_dotfiles))
}

/// Show what `run` would do
///
/// # Errors
///
/// Returns `OpsError::Usage` for an invalid positional argument count.
pub fn plan(ctx: &OpsCtx, positional: &[String], dotfiles: bool) -> Result<PlanReport, Error> {
    Ok(resolve_plan(ctx, positional, dotfiles)?.report(ctx))
}

/// Full bootstrap: packages, optional dotfiles, then the scoped initializer.
///
/// The argument count is validated before any step runs.
///
/// # Errors
///
/// Returns a usage error, or the error of the first failing step.
pub async fn bootstrap(
    ctx: &OpsCtx,
    positional: &[String],
    dotfiles: bool,
) -> Result<RunReport, Error> {
    let plan = resolve_plan(ctx, positional, dotfiles)?;
    info!(steps = plan.steps.len(), "Starting bootstrap");
    runner::execute(ctx, &plan).await
}

/// Dotfile-only run: packages and dotfiles, no initializer
///
/// # Errors
///
/// Returns the error of the first failing step.
pub async fn sync(ctx: &OpsCtx) -> Result<RunReport, Error> {
    let plan = Plan::build(ctx, None, true);
    info!(steps = plan.steps.len(), "Starting dotfile sync");
    runner::execute(ctx, &plan).await
}
