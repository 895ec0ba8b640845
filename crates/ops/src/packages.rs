//! OS package installation through the configured package manager

use crate::OpsCtx;
use dotstrap_errors::{Error, OpsError};
use dotstrap_platform::PlatformContext;
use tracing::{debug, info};

/// Render the package-manager command line for `packages`
#[must_use]
pub fn describe_install(manager: &[String], packages: &[String]) -> String {
    manager
        .iter()
        .chain(packages)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Install `packages` in one package-manager invocation.
///
/// # Errors
///
/// Returns `OpsError::EmptyPackageManager` if no manager command is set,
/// `OpsError::PackageInstallFailed` if it exits non-zero, or a platform
/// error if it cannot be spawned.
pub async fn install(ctx: &OpsCtx, step: &str, packages: &[String]) -> Result<(), Error> {
    let (program, manager_args) = ctx
        .config
        .packages
        .manager
        .split_first()
        .ok_or(OpsError::EmptyPackageManager)?;

    let mut cmd = ctx.platform.command(program);
    cmd.args(manager_args).args(packages).inherit_stdio();

    info!(packages = %packages.join(" "), "Installing packages");
    let output = ctx
        .platform
        .execute_command(&PlatformContext::for_step(step), cmd)
        .await?;

    if output.success() {
        Ok(())
    } else {
        Err(OpsError::PackageInstallFailed {
            packages: packages.join(", "),
            code: output.code,
        }
        .into())
    }
}

/// Tools from `tools` that are not on PATH
pub async fn missing_tools(ctx: &OpsCtx, tools: &[String]) -> Vec<String> {
    let mut missing = Vec::new();
    for tool in tools {
        match ctx.platform.which(tool).await {
            Ok(path) => debug!(tool = %tool, path = %path.display(), "Tool present"),
            Err(_) => missing.push(tool.clone()),
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_install() {
        let manager = vec!["sudo".to_string(), "apt-get".into(), "install".into(), "-y".into()];
        let packages = vec!["curl".to_string(), "zsh".into()];
        assert_eq!(
            describe_install(&manager, &packages),
            "sudo apt-get install -y curl zsh"
        );
    }
}
