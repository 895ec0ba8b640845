//! dotstrap - Declarative workstation bootstrap runner
//!
//! Installs OS packages, optionally mirrors dotfiles, then runs the
//! project initializer with scoped cache directories that are removed
//! again when it exits.

mod cli;
mod display;
mod error;
mod logging;

use crate::cli::{Cli, Commands};
use crate::display::OutputRenderer;
use crate::error::{CliError, USAGE};
use clap::Parser;
use dotstrap_config::Config;
use dotstrap_ops::{OperationResult, OpsContextBuilder};
use dotstrap_platform::Platform;
use dotstrap_types::OutputFormat;
use std::process;
use tracing::{error, info};

fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; misuse exits 1
            let code = i32::from(e.use_stderr());
            if let Err(print_err) = e.print() {
                eprintln!("Error: {print_err}");
            }
            process::exit(code);
        }
    };
    logging::init_tracing(cli.global.json, cli.global.debug);

    let code = match execute(cli) {
        Ok(()) => 0,
        Err(e) => {
            error!(error = %e, "Command failed");
            if matches!(e, CliError::Usage(_)) {
                eprintln!("{USAGE}");
            }
            eprintln!("Error: {e}");
            e.exit_code()
        }
    };

    // Every guard has been dropped with the runtime by now
    process::exit(code);
}

/// Run on a single-threaded runtime; steps are strictly sequential
fn execute(cli: Cli) -> Result<(), CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;
    runtime.block_on(run(cli))
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!(command = cli.command.name(), "Starting dotstrap v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.settings.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global);

    let renderer = OutputRenderer::new(config.general.default_output, config.general.color);

    let ctx = OpsContextBuilder::new()
        .with_platform(Platform::current())
        .with_config(config)
        .build()?;

    let result = match cli.command {
        Commands::Run(args) => {
            OperationResult::Run(dotstrap_ops::bootstrap(&ctx, &args.args, args.dotfiles).await?)
        }
        Commands::Plan(args) => {
            OperationResult::Plan(dotstrap_ops::plan(&ctx, &args.args, args.dotfiles)?)
        }
        Commands::Sync => OperationResult::Run(dotstrap_ops::sync(&ctx).await?),
    };

    renderer.render_result(&result)?;
    info!("Command completed successfully");
    Ok(())
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs) {
    if let Some(color) = global.color {
        config.general.color = color;
    }
    if global.json {
        config.general.default_output = OutputFormat::Json;
    }
}
