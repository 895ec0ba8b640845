//! Command line interface definition

use clap::{Args, Parser, Subcommand};
use dotstrap_types::ColorChoice;
use std::path::PathBuf;

/// dotstrap - Declarative workstation bootstrap runner
#[derive(Parser)]
#[command(name = "dotstrap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Declarative workstation bootstrap runner")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Write debug logs to the user cache directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate runner settings file
    #[arg(long, global = true, value_name = "PATH", env = "DOTSTRAP_SETTINGS")]
    pub settings: Option<PathBuf>,
}

/// Positional arguments handed to the initializer
#[derive(Args, Clone)]
pub struct RunArgs {
    /// Also mirror dotfiles into the home directory
    #[arg(long)]
    pub dotfiles: bool,

    /// CONFIG and WORKSPACE for the initializer; omit both for the defaults
    #[arg(value_name = "ARG")]
    pub args: Vec<String>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Install dependencies and run the initializer in a scoped environment
    Run(RunArgs),

    /// Show the steps `run` would execute
    Plan(RunArgs),

    /// Install dependencies and mirror dotfiles without running the initializer
    Sync,
}

impl Commands {
    /// Get command name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Run(_) => "run",
            Commands::Plan(_) => "plan",
            Commands::Sync => "sync",
        }
    }
}
