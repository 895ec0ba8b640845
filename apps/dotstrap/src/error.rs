//! CLI error handling

use std::fmt;

use dotstrap_errors::{OpsError, UserFacingError};

/// Usage line printed for a wrong argument count
pub const USAGE: &str = "usage: dotstrap run [CONFIG WORKSPACE]";

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Wrong number of positional arguments
    Usage(dotstrap_errors::Error),
    /// Configuration error
    Config(dotstrap_errors::Error),
    /// Operations error
    Ops(dotstrap_errors::Error),
    /// Runtime could not be started
    Runtime(String),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Ops(e) => e.exit_code(),
            CliError::Usage(_) | CliError::Config(_) | CliError::Runtime(_) | CliError::Io(_) => 1,
        }
    }
}

fn write_user_facing(f: &mut fmt::Formatter<'_>, e: &dotstrap_errors::Error) -> fmt::Result {
    write!(f, "{}", e.user_message())?;
    if let Some(code) = e.user_code() {
        write!(f, "\n  Code: {code}")?;
    }
    if let Some(hint) = e.user_hint() {
        write!(f, "\n  Hint: {hint}")?;
    }
    Ok(())
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => {
                write!(f, "Configuration error: ")?;
                write_user_facing(f, e)
            }
            CliError::Usage(e) | CliError::Ops(e) => write_user_facing(f, e),
            CliError::Runtime(msg) => write!(f, "Failed to start runtime: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Usage(e) | CliError::Config(e) | CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
            CliError::Runtime(_) => None,
        }
    }
}

impl From<dotstrap_errors::Error> for CliError {
    fn from(e: dotstrap_errors::Error) -> Self {
        match e {
            dotstrap_errors::Error::Ops(OpsError::Usage { .. }) => CliError::Usage(e),
            dotstrap_errors::Error::Config(_) => CliError::Config(e),
            other => CliError::Ops(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
