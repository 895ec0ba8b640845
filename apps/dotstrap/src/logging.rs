//! Tracing subscriber setup
//!
//! Normal runs log warnings to stderr. `--debug` (or `RUST_LOG`) writes JSON
//! records to a timestamped file under the user cache directory. JSON output
//! mode keeps stderr free of log lines.

use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const DEBUG_FILTER: &str = "info,dotstrap=debug,dotstrap_ops=debug,dotstrap_platform=debug";
const NORMAL_FILTER: &str = "warn,dotstrap=info,dotstrap_ops=info";

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Directory holding debug log files
pub fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("dotstrap")
        .join("logs")
}

fn create_log_file() -> std::io::Result<(PathBuf, File)> {
    let dir = log_dir();
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(format!(
        "dotstrap-{}.log",
        chrono::Utc::now().format("%Y%m%d-%H%M%S")
    ));
    let file = File::create(&path)?;
    Ok((path, file))
}

/// Initialize tracing/logging
pub fn init_tracing(json_mode: bool, debug_flag: bool) {
    let debug_enabled = std::env::var("RUST_LOG").is_ok() || debug_flag;

    if debug_enabled {
        match create_log_file() {
            Ok((path, file)) => {
                tracing_subscriber::fmt()
                    .json()
                    .with_writer(file)
                    .with_env_filter(filter_or(DEBUG_FILTER))
                    .init();
                if !json_mode {
                    eprintln!("Debug logging enabled: {}", path.display());
                }
                return;
            }
            Err(e) if !json_mode => {
                eprintln!("Warning: Failed to create log file: {e}");
            }
            Err(_) => {}
        }
    }

    if json_mode {
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_env_filter(filter_or(NORMAL_FILTER))
            .init();
    }
}
