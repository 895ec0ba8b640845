//! Platform abstraction layer for dotstrap.
//!
//! This crate provides a unified interface for the side effects the runner
//! performs:
//! - Process execution (package managers, installers, the initializer)
//! - Filesystem helpers for scoped directories and generated files
//!
//! Runner code only talks to [`ProcessOperations`], so tests can swap in a
//! recording implementation.

pub mod core;
pub mod fs;
pub mod implementations;
pub mod process;

pub use core::{Platform, PlatformContext};
pub use implementations::system::SystemPlatform;

/// Re-export commonly used types
pub use process::{CommandOutput, PlatformCommand, ProcessOperations, StdioMode};
