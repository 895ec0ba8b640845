//! Dotfile provisioning: tree mirroring, shell plugin manager and completions

pub mod completions;
pub mod plugin;
pub mod sync;

pub use completions::CompletionSpec;
pub use plugin::PluginInstall;
pub use sync::{sync_tree, SyncOptions};
