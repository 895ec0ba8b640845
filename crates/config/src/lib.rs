#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Runner settings for dotstrap
//!
//! Settings are merged from, in increasing precedence:
//! - Default values (hard-coded)
//! - Settings file (`~/.config/dotstrap/config.toml` or `--settings`)
//! - Environment variables
//! - CLI flags (applied by the binary)

pub mod constants;

use dotstrap_errors::{ConfigError, Error};
use dotstrap_types::{ColorChoice, OutputFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main settings structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub packages: PackagesConfig,

    #[serde(default)]
    pub scope: ScopeConfig,

    #[serde(default)]
    pub delegate: DelegateConfig,

    #[serde(default)]
    pub dotfiles: DotfilesConfig,

    #[serde(default)]
    pub plugin_manager: PluginManagerConfig,

    #[serde(default)]
    pub completions: CompletionsConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub default_output: OutputFormat,
    #[serde(default)]
    pub color: ColorChoice,
}

/// OS packages installed before anything else
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagesConfig {
    /// Package manager command; package names are appended
    #[serde(default = "default_package_manager")]
    pub manager: Vec<String>,
    /// Installed unconditionally
    #[serde(default = "default_install")]
    pub install: Vec<String>,
    /// Installed only when not found on PATH
    #[serde(default = "default_ensure")]
    pub ensure: Vec<String>,
}

/// Directories that exist only while the initializer runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeConfig {
    #[serde(default = "default_cache_var")]
    pub cache_var: String,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_runtime_var")]
    pub runtime_var: String,
    #[serde(default = "default_runtime_dir")]
    pub runtime_dir: PathBuf,
}

/// External initializer invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegateConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_delegate_program")]
    pub program: String,
    /// Arguments placed before `--config` / `--workspace`
    #[serde(default = "default_delegate_args")]
    pub args: Vec<String>,
    #[serde(default = "default_init_config")]
    pub default_config: String,
    #[serde(default = "default_workspace")]
    pub default_workspace: String,
}

/// Dotfile mirroring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DotfilesConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Defaults to the current directory
    pub source: Option<PathBuf>,
    /// Defaults to the home directory
    pub target: Option<PathBuf>,
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    /// Remove entries in tracked subdirectories that the source no longer has
    #[serde(default)]
    pub prune: bool,
}

/// Shell plugin manager installed with the dotfiles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManagerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_plugin_manager_url")]
    pub url: String,
    #[serde(default = "default_plugin_manager_args")]
    pub args: Vec<String>,
    /// Install is skipped when this directory already exists
    #[serde(default = "default_plugin_manager_dir")]
    pub dir: Option<String>,
    /// Extra installer environment; `KEEP_ZSHRC` preserves a synced `~/.zshrc`
    #[serde(default = "default_plugin_manager_env")]
    pub env: BTreeMap<String, String>,
}

/// Shell completion generation for one tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_completions_tool")]
    pub tool: String,
    #[serde(default = "default_completions_shell")]
    pub shell: String,
    #[serde(default = "default_completions_output")]
    pub output: String,
}

impl Default for PackagesConfig {
    fn default() -> Self {
        Self {
            manager: default_package_manager(),
            install: default_install(),
            ensure: default_ensure(),
        }
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            cache_var: default_cache_var(),
            cache_dir: default_cache_dir(),
            runtime_var: default_runtime_var(),
            runtime_dir: default_runtime_dir(),
        }
    }
}

impl Default for DelegateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: default_delegate_program(),
            args: default_delegate_args(),
            default_config: default_init_config(),
            default_workspace: default_workspace(),
        }
    }
}

impl Default for DotfilesConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            source: None,
            target: None,
            exclude: default_exclude(),
            prune: false,
        }
    }
}

impl Default for PluginManagerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_plugin_manager_url(),
            args: default_plugin_manager_args(),
            dir: default_plugin_manager_dir(),
            env: default_plugin_manager_env(),
        }
    }
}

impl Default for CompletionsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tool: default_completions_tool(),
            shell: default_completions_shell(),
            output: default_completions_output(),
        }
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_package_manager() -> Vec<String> {
    ["sudo", "apt-get", "install", "-y"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_install() -> Vec<String> {
    vec!["curl".to_string(), "zsh".to_string(), "git".to_string()]
}

fn default_ensure() -> Vec<String> {
    vec!["just".to_string()]
}

fn default_cache_var() -> String {
    constants::CACHE_DIR_VAR.to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from(constants::CACHE_DIR_NAME)
}

fn default_runtime_var() -> String {
    constants::RUNTIME_DIR_VAR.to_string()
}

fn default_runtime_dir() -> PathBuf {
    PathBuf::from(constants::RUNTIME_DIR_NAME)
}

fn default_delegate_program() -> String {
    "uv".to_string()
}

fn default_delegate_args() -> Vec<String> {
    vec!["run".to_string(), "src/init.py".to_string()]
}

fn default_init_config() -> String {
    constants::DEFAULT_INIT_CONFIG.to_string()
}

fn default_workspace() -> String {
    constants::DEFAULT_WORKSPACE.to_string()
}

fn default_exclude() -> Vec<String> {
    [".git", ".DS_Store", "bootstrap.sh", "LICENSE", "README.md"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_plugin_manager_url() -> String {
    constants::PLUGIN_MANAGER_URL.to_string()
}

fn default_plugin_manager_args() -> Vec<String> {
    vec!["--unattended".to_string()]
}

#[allow(clippy::unnecessary_wraps)]
fn default_plugin_manager_dir() -> Option<String> {
    Some("~/.oh-my-zsh".to_string())
}

fn default_plugin_manager_env() -> BTreeMap<String, String> {
    BTreeMap::from([("KEEP_ZSHRC".to_string(), "yes".to_string())])
}

fn default_completions_tool() -> String {
    "just".to_string()
}

fn default_completions_shell() -> String {
    "zsh".to_string()
}

fn default_completions_output() -> String {
    "~/.oh-my-zsh/custom/just.zsh".to_string()
}

impl Config {
    /// Get the default settings file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir
            .join(constants::APP_DIR)
            .join(constants::SETTINGS_FILE))
    }

    /// Load settings from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::ReadFailed {
                    path: path.display().to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        let config = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "Loaded settings file");
        Ok(config)
    }

    /// Load settings with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file exists but cannot be read or parsed.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from an explicit path, or the default location
    ///
    /// An explicit path must exist; the default location is optional.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file cannot be read or parsed.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(settings_path) => Self::load_from_file(settings_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable holds a value that cannot
    /// be parsed into the expected type.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // DOTSTRAP_OUTPUT
        if let Ok(output) = std::env::var("DOTSTRAP_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "DOTSTRAP_OUTPUT".to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        // DOTSTRAP_COLOR
        if let Ok(color) = std::env::var("DOTSTRAP_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "DOTSTRAP_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // DOTSTRAP_DOTFILES
        if let Ok(dotfiles) = std::env::var("DOTSTRAP_DOTFILES") {
            self.dotfiles.enabled = match dotfiles.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "DOTSTRAP_DOTFILES".to_string(),
                        value: dotfiles,
                    }
                    .into())
                }
            };
        }

        // DOTSTRAP_PACKAGE_MANAGER, whitespace separated
        if let Ok(manager) = std::env::var("DOTSTRAP_PACKAGE_MANAGER") {
            let words: Vec<String> = manager.split_whitespace().map(String::from).collect();
            if words.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "DOTSTRAP_PACKAGE_MANAGER".to_string(),
                    value: manager,
                }
                .into());
            }
            self.packages.manager = words;
        }

        Ok(())
    }
}

/// Expand a leading `~` against `home`.
///
/// Only `~` and `~/...` are expanded; `~user` forms are returned unchanged.
#[must_use]
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        home.to_path_buf()
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(raw)
    }
}

/// Resolve the current user's home directory
///
/// # Errors
///
/// Returns an error if no home directory can be determined.
pub fn home_dir() -> Result<PathBuf, Error> {
    dirs::home_dir().ok_or_else(|| ConfigError::HomeDirUnavailable.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_home() {
        let home = Path::new("/home/me");
        assert_eq!(expand_home("~", home), PathBuf::from("/home/me"));
        assert_eq!(
            expand_home("~/workspace", home),
            PathBuf::from("/home/me/workspace")
        );
        assert_eq!(expand_home("/srv/ws", home), PathBuf::from("/srv/ws"));
        assert_eq!(expand_home("~other/x", home), PathBuf::from("~other/x"));
    }

    #[test]
    fn test_defaults_match_bootstrap_conventions() {
        let config = Config::default();
        assert_eq!(config.packages.install, vec!["curl", "zsh", "git"]);
        assert_eq!(config.packages.ensure, vec!["just"]);
        assert_eq!(config.scope.cache_var, "UV_CACHE_DIR");
        assert_eq!(config.scope.runtime_var, "UV_PYTHON_INSTALL_DIR");
        assert_eq!(config.delegate.default_config, "config.yaml");
        assert_eq!(config.delegate.default_workspace, "~/workspace");
        assert!(config.delegate.enabled);
        assert!(!config.dotfiles.enabled);
        assert!(config.dotfiles.exclude.iter().any(|e| e == ".git"));
        assert_eq!(
            config.plugin_manager.env.get("KEEP_ZSHRC").map(String::as_str),
            Some("yes")
        );
    }
}
