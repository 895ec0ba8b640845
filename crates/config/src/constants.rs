//! Literal defaults shared by the runner and the CLI

/// Config file handed to the initializer when no arguments are given
pub const DEFAULT_INIT_CONFIG: &str = "config.yaml";

/// Workspace handed to the initializer when no arguments are given
pub const DEFAULT_WORKSPACE: &str = "~/workspace";

pub const CACHE_DIR_VAR: &str = "UV_CACHE_DIR";
pub const CACHE_DIR_NAME: &str = ".uv_cache";

pub const RUNTIME_DIR_VAR: &str = "UV_PYTHON_INSTALL_DIR";
pub const RUNTIME_DIR_NAME: &str = ".uv_python";

pub const PLUGIN_MANAGER_URL: &str =
    "https://raw.githubusercontent.com/ohmyzsh/ohmyzsh/master/tools/install.sh";

/// Name of the settings file under the user config directory
pub const SETTINGS_FILE: &str = "config.toml";
pub const APP_DIR: &str = "dotstrap";
