//! Integration tests for dotstrap CLI

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Command isolated from the caller's settings and home directory
fn dotstrap(home: &Path, cwd: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dotstrap"));
    cmd.current_dir(cwd)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("XDG_CACHE_HOME", home.join(".cache"))
        .env_remove("RUST_LOG")
        .env_remove("DOTSTRAP_SETTINGS")
        .env_remove("DOTSTRAP_OUTPUT")
        .env_remove("DOTSTRAP_COLOR")
        .env_remove("DOTSTRAP_DOTFILES")
        .env_remove("DOTSTRAP_PACKAGE_MANAGER");
    cmd
}

/// Settings with no packages and a shell script standing in for the initializer
fn write_settings(dir: &Path, script: &str) -> std::path::PathBuf {
    let path = dir.join("settings.toml");
    let contents = format!(
        "[packages]\ninstall = []\nensure = []\n\n[delegate]\nprogram = \"sh\"\nargs = [\"-c\", {script:?}, \"init\"]\n"
    );
    std::fs::write(&path, contents).unwrap();
    path
}

fn run(cmd: &mut Command) -> Output {
    cmd.output().expect("Failed to execute dotstrap")
}

fn scoped_dirs_absent(cwd: &Path) -> bool {
    !cwd.join(".uv_cache").exists() && !cwd.join(".uv_python").exists()
}

struct Sandbox {
    home: TempDir,
    cwd: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: tempfile::tempdir().unwrap(),
            cwd: tempfile::tempdir().unwrap(),
        }
    }

    fn command(&self) -> Command {
        dotstrap(self.home.path(), self.cwd.path())
    }
}

#[test]
fn test_cli_version() {
    let sandbox = Sandbox::new();
    let output = run(sandbox.command().arg("--version"));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("dotstrap"));
}

#[test]
fn test_cli_help() {
    let sandbox = Sandbox::new();
    let output = run(sandbox.command().arg("--help"));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Declarative workstation bootstrap runner"));
    assert!(stdout.contains("run"));
    assert!(stdout.contains("plan"));
    assert!(stdout.contains("sync"));
}

#[test]
fn test_wrong_argument_counts_print_usage() {
    let sandbox = Sandbox::new();
    let settings = write_settings(sandbox.cwd.path(), "exit 0");

    for args in [vec!["one"], vec!["one", "two", "three"], vec!["a", "b", "c", "d"]] {
        let output = run(sandbox
            .command()
            .arg("--settings")
            .arg(&settings)
            .arg("run")
            .args(&args));

        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("usage: dotstrap run [CONFIG WORKSPACE]"));
        assert!(scoped_dirs_absent(sandbox.cwd.path()));
    }
}

#[test]
fn test_plan_json_uses_defaults() {
    let sandbox = Sandbox::new();
    let settings = write_settings(sandbox.cwd.path(), "exit 0");
    let output = run(sandbox
        .command()
        .arg("--json")
        .arg("--settings")
        .arg(&settings)
        .arg("plan"));

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["type"], "Plan");
    assert_eq!(value["data"]["config"], "config.yaml");
    assert_eq!(value["data"]["defaulted"], true);
    let workspace = value["data"]["workspace"].as_str().unwrap();
    assert_eq!(Path::new(workspace), sandbox.home.path().join("workspace"));
    assert!(scoped_dirs_absent(sandbox.cwd.path()));
}

#[test]
fn test_missing_settings_file_is_a_config_error() {
    let sandbox = Sandbox::new();
    let output = run(sandbox
        .command()
        .arg("--settings")
        .arg(sandbox.cwd.path().join("absent.toml"))
        .arg("plan"));

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Configuration error"));
}

#[cfg(unix)]
#[test]
fn test_run_passes_arguments_and_scoped_dirs() {
    let sandbox = Sandbox::new();
    let script = r#"test "$2" = my.yaml && test "$4" = ws && test -d "$UV_CACHE_DIR" && test -d "$UV_PYTHON_INSTALL_DIR""#;
    let settings = write_settings(sandbox.cwd.path(), script);

    let output = run(sandbox
        .command()
        .arg("--json")
        .arg("--settings")
        .arg(&settings)
        .args(["run", "my.yaml", "ws"]));

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["type"], "Run");
    assert_eq!(value["data"]["config"], "my.yaml");
    assert_eq!(value["data"]["workspace"], "ws");
    assert!(scoped_dirs_absent(sandbox.cwd.path()));
}

#[cfg(unix)]
#[test]
fn test_initializer_exit_code_propagates() {
    let sandbox = Sandbox::new();
    let settings = write_settings(sandbox.cwd.path(), "exit 7");

    let output = run(sandbox
        .command()
        .arg("--settings")
        .arg(&settings)
        .args(["run", "c.yaml", "ws"]));

    assert_eq!(output.status.code(), Some(7));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("initializer `sh` failed"));
    assert!(scoped_dirs_absent(sandbox.cwd.path()));
}

#[test]
fn test_clap_misuse_exits_with_one() {
    let sandbox = Sandbox::new();

    let bare = run(&mut sandbox.command());
    assert_eq!(bare.status.code(), Some(1));

    let unknown_flag = run(sandbox.command().args(["run", "--bogus"]));
    assert_eq!(unknown_flag.status.code(), Some(1));
    assert!(scoped_dirs_absent(sandbox.cwd.path()));
}

#[test]
fn test_plain_output_is_tab_separated() {
    let sandbox = Sandbox::new();
    let settings = write_settings(sandbox.cwd.path(), "exit 0");
    let output = run(sandbox
        .command()
        .env("DOTSTRAP_OUTPUT", "plain")
        .arg("--settings")
        .arg(&settings)
        .args(["plan", "c.yaml", "ws"]));

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|l| l == "config\tc.yaml"));
    assert!(stdout.lines().any(|l| l.starts_with("1\tPrepare scoped directories\t")));
}
