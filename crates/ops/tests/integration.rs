//! Integration tests for ops crate

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use dotstrap_config::Config;
    use dotstrap_errors::{Error, OpsError, PlatformError};
    use dotstrap_ops::dotfiles::{sync_tree, SyncOptions};
    use dotstrap_ops::step::{self as steps, Plan, Step, StepKind};
    use dotstrap_ops::*;
    use dotstrap_platform::{
        CommandOutput, Platform, PlatformCommand, PlatformContext, ProcessOperations,
    };
    use dotstrap_types::StepStatus;
    use proptest::prelude::*;
    use std::collections::{HashMap, HashSet};
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use tempfile::{tempdir, TempDir};

    #[derive(Debug, Clone)]
    struct Recorded {
        cmd: PlatformCommand,
        /// Whether every directory passed through the environment existed
        env_dirs_existed: bool,
    }

    /// Scripted process backend; nothing is ever spawned
    #[derive(Default)]
    struct MockProcess {
        exit_codes: HashMap<String, Option<i32>>,
        stdout: HashMap<String, Vec<u8>>,
        present: HashSet<String>,
        log: Arc<Mutex<Vec<Recorded>>>,
    }

    #[async_trait]
    impl ProcessOperations for MockProcess {
        async fn execute_command(
            &self,
            _ctx: &PlatformContext,
            cmd: PlatformCommand,
        ) -> Result<CommandOutput, Error> {
            let env_dirs_existed = cmd
                .get_env_vars()
                .values()
                .all(|p| Path::new(p).is_dir());
            let code = self
                .exit_codes
                .get(cmd.program())
                .copied()
                .unwrap_or(Some(0));
            let stdout = self.stdout.get(cmd.program()).cloned().unwrap_or_default();
            self.log.lock().unwrap().push(Recorded {
                cmd,
                env_dirs_existed,
            });
            Ok(CommandOutput {
                code,
                stdout,
                stderr: Vec::new(),
            })
        }

        async fn which(&self, program: &str) -> Result<PathBuf, Error> {
            if self.present.contains(program) {
                Ok(PathBuf::from("/usr/bin").join(program))
            } else {
                Err(PlatformError::CommandNotFound {
                    command: program.to_string(),
                }
                .into())
            }
        }
    }

    struct Harness {
        ctx: OpsCtx,
        log: Arc<Mutex<Vec<Recorded>>>,
        base: TempDir,
        home: TempDir,
    }

    impl Harness {
        fn new(mock: MockProcess, configure: impl FnOnce(&mut Config)) -> Self {
            let base = tempdir().unwrap();
            let home = tempdir().unwrap();
            let log = Arc::clone(&mock.log);

            let mut config = Config::default();
            config.packages.manager = vec!["pkg".to_string(), "install".to_string()];
            configure(&mut config);

            let ctx = OpsContextBuilder::new()
                .with_platform(Platform::new(Box::new(mock)))
                .with_config(config)
                .with_base_dir(base.path())
                .with_home_dir(home.path())
                .build()
                .unwrap();

            Self {
                ctx,
                log,
                base,
                home,
            }
        }

        fn recorded(&self) -> Vec<Recorded> {
            self.log.lock().unwrap().clone()
        }

        fn calls_to(&self, program: &str) -> Vec<Recorded> {
            self.recorded()
                .into_iter()
                .filter(|r| r.cmd.program() == program)
                .collect()
        }

        fn scoped_dirs_absent(&self) -> bool {
            !self.base.path().join(".uv_cache").exists()
                && !self.base.path().join(".uv_python").exists()
        }
    }

    fn with_tools(tools: &[&str]) -> MockProcess {
        MockProcess {
            present: tools.iter().map(ToString::to_string).collect(),
            ..MockProcess::default()
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(ToString::to_string).collect()
    }

    #[tokio::test]
    async fn test_two_arguments_reach_initializer_verbatim() {
        let harness = Harness::new(with_tools(&["just"]), |_| {});

        let report = bootstrap(&harness.ctx, &args(&["my config.yaml", "../ws"]), false)
            .await
            .unwrap();
        assert!(report.is_success());
        assert_eq!(report.config.as_deref(), Some("my config.yaml"));

        let delegate = harness.calls_to("uv");
        assert_eq!(delegate.len(), 1);
        assert_eq!(
            delegate[0].cmd.get_args(),
            args(&[
                "run",
                "src/init.py",
                "--config",
                "my config.yaml",
                "--workspace",
                "../ws"
            ])
            .as_slice()
        );
        assert_eq!(delegate[0].cmd.get_current_dir(), Some(harness.base.path()));
        assert!(harness.scoped_dirs_absent());
    }

    #[tokio::test]
    async fn test_no_arguments_use_defaults() {
        let harness = Harness::new(with_tools(&["just"]), |_| {});

        bootstrap(&harness.ctx, &[], false).await.unwrap();

        let delegate = harness.calls_to("uv");
        let expected_workspace = harness.home.path().join("workspace");
        let call_args = delegate[0].cmd.get_args();
        assert_eq!(call_args[2..4], args(&["--config", "config.yaml"]));
        assert_eq!(call_args[4], "--workspace");
        assert_eq!(Path::new(&call_args[5]), expected_workspace);
    }

    #[tokio::test]
    async fn test_scoped_directories_exported_only_to_initializer() {
        let harness = Harness::new(with_tools(&["just"]), |_| {});

        bootstrap(&harness.ctx, &args(&["c.yaml", "/ws"]), false)
            .await
            .unwrap();

        let delegate = &harness.calls_to("uv")[0];
        let env = delegate.cmd.get_env_vars();
        assert_eq!(
            PathBuf::from(&env["UV_CACHE_DIR"]),
            harness.base.path().join(".uv_cache")
        );
        assert_eq!(
            PathBuf::from(&env["UV_PYTHON_INSTALL_DIR"]),
            harness.base.path().join(".uv_python")
        );
        assert!(delegate.env_dirs_existed);

        // Package installs never see the scoped variables
        for call in harness.calls_to("pkg") {
            assert!(call.cmd.get_env_vars().is_empty());
        }
        assert!(harness.scoped_dirs_absent());
    }

    #[tokio::test]
    async fn test_initializer_exit_code_propagates_and_cleanup_runs() {
        let mut mock = with_tools(&["just"]);
        mock.exit_codes.insert("uv".to_string(), Some(7));
        let harness = Harness::new(mock, |_| {});

        let err = bootstrap(&harness.ctx, &args(&["c.yaml", "/ws"]), false)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Ops(OpsError::DelegateFailed { code: Some(7), .. })
        ));
        assert_eq!(err.exit_code(), 7);
        assert!(harness.calls_to("uv")[0].env_dirs_existed);
        assert!(harness.scoped_dirs_absent());
    }

    #[tokio::test]
    async fn test_initializer_killed_by_signal_exits_one() {
        let mut mock = with_tools(&["just"]);
        mock.exit_codes.insert("uv".to_string(), None);
        let harness = Harness::new(mock, |_| {});

        let err = bootstrap(&harness.ctx, &[], false).await.unwrap_err();
        assert_eq!(err.exit_code(), 1);
        assert!(harness.scoped_dirs_absent());
    }

    #[tokio::test]
    async fn test_package_failure_aborts_before_initializer() {
        let mut mock = with_tools(&["just"]);
        mock.exit_codes.insert("pkg".to_string(), Some(100));
        let harness = Harness::new(mock, |_| {});

        let err = bootstrap(&harness.ctx, &[], false).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Ops(OpsError::PackageInstallFailed { .. })
        ));
        assert_eq!(err.exit_code(), 100);
        assert!(harness.calls_to("uv").is_empty());
        assert_eq!(harness.recorded().len(), 1);
        assert!(harness.scoped_dirs_absent());
    }

    #[tokio::test]
    async fn test_present_tools_are_not_reinstalled() {
        let harness = Harness::new(with_tools(&["just"]), |_| {});
        let report = bootstrap(&harness.ctx, &[], false).await.unwrap();

        let installs = harness.calls_to("pkg");
        assert_eq!(installs.len(), 1);
        assert_eq!(
            installs[0].cmd.get_args(),
            args(&["install", "curl", "zsh", "git"]).as_slice()
        );
        let ensure = report
            .steps
            .iter()
            .find(|s| s.label == steps::ENSURE_TOOLS)
            .unwrap();
        assert_eq!(ensure.status, StepStatus::Skipped);
    }

    #[tokio::test]
    async fn test_missing_tools_are_installed() {
        let harness = Harness::new(MockProcess::default(), |_| {});
        bootstrap(&harness.ctx, &[], false).await.unwrap();

        let installs = harness.calls_to("pkg");
        assert_eq!(installs.len(), 2);
        assert_eq!(installs[1].cmd.get_args(), args(&["install", "just"]).as_slice());
    }

    #[tokio::test]
    async fn test_empty_package_manager_is_rejected() {
        let harness = Harness::new(with_tools(&["just"]), |c| c.packages.manager.clear());
        let err = bootstrap(&harness.ctx, &[], false).await.unwrap_err();
        assert!(matches!(err, Error::Ops(OpsError::EmptyPackageManager)));
        assert!(harness.recorded().is_empty());
    }

    proptest! {
        #[test]
        fn prop_other_argument_counts_are_usage_errors(count in 0usize..12) {
            prop_assume!(count != 0 && count != 2);
            let harness = Harness::new(with_tools(&["just"]), |_| {});
            let positional: Vec<String> = (0..count).map(|i| format!("arg{i}")).collect();

            let runtime = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let err = runtime
                .block_on(bootstrap(&harness.ctx, &positional, false))
                .unwrap_err();

            prop_assert!(matches!(err, Error::Ops(OpsError::Usage { given }) if given == count), "expected Usage error with given == {}", count);
            prop_assert_eq!(err.exit_code(), 1);
            prop_assert!(harness.recorded().is_empty());
            prop_assert!(harness.scoped_dirs_absent());
        }
    }

    #[test]
    fn test_plan_orders_steps() {
        let harness = Harness::new(MockProcess::default(), |_| {});

        let plan = resolve_plan(&harness.ctx, &[], true).unwrap();
        assert_eq!(
            plan.labels(),
            vec![
                steps::INSTALL_PACKAGES,
                steps::ENSURE_TOOLS,
                steps::SYNC_DOTFILES,
                steps::INSTALL_PLUGIN_MANAGER,
                steps::GENERATE_COMPLETIONS,
                steps::ACQUIRE_SCOPE,
                steps::RUN_DELEGATE,
                steps::RELEASE_SCOPE,
            ]
        );

        let report = plan.report(&harness.ctx);
        assert!(report.defaulted);
        assert_eq!(report.steps[0].index, 1);
        assert_eq!(report.steps[0].action, "pkg install curl zsh git");
        assert!(harness.recorded().is_empty());
    }

    #[test]
    fn test_disabled_initializer_leaves_dotfile_plan() {
        let harness = Harness::new(MockProcess::default(), |c| {
            c.delegate.enabled = false;
            c.packages.install.clear();
            c.packages.ensure.clear();
        });

        let plan = resolve_plan(&harness.ctx, &[], true).unwrap();
        assert!(plan.invocation.is_none());
        assert_eq!(
            plan.labels(),
            vec![
                steps::SYNC_DOTFILES,
                steps::INSTALL_PLUGIN_MANAGER,
                steps::GENERATE_COMPLETIONS,
            ]
        );

        // The argument count is still validated
        assert!(resolve_plan(&harness.ctx, &args(&["one"]), true).is_err());
    }

    #[tokio::test]
    async fn test_non_fatal_failure_is_recorded_and_run_continues() {
        let mut mock = with_tools(&["just"]);
        mock.exit_codes.insert("pkg".to_string(), Some(3));
        let harness = Harness::new(mock, |_| {});

        let plan = Plan {
            invocation: None,
            steps: vec![
                Step {
                    label: steps::INSTALL_PACKAGES,
                    kind: StepKind::InstallPackages {
                        packages: args(&["curl"]),
                    },
                    fatal: false,
                },
                Step {
                    label: steps::ENSURE_TOOLS,
                    kind: StepKind::EnsureTools {
                        tools: args(&["just"]),
                    },
                    fatal: true,
                },
            ],
        };

        let report = runner::execute(&harness.ctx, &plan).await.unwrap();
        assert!(!report.is_success());
        assert_eq!(report.steps[0].status, StepStatus::Failed);
        assert_eq!(report.steps[1].status, StepStatus::Skipped);
    }

    fn dotfile_source(root: &Path) -> PathBuf {
        let source = root.join("dotfiles");
        fs::create_dir_all(source.join(".git")).unwrap();
        fs::write(source.join(".git/HEAD"), b"ref: refs/heads/main\n").unwrap();
        fs::write(source.join("README.md"), b"# dotfiles\n").unwrap();
        fs::write(source.join("bootstrap.sh"), b"#!/bin/sh\n").unwrap();
        fs::write(source.join(".zshrc"), b"export EDITOR=vim\n").unwrap();
        fs::create_dir_all(source.join(".config/nvim")).unwrap();
        fs::write(source.join(".config/nvim/init.lua"), b"vim.o.number = true\n").unwrap();
        #[cfg(unix)]
        std::os::unix::fs::symlink(".zshrc", source.join(".zprofile")).unwrap();
        source
    }

    #[test]
    fn test_sync_is_idempotent_and_honors_exclusions() {
        let temp = tempdir().unwrap();
        let source = dotfile_source(temp.path());
        let target = temp.path().join("home");
        let options = SyncOptions {
            exclude: Config::default().dotfiles.exclude,
            prune: false,
        };

        let first = sync_tree(&source, &target, &options).unwrap();
        assert_eq!(first.files_copied, 2);
        assert_eq!(first.dirs_created, 2);

        let second = sync_tree(&source, &target, &options).unwrap();
        assert_eq!(second.files_copied, 0);
        assert_eq!(second.dirs_created, 0);
        assert_eq!(second.symlinks_written, 0);

        assert_eq!(
            fs::read(target.join(".config/nvim/init.lua")).unwrap(),
            b"vim.o.number = true\n"
        );
        for excluded in [".git", "README.md", "bootstrap.sh"] {
            assert!(!target.join(excluded).exists());
        }
        #[cfg(unix)]
        assert_eq!(
            fs::read_link(target.join(".zprofile")).unwrap(),
            PathBuf::from(".zshrc")
        );
    }

    #[test]
    fn test_sync_overwrites_changed_files() {
        let temp = tempdir().unwrap();
        let source = dotfile_source(temp.path());
        let target = temp.path().join("home");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join(".zshrc"), b"export EDITOR=nano\n").unwrap();

        let summary = sync_tree(&source, &target, &SyncOptions::default()).unwrap();
        assert!(summary.files_copied >= 2);
        assert_eq!(fs::read(target.join(".zshrc")).unwrap(), b"export EDITOR=vim\n");
    }

    #[test]
    fn test_prune_only_touches_tracked_subdirectories() {
        let temp = tempdir().unwrap();
        let source = dotfile_source(temp.path());
        let target = temp.path().join("home");
        fs::create_dir_all(target.join(".config/nvim")).unwrap();
        fs::write(target.join(".config/nvim/old.lua"), b"").unwrap();
        fs::create_dir_all(target.join(".config/other")).unwrap();
        fs::write(target.join(".bash_history"), b"ls\n").unwrap();

        let options = SyncOptions {
            exclude: Config::default().dotfiles.exclude,
            prune: true,
        };
        let summary = sync_tree(&source, &target, &options).unwrap();

        assert_eq!(summary.pruned, 2);
        assert!(!target.join(".config/nvim/old.lua").exists());
        assert!(!target.join(".config/other").exists());
        // The root is never pruned
        assert!(target.join(".bash_history").exists());
    }

    #[tokio::test]
    async fn test_sync_command_runs_dotfile_steps_only() {
        let mut mock = with_tools(&["just"]);
        mock.stdout
            .insert("just".to_string(), b"#compdef just\n".to_vec());
        mock.stdout
            .insert("curl".to_string(), b"echo installing\n".to_vec());
        let harness = Harness::new(mock, |c| {
            c.packages.install.clear();
            // Relative to the base directory
            c.dotfiles.source = Some(PathBuf::from("dotfiles"));
        });
        dotfile_source(harness.base.path());

        let report = sync(&harness.ctx).await.unwrap();
        assert!(report.is_success());
        assert!(report.config.is_none());
        assert!(harness.calls_to("uv").is_empty());

        let home = harness.home.path();
        assert!(home.join(".zshrc").exists());
        assert!(!home.join(".git").exists());
        assert_eq!(
            fs::read(home.join(".oh-my-zsh/custom/just.zsh")).unwrap(),
            b"#compdef just\n"
        );

        let download = harness.calls_to("curl");
        assert_eq!(download.len(), 1);
        assert_eq!(download[0].cmd.get_args()[0], "-fsSL");

        let installer = harness.calls_to("sh");
        assert_eq!(installer.len(), 1);
        assert_eq!(
            installer[0].cmd.get_args(),
            args(&["-c", "echo installing\n", "", "--unattended"]).as_slice()
        );
    }

    #[tokio::test]
    async fn test_failed_installer_download_aborts_run() {
        let mut mock = with_tools(&["just"]);
        mock.exit_codes.insert("curl".to_string(), Some(6));
        let harness = Harness::new(mock, |_| {});

        let err = bootstrap(&harness.ctx, &args(&["c.yaml", "/ws"]), true)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::Ops(OpsError::StepFailed { code: Some(6), .. })
        ));
        assert_eq!(err.exit_code(), 6);
        assert!(harness.calls_to("sh").is_empty());
        assert!(harness.calls_to("just").is_empty());
        assert!(harness.calls_to("uv").is_empty());
        assert!(harness.scoped_dirs_absent());
    }

    #[tokio::test]
    async fn test_failed_installer_script_aborts_run() {
        let mut mock = with_tools(&["just"]);
        mock.exit_codes.insert("sh".to_string(), Some(5));
        let harness = Harness::new(mock, |_| {});

        let err = bootstrap(&harness.ctx, &[], true).await.unwrap_err();

        assert_eq!(err.exit_code(), 5);
        let installer = &harness.calls_to("sh")[0];
        assert_eq!(
            installer.cmd.get_env_vars().get("KEEP_ZSHRC"),
            Some(&std::ffi::OsString::from("yes"))
        );
        assert!(harness.calls_to("uv").is_empty());
        assert!(harness.scoped_dirs_absent());
    }

    #[tokio::test]
    async fn test_failed_completion_generation_aborts_run() {
        let mut mock = with_tools(&["just"]);
        mock.exit_codes.insert("just".to_string(), Some(3));
        let harness = Harness::new(mock, |_| {});

        let err = bootstrap(&harness.ctx, &[], true).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Ops(OpsError::StepFailed { code: Some(3), .. })
        ));
        assert_eq!(err.exit_code(), 3);
        assert!(!harness
            .home
            .path()
            .join(".oh-my-zsh/custom/just.zsh")
            .exists());
        assert!(harness.calls_to("uv").is_empty());
        assert!(harness.scoped_dirs_absent());
    }

    #[tokio::test]
    async fn test_leftover_scoped_dirs_are_not_synced_home() {
        let harness = Harness::new(with_tools(&["just"]), |c| {
            c.plugin_manager.enabled = false;
            c.completions.enabled = false;
        });
        let base = harness.base.path();
        fs::create_dir_all(base.join(".uv_cache/wheels")).unwrap();
        fs::create_dir_all(base.join(".uv_python")).unwrap();
        fs::write(base.join(".zshrc"), b"export A=1\n").unwrap();

        let plan = resolve_plan(&harness.ctx, &[], true).unwrap();
        let StepKind::SyncDotfiles { options, .. } = &plan.steps[2].kind else {
            panic!("expected the dotfile sync step");
        };
        assert!(options.exclude.iter().any(|e| e == ".uv_cache"));
        assert!(options.exclude.iter().any(|e| e == ".uv_python"));

        bootstrap(&harness.ctx, &[], true).await.unwrap();

        let home = harness.home.path();
        assert!(home.join(".zshrc").exists());
        assert!(!home.join(".uv_cache").exists());
        assert!(!home.join(".uv_python").exists());
        assert!(harness.scoped_dirs_absent());
    }

    #[tokio::test]
    async fn test_plugin_manager_skipped_when_installed() {
        let harness = Harness::new(MockProcess::default(), |_| {});
        fs::create_dir_all(harness.home.path().join(".oh-my-zsh")).unwrap();
        let plugin = dotstrap_ops::dotfiles::PluginInstall::from_config(
            &harness.ctx.config.plugin_manager,
            &harness.ctx,
        );

        let outcome = plugin
            .run(&harness.ctx, steps::INSTALL_PLUGIN_MANAGER)
            .await
            .unwrap();
        assert!(matches!(outcome, StepOutcome::Skipped(_)));
        assert!(harness.recorded().is_empty());
    }

    #[tokio::test]
    async fn test_completions_skipped_without_tool() {
        let harness = Harness::new(MockProcess::default(), |_| {});
        let spec = dotstrap_ops::dotfiles::CompletionSpec::from_config(
            &harness.ctx.config.completions,
            &harness.ctx,
        );

        let outcome = spec
            .run(&harness.ctx, steps::GENERATE_COMPLETIONS)
            .await
            .unwrap();
        assert!(matches!(outcome, StepOutcome::Skipped(_)));
        assert!(!spec.output.exists());
    }

    #[test]
    fn test_builder_requires_platform() {
        let err = OpsContextBuilder::new()
            .with_config(Config::default())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Ops(OpsError::MissingComponent { .. })
        ));
    }

    #[test]
    fn test_operation_result_json() {
        let harness = Harness::new(MockProcess::default(), |_| {});
        let report = plan(&harness.ctx, &args(&["c.yaml", "/ws"]), false).unwrap();
        let json = OperationResult::Plan(report).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "Plan");
        assert_eq!(value["data"]["config"], "c.yaml");
        assert_eq!(value["data"]["workspace"], "/ws");
    }
}
