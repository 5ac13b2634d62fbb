//! Unit and behavioural tests for the CLI runtime.

use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use rcwarden_config::Config;
use rcwarden_sudoers::FakePrivilegedOps;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::commands::REJECTED_MESSAGE;
use crate::{
    AppError, ConfigLoader, IoStreams, OrthoConfigLoader, run_with_loader,
    run_with_privileged_ops,
};


const LIVE_SUDOERS: &str = "root ALL=(ALL:ALL) ALL\n";

pub(super) struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    pub(super) const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        Ok(self.config.clone())
    }
}

/// A loader that fails the test if the runtime reaches configuration.
struct PanickingLoader;

impl ConfigLoader for PanickingLoader {
    fn load(&self, _args: &[OsString]) -> Result<Config, AppError> {
        panic!("usage errors must be reported before configuration loading");
    }
}

pub(super) struct TestWorld {
    dir: TempDir,
    pub(super) config: Config,
    pub(super) ops: Option<FakePrivilegedOps>,
    pub(super) stdout: Vec<u8>,
    pub(super) stderr: Vec<u8>,
    pub(super) exit_code: Option<ExitCode>,
}

impl TestWorld {
    pub(super) fn new() -> Result<Self> {
        let dir = TempDir::new().context("create temp dir")?;
        let utf8 = |name: &str| -> Result<String> {
            dir.path()
                .join(name)
                .to_str()
                .map(str::to_owned)
                .context("temp paths are utf-8")
        };
        let config = Config {
            sudoers_path: utf8("sudoers")?.into(),
            shell_rc_path: Some(utf8(".bashrc")?.into()),
            staging_dir: Some(utf8("staging")?.into()),
            lock_path: Some(utf8("sudoers.lock")?.into()),
            log_filter: String::from("off"),
            ..Config::default()
        };
        fs::create_dir(dir.path().join("staging")).context("create staging root")?;
        fs::write(dir.path().join("sudoers"), LIVE_SUDOERS).context("seed sudoers")?;
        Ok(Self {
            dir,
            config,
            ops: None,
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: None,
        })
    }

    pub(super) fn rc_path(&self) -> PathBuf {
        self.dir.path().join(".bashrc")
    }

    pub(super) fn sudoers_path(&self) -> PathBuf {
        self.dir.path().join("sudoers")
    }

    pub(super) fn staging_root(&self) -> PathBuf {
        self.dir.path().join("staging")
    }

    /// Writes the world's locations to a TOML file for the layered loader.
    fn write_config_file(&self) -> Result<PathBuf> {
        let path = self.dir.path().join("rcwarden.toml");
        let optional =
            |value: Option<String>| -> Result<String> { value.context("world paths are set") };
        let toml = format!(
            "sudoers_path = \"{}\"\nshell_rc_path = \"{}\"\nstaging_dir = \"{}\"\n\
             lock_path = \"{}\"\nlog_filter = \"off\"\n",
            self.config.sudoers_path,
            optional(self.config.shell_rc_path.as_ref().map(ToString::to_string))?,
            optional(self.config.staging_dir.as_ref().map(ToString::to_string))?,
            optional(self.config.lock_path.as_ref().map(ToString::to_string))?,
        );
        fs::write(&path, toml).context("write config file")?;
        Ok(path)
    }

    pub(super) fn run(&mut self, args: &[&str]) {
        let loader = StaticConfigLoader::new(self.config.clone());
        self.run_with(args, &loader);
    }

    fn run_with<L: ConfigLoader>(&mut self, args: &[&str], loader: &L) {
        self.stdout.clear();
        self.stderr.clear();
        let argv: Vec<OsString> = std::iter::once("rcwarden")
            .chain(args.iter().copied())
            .map(OsString::from)
            .collect();
        let mut io = IoStreams::new(&mut self.stdout, &mut self.stderr);
        let exit = match self.ops.as_ref() {
            Some(ops) => run_with_privileged_ops(argv, &mut io, loader, ops),
            None => run_with_loader(argv, &mut io, loader),
        };
        self.exit_code = Some(exit);
    }

    pub(super) fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    pub(super) fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

#[fixture]
fn world() -> TestWorld {
    TestWorld::new().expect("build test world")
}

#[rstest]
fn alias_add_reports_the_appended_line(mut world: TestWorld) {
    world.run(&["alias", "add", "ll", "ls -la"]);

    assert_eq!(world.exit_code, Some(ExitCode::SUCCESS));
    assert_eq!(world.stdout_text(), "Alias added: alias ll='ls -la'\n");
    assert_eq!(
        fs::read_to_string(world.rc_path()).expect("read rc"),
        "alias ll='ls -la'\n"
    );
}

#[rstest]
fn removing_an_unknown_export_still_succeeds(mut world: TestWorld) {
    world.run(&["export", "remove", "JAVA_HOME"]);

    assert_eq!(world.exit_code, Some(ExitCode::SUCCESS));
    assert_eq!(world.stdout_text(), "Export removed: JAVA_HOME\n");
}

#[rstest]
fn accepted_sudoers_entry_is_committed(mut world: TestWorld) {
    world.ops = Some(FakePrivilegedOps::accepting());

    world.run(&["sudoers", "add", "ops ALL=(ALL) NOPASSWD: /usr/bin/apt"]);

    assert_eq!(world.exit_code, Some(ExitCode::SUCCESS));
    assert_eq!(world.stdout_text(), "Sudoers updated successfully.\n");
    assert_eq!(
        fs::read_to_string(world.sudoers_path()).expect("read sudoers"),
        format!("{LIVE_SUDOERS}\nops ALL=(ALL) NOPASSWD: /usr/bin/apt\n")
    );
}

#[rstest]
fn rejected_sudoers_entry_exits_with_distinct_status(mut world: TestWorld) {
    world.ops = Some(FakePrivilegedOps::rejecting(
        ">>> staging:2: syntax error near line 2 <<<",
    ));

    world.run(&["sudoers", "add", "ops ALL="]);

    assert_eq!(world.exit_code, Some(ExitCode::from(3)));
    assert!(world.stdout.is_empty());
    assert_eq!(
        world.stderr_text(),
        format!("{REJECTED_MESSAGE}\n>>> staging:2: syntax error near line 2 <<<\n")
    );
    assert_eq!(
        fs::read_to_string(world.sudoers_path()).expect("read sudoers"),
        LIVE_SUDOERS
    );
}

#[rstest]
fn sudoers_failures_are_fatal(mut world: TestWorld) {
    world.ops = Some(FakePrivilegedOps::accepting().failing_snapshot());

    world.run(&["sudoers", "add", "ops ALL=(ALL) ALL"]);

    assert_eq!(world.exit_code, Some(ExitCode::FAILURE));
    assert!(world.stderr_text().starts_with("sudoers update aborted: failed to snapshot"));
}

#[rstest]
fn retain_staging_flag_keeps_the_staging_directory(mut world: TestWorld) -> Result<()> {
    let config_path = world.write_config_file()?;
    let config_arg = config_path.to_str().context("utf-8 config path")?.to_owned();
    world.ops = Some(FakePrivilegedOps::accepting());

    world.run_with(
        &[
            "--config-path",
            config_arg.as_str(),
            "--retain-staging",
            "true",
            "sudoers",
            "add",
            "ops ALL=(ALL) ALL",
        ],
        &OrthoConfigLoader,
    );

    assert_eq!(world.exit_code, Some(ExitCode::SUCCESS), "{}", world.stderr_text());
    let retained = fs::read_dir(world.staging_root())
        .context("list staging root")?
        .count();
    assert_eq!(retained, 1);
    Ok(())
}

#[rstest]
fn staging_is_removed_without_the_retain_flag(mut world: TestWorld) -> Result<()> {
    let config_path = world.write_config_file()?;
    let config_arg = config_path.to_str().context("utf-8 config path")?.to_owned();
    world.ops = Some(FakePrivilegedOps::accepting());

    world.run_with(
        &[
            "--config-path",
            config_arg.as_str(),
            "--elevate=false",
            "sudoers",
            "add",
            "ops ALL=(ALL) ALL",
        ],
        &OrthoConfigLoader,
    );

    assert_eq!(world.exit_code, Some(ExitCode::SUCCESS), "{}", world.stderr_text());
    let retained = fs::read_dir(world.staging_root())
        .context("list staging root")?
        .count();
    assert_eq!(retained, 0);
    Ok(())
}

#[rstest]
fn relative_configured_paths_are_rejected(mut world: TestWorld) {
    world.config.shell_rc_path = Some(String::from("relative/.bashrc").into());

    world.run(&["alias", "remove", "ll"]);

    assert_eq!(world.exit_code, Some(ExitCode::FAILURE));
    assert!(world.stderr_text().starts_with("invalid configuration:"));
}

#[rstest]
#[case::bare(&[][..])]
#[case::group_only(&["export"][..])]
#[case::unknown_group(&["cron", "add"][..])]
#[case::empty_entry(&["sudoers", "add", ""][..])]
fn usage_errors_exit_with_two_before_loading_configuration(#[case] args: &[&str]) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let argv: Vec<OsString> = std::iter::once("rcwarden")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect();
    let mut io = IoStreams::new(&mut stdout, &mut stderr);

    let exit = run_with_loader(argv, &mut io, &PanickingLoader);

    assert_eq!(exit, ExitCode::from(2));
    assert!(stdout.is_empty());
    assert!(String::from_utf8_lossy(&stderr).contains("Usage: rcwarden"));
}

#[test]
fn help_is_written_to_stdout() {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let mut io = IoStreams::new(&mut stdout, &mut stderr);

    let exit = run_with_loader(
        [OsString::from("rcwarden"), OsString::from("--help")],
        &mut io,
        &PanickingLoader,
    );

    assert_eq!(exit, ExitCode::SUCCESS);
    let text = String::from_utf8_lossy(&stdout);
    assert!(text.contains("alias"));
    assert!(text.contains("export"));
    assert!(text.contains("sudoers"));
}
