#![allow(dead_code)]

use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::info;

/// Saved dashboard page shared by the end-to-end tests.
pub const DASHBOARD: &str = include_str!("../fixtures/dashboard.html");

/// Clock used with `--as-of` so window filtering is reproducible.
pub const AS_OF: &str = "2025-07-03 12:00:00";

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        ci_flakes::logging::init_test_logging();
    });
}

pub struct TestLogGuard {
    name: String,
    start: Instant,
}

impl Drop for TestLogGuard {
    fn drop(&mut self) {
        info!(
            "{}: assertions passed (elapsed {:?})",
            self.name,
            self.start.elapsed()
        );
    }
}

pub fn test_log(name: &str) -> TestLogGuard {
    init_test_logging();
    info!("{name}: starting");
    TestLogGuard {
        name: name.to_string(),
        start: Instant::now(),
    }
}

#[derive(Debug)]
pub struct CliRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
    pub duration: Duration,
}

impl CliRun {
    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

pub struct Workspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        init_test_logging();
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    /// Workspace with the fixture page saved as `dashboard.html`.
    pub fn with_dashboard() -> Self {
        let ws = Self::new();
        ws.write("dashboard.html", DASHBOARD);
        ws
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, contents).expect("write workspace file");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.root.join(name)).expect("read workspace file")
    }

    /// File names in the workspace root, sorted.
    pub fn files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(&self.root)
            .expect("read workspace dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

pub fn run<I, S>(workspace: &Workspace, args: I) -> CliRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_with(
        workspace,
        args,
        std::iter::empty::<(String, String)>(),
        None,
    )
}

pub fn run_with<I, S, E, K, V>(
    workspace: &Workspace,
    args: I,
    env_vars: E,
    stdin: Option<&str>,
) -> CliRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ci-flakes"));
    cmd.current_dir(&workspace.root);
    cmd.args(args);
    cmd.envs(env_vars);
    cmd.env("NO_COLOR", "1");
    cmd.env("RUST_LOG", "ci_flakes=debug");
    cmd.env("RUST_BACKTRACE", "1");
    if let Some(input) = stdin {
        cmd.write_stdin(input);
    }

    let start = Instant::now();
    let output = cmd.output().expect("run ci-flakes");
    let duration = start.elapsed();

    let run = CliRun {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status,
        duration,
    };
    info!(
        status = ?run.status,
        elapsed = ?run.duration,
        "ci-flakes finished"
    );
    run
}

/// Report args that read the fixture page at the fixed clock.
pub fn report_args<'a>(extra: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec!["report", "--input", "dashboard.html", "--as-of", AS_OF];
    args.extend_from_slice(extra);
    args
}

pub fn assert_exists(path: &Path) {
    assert!(path.exists(), "expected {} to exist", path.display());
}
