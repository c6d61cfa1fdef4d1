mod common;

use common::{Workspace, run};
use predicates::prelude::*;
use serde_json::Value;

const LINE: &str = "07-01 12:00:00: <span>FAILED</span> (<a href=\"http://ci.example/log/1\">log</a></span>): yarn test foo (30s) (code: 1) (target: next)";

#[test]
fn e2e_parse_prints_fields() {
    let _log = common::test_log("e2e_parse_prints_fields");
    let ws = Workspace::new();

    let run = run(&ws, ["parse", LINE]);
    assert!(run.status.success(), "parse failed: {}", run.stderr);

    insta::assert_snapshot!(run.stdout, @r"
    date-time    07-01 12:00:00
    status       FAILED
    link         http://ci.example/log/1
    test_command yarn test foo
    duration     30s
    exit_code    1
    target       next
    ");
}

#[test]
fn e2e_parse_json() {
    let _log = common::test_log("e2e_parse_json");
    let ws = Workspace::new();

    let run = run(&ws, ["parse", "--json", LINE]);
    assert!(run.status.success(), "parse failed: {}", run.stderr);

    let json: Value = serde_json::from_str(&run.stdout).expect("stdout is JSON");
    assert_eq!(json["date-time"], "07-01 12:00:00");
    assert_eq!(json["status"], "FAILED");
    assert_eq!(json["exit_code"], 1);
    assert_eq!(json["test_command"], "yarn test foo");
}

#[test]
fn e2e_parse_unrecognized_line() {
    let _log = common::test_log("e2e_parse_unrecognized_line");
    let ws = Workspace::new();

    let run = run(&ws, ["parse", "not a dashboard line"]);
    assert!(run.status.success(), "parse failed: {}", run.stderr);
    assert!(run.stdout.lines().all(|line| line.ends_with(" -")));
}

#[test]
fn e2e_version() {
    let _log = common::test_log("e2e_version");
    let ws = Workspace::new();

    let run = run(&ws, ["version"]);
    assert!(run.status.success());
    assert!(run.stdout.starts_with("ci-flakes version "));

    let run = common::run(&ws, ["version", "--json"]);
    let json: Value = serde_json::from_str(&run.stdout).expect("stdout is JSON");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn e2e_completions_bash() {
    let _log = common::test_log("e2e_completions_bash");
    let ws = Workspace::new();

    let run = run(&ws, ["completions", "bash"]);
    assert!(run.status.success(), "completions failed: {}", run.stderr);
    assert!(run.stdout.contains("ci-flakes"));
    assert!(run.stdout.contains("--window"));
}

#[test]
fn e2e_quiet_suppresses_report() {
    let _log = common::test_log("e2e_quiet_suppresses_report");
    let ws = Workspace::with_dashboard();

    let run = run(&ws, common::report_args(&["--quiet"]));
    assert!(run.status.success(), "report failed: {}", run.stderr);
    assert!(run.stdout.is_empty());
    assert!(ws.path("failed_tests_48h.csv").exists());
}

#[test]
fn e2e_help_lists_commands() {
    let _log = common::test_log("e2e_help_lists_commands");
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("ci-flakes"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("report").and(predicate::str::contains("parse")));
}

#[test]
fn e2e_unknown_subcommand_fails() {
    let _log = common::test_log("e2e_unknown_subcommand_fails");
    assert_cmd::Command::new(assert_cmd::cargo::cargo_bin!("ci-flakes"))
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("frobnicate"));
}
