//! End-to-end runs of the `silently` binary.

use serde_json::Value;

use crate::common::{config_file, run_binary};

#[test]
fn default_run_exits_cleanly() {
    let (_dir, config) = config_file("");
    let output = run_binary(&config, &[]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Simple expressions and effects"));
    assert!(stdout.contains("7/7 scenarios behaved as documented"));
}

#[test]
fn late_failures_are_observed_not_orphaned() {
    let (_dir, config) = config_file("");
    let output = run_binary(&config, &["--with-failures"]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("async_value_crash"));
    assert!(stdout.contains("raised invalid operation: two crashed"));
    assert!(stdout.contains("10/10 scenarios"));
}

#[test]
fn escalated_orphan_sets_exit_status() {
    let (_dir, config) = config_file("");
    let output = run_binary(&config, &["--fire-and-forget"]);

    assert_eq!(output.status.code(), Some(2));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("Orphaned failures (policy: escalate)"));
}

#[test]
fn logged_orphan_does_not_fail_the_run() {
    let (_dir, config) = config_file("");
    let output = run_binary(&config, &["--fire-and-forget", "--policy", "log"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn json_report_reflects_config() {
    let (_dir, config) = config_file(
        "[orphans]\npolicy = \"swallow\"\n\n[scenarios]\nfire_and_forget = true\n",
    );
    let output = run_binary(&config, &["--json"]);
    assert_eq!(output.status.code(), Some(0));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["orphan_policy"], "swallow");
    assert_eq!(report["escalated"], false);
    assert_eq!(report["orphans"].as_array().map(Vec::len), Some(0));

    let records = report["records"].as_array().unwrap();
    assert_eq!(records.len(), 8);
    let dropped = records
        .iter()
        .find(|record| record["scenario"] == "fire_and_forget")
        .unwrap();
    assert_eq!(dropped["observed"]["kind"], "dropped");
    assert_eq!(dropped["passed"], true);
}

#[test]
fn policy_flag_overrides_config() {
    let (_dir, config) = config_file("[orphans]\npolicy = \"swallow\"\n");
    let output = run_binary(&config, &["--fire-and-forget", "--policy", "escalate"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_config_exits_with_config_status() {
    let (_dir, config) = config_file("[orphans]\npolicy = \"sometimes\"\n");
    let output = run_binary(&config, &[]);

    assert_eq!(output.status.code(), Some(78));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Failed to load configuration"));
    assert!(output.stdout.is_empty());
}

#[test]
fn missing_explicit_config_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("absent.toml");
    let output = run_binary(&absent, &[]);

    assert_eq!(output.status.code(), Some(78));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("failed to read config"));
}
