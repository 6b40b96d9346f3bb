//! End-to-end tests of the `cfn-rules` binary.

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture(relative: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/templates")
        .join(relative)
}

/// Run from an empty directory so no project configuration is picked up.
fn cfn_rules(workdir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cfn-rules").unwrap();
    cmd.current_dir(workdir.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn rules_lists_the_catalog() {
    let workdir = TempDir::new().unwrap();
    cfn_rules(&workdir)
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("E9009"))
        .stdout(predicate::str::contains("EPolicyWildcardPrincipal"))
        .stdout(predicate::str::contains("lambda-runtime-eol"));
}

#[test]
fn rules_as_json() {
    let workdir = TempDir::new().unwrap();
    let output = cfn_rules(&workdir).args(["rules", "--json"]).output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rules = parsed.as_array().unwrap();
    assert_eq!(rules.len(), 6);
    assert!(rules.iter().any(|r| r["code"] == "E9904"));
}

#[test]
fn clean_template_exits_zero() {
    let workdir = TempDir::new().unwrap();
    cfn_rules(&workdir)
        .arg("lint")
        .arg(fixture("good"))
        .args(["--reference-date", "2024-01-01"])
        .assert()
        .success();
}

#[test]
fn findings_exit_one() {
    let workdir = TempDir::new().unwrap();
    cfn_rules(&workdir)
        .arg("lint")
        .arg(fixture("bad/nested/main.yaml"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("E9904"))
        .stdout(predicate::str::contains("W9901"));
}

#[test]
fn json_output() {
    let workdir = TempDir::new().unwrap();
    let output = cfn_rules(&workdir)
        .arg("lint")
        .arg(fixture("bad/metadata_params.yaml"))
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let messages = parsed[0]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages.iter().all(|m| m["ruleId"] == "E9009"));
    assert_eq!(parsed[0]["errorCount"], 2);
}

#[test]
fn github_output() {
    let workdir = TempDir::new().unwrap();
    cfn_rules(&workdir)
        .arg("lint")
        .arg(fixture("bad/missing_child.yaml"))
        .args(["--format", "github"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("title=nested stack Orphan"));
}

#[test]
fn no_fail_only_covers_findings() {
    let workdir = TempDir::new().unwrap();
    cfn_rules(&workdir)
        .arg("lint")
        .arg(fixture("bad/nested/main.yaml"))
        .arg("--no-fail")
        .assert()
        .success();

    cfn_rules(&workdir)
        .arg("lint")
        .arg(fixture("bad/missing_child.yaml"))
        .arg("--no-fail")
        .assert()
        .code(1);
}

#[test]
fn threshold_controls_failure() {
    let workdir = TempDir::new().unwrap();
    let template = fixture("bad/lambda_eol.yaml");

    // python3.8 is a warning a year out from end of life
    cfn_rules(&workdir)
        .arg("lint")
        .arg(&template)
        .args(["--reference-date", "2024-01-01"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("W9932"));

    cfn_rules(&workdir)
        .arg("lint")
        .arg(&template)
        .args(["--reference-date", "2024-01-01", "--threshold", "error"])
        .assert()
        .success();

    cfn_rules(&workdir)
        .arg("lint")
        .arg(&template)
        .args(["--reference-date", "2024-09-15", "--threshold", "error"])
        .assert()
        .code(1);
}

#[test]
fn ignore_flag_disables_rules() {
    let workdir = TempDir::new().unwrap();
    cfn_rules(&workdir)
        .arg("lint")
        .arg(fixture("bad/nested/main.yaml"))
        .args(["--ignore", "W9901,E9902,E9904"])
        .assert()
        .success();
}

#[test]
fn ignoring_nested_rules_skips_child_resolution() {
    let workdir = TempDir::new().unwrap();
    cfn_rules(&workdir)
        .arg("lint")
        .arg(fixture("bad/missing_child.yaml"))
        .args(["--ignore", "W9901,E9902,E9904"])
        .assert()
        .success();
}

#[test]
fn project_config_is_loaded() {
    let workdir = TempDir::new().unwrap();
    fs::write(
        workdir.path().join(".cfn-rules.yaml"),
        "ignored:\n  - E9009\n",
    )
    .unwrap();

    cfn_rules(&workdir)
        .arg("lint")
        .arg(fixture("bad/metadata_params.yaml"))
        .assert()
        .success();
}

#[test]
fn missing_path_exits_one() {
    let workdir = TempDir::new().unwrap();
    cfn_rules(&workdir)
        .arg("lint")
        .arg(workdir.path().join("absent.yaml"))
        .args(["--format", "compact"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Failed to read file"));
}

#[test]
fn invalid_reference_date_exits_two() {
    let workdir = TempDir::new().unwrap();
    cfn_rules(&workdir)
        .arg("lint")
        .arg(fixture("good/main.yaml"))
        .args(["--reference-date", "next-tuesday"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid argument"));
}
