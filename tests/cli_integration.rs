//! CLI integration tests for Forge: drives the built binary against fixture
//! workspaces covering the scenarios in SPEC_FULL §8.

use std::fs;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

fn forge() -> Command {
    Command::cargo_bin("forge").unwrap()
}

fn temp_dir() -> TempDir {
    TempDir::new().unwrap()
}

/// A single console-app project with no toolchain declared, for tests that only
/// need to exercise manifest loading and the undirected `info` summary.
const MINIMAL_WORKSPACE: &str = r#"
[workspace]
name = "Demo"
configurations = ["Debug", "Release"]
startup_project = "app"

[[project]]
name = "app"
kind = "console-app"
language = "c"
dialect = "C17"
files = ["src/main.c"]
"#;

fn write_minimal_workspace(dir: &std::path::Path) {
    fs::write(dir.join("forge.toml"), MINIMAL_WORKSPACE).unwrap();
    fs::create_dir_all(dir.join("src")).unwrap();
    fs::write(dir.join("src/main.c"), "int main(void) { return 0; }\n").unwrap();
}

// ============================================================================
// forge info
// ============================================================================

#[test]
fn info_prints_workspace_summary() {
    let tmp = temp_dir();
    write_minimal_workspace(tmp.path());

    forge()
        .args(["info"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("workspace: Demo"))
        .stdout(predicate::str::contains("app"))
        .stdout(predicate::str::contains("startup project: app"));
}

#[test]
fn info_message_format_json_emits_valid_json() {
    let tmp = temp_dir();
    write_minimal_workspace(tmp.path());

    let output = forge()
        .args(["--message-format", "json", "info"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let doc: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(doc["workspace"], "Demo");
    assert_eq!(doc["projects"][0]["name"], "app");
}

#[test]
fn info_fails_without_manifest() {
    let tmp = temp_dir();

    forge()
        .args(["info"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("forge.toml"));
}

// ============================================================================
// forge build / clean / rebuild - target selection and manifest validation
// ============================================================================

#[test]
fn build_rejects_unknown_target() {
    let tmp = temp_dir();
    write_minimal_workspace(tmp.path());

    forge()
        .args(["build", "--target", "nonexistent"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown project"));
}

#[test]
fn build_reports_missing_toolchain_for_declared_project() {
    // MINIMAL_WORKSPACE declares no [toolchains.*] entries, so resolving any
    // project against any platform must fail cleanly rather than panic.
    let tmp = temp_dir();
    write_minimal_workspace(tmp.path());

    forge()
        .args(["build"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

#[test]
fn clean_is_idempotent_with_no_prior_build() {
    let tmp = temp_dir();
    write_minimal_workspace(tmp.path());

    forge().args(["clean"]).current_dir(tmp.path()).assert().success();
}

#[test]
fn invalid_manifest_reports_parse_error() {
    let tmp = temp_dir();
    fs::write(tmp.path().join("forge.toml"), "not valid toml = [[[").unwrap();

    forge()
        .args(["info"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse manifest"));
}

#[test]
fn undefined_dependency_fails_validation_at_load_time() {
    let tmp = temp_dir();
    let manifest = r#"
        [workspace]
        name = "Demo"

        [[project]]
        name = "app"
        kind = "console-app"
        language = "c"
        dialect = "C17"
        depends_on = ["missing"]
    "#;
    fs::write(tmp.path().join("forge.toml"), manifest).unwrap();

    forge()
        .args(["info"])
        .current_dir(tmp.path())
        .assert()
        .failure();
}

// ============================================================================
// forge run / test - no startup project / no test-suite projects
// ============================================================================

#[test]
fn run_fails_without_project_or_startup_project() {
    let tmp = temp_dir();
    let manifest = r#"
        [workspace]
        name = "Demo"

        [[project]]
        name = "app"
        kind = "console-app"
        language = "c"
        dialect = "C17"
        files = ["src/main.c"]
    "#;
    fs::write(tmp.path().join("forge.toml"), manifest).unwrap();
    fs::create_dir_all(tmp.path().join("src")).unwrap();
    fs::write(tmp.path().join("src/main.c"), "int main(void) { return 0; }\n").unwrap();

    forge()
        .args(["run"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no project given"));
}

#[test]
fn test_reports_no_test_suite_projects() {
    let tmp = temp_dir();
    write_minimal_workspace(tmp.path());

    forge()
        .args(["test"])
        .current_dir(tmp.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("no test-suite projects found"));
}

// ============================================================================
// forge completions
// ============================================================================

#[test]
fn completions_generates_bash_script() {
    forge()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("forge"));
}
