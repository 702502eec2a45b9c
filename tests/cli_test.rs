//! Integration tests for the medic binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SERVER_LOG: &str = "\
2024-05-02 08:15:00,101 4242 INFO prod werkzeug: GET /web 200
2024-05-02 08:15:01,202 4242 ERROR prod odoo.sql_db: Connection refused
2024-05-02 08:15:02,303 4242 INFO prod werkzeug: GET /web/login 200
";

fn setup_project(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join(".medic");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.yml"), config).unwrap();
    temp
}

fn add_module(root: &Path, name: &str, requirements: &str) {
    let dir = root.join("addons").join(name);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("__manifest__.py"), "{}").unwrap();
    fs::write(dir.join("requirements.txt"), requirements).unwrap();
}

fn medic(project: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("medic"));
    cmd.current_dir(project).arg("--no-color");
    cmd
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("medic"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("logs"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("medic"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_rejects_unknown_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("medic"));
    cmd.arg("bogus");
    cmd.assert().failure();
    Ok(())
}

#[test]
fn scan_without_roots_is_healthy() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project("");
    medic(temp.path())
        .arg("--project")
        .arg(temp.path())
        .arg("scan")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No 'requirements.txt' files found in any scanned module.",
        ));
    Ok(())
}

#[test]
fn scan_with_broken_interpreter_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        "requirements:\n  module_roots: [addons]\ninstaller:\n  python: /nonexistent/medic-python\n",
    );
    add_module(temp.path(), "sale", "libbar\n");

    medic(temp.path())
        .arg("--project")
        .arg(temp.path())
        .arg("scan")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Module: 'sale'"))
        .stdout(predicate::str::contains("Error during check"));
    Ok(())
}

#[test]
fn scan_json_is_machine_readable() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project("requirements:\n  module_roots: [addons]\n");
    add_module(temp.path(), "sale", "# nothing yet\n");

    let output = medic(temp.path())
        .arg("--project")
        .arg(temp.path())
        .args(["scan", "--json"])
        .output()?;

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["scan"]["requirements_file"], "requirements.txt");
    assert!(value["analysis"]["to_install"].as_array().unwrap().is_empty());
    Ok(())
}

#[test]
fn invalid_config_is_reported() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project("requirements: [not, a, mapping\n");
    medic(temp.path())
        .arg("--project")
        .arg(temp.path())
        .arg("scan")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse config"));
    Ok(())
}

#[test]
fn logs_level_filter() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let log = temp.path().join("server.log");
    fs::write(&log, SERVER_LOG)?;

    medic(temp.path())
        .args(["logs", "--level", "error", "--file"])
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("Connection refused"))
        .stdout(predicate::str::contains("GET /web").not());
    Ok(())
}

#[test]
fn logs_diagnose_prints_hints() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let log = temp.path().join("server.log");
    fs::write(&log, SERVER_LOG)?;

    medic(temp.path())
        .args(["logs", "--diagnose", "--file"])
        .arg(&log)
        .assert()
        .success()
        .stdout(predicate::str::contains("could not connect to PostgreSQL"));
    Ok(())
}

#[test]
fn logs_grep_and_json() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let log = temp.path().join("server.log");
    fs::write(&log, SERVER_LOG)?;

    let output = medic(temp.path())
        .args(["logs", "--grep", "LOGIN", "--json", "--file"])
        .arg(&log)
        .output()?;

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(value["status"], "success");
    assert_eq!(value["lines"].as_array().unwrap().len(), 1);
    Ok(())
}

#[test]
fn logs_missing_file_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    medic(temp.path())
        .args(["logs", "--file"])
        .arg(temp.path().join("missing.log"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not found"));
    Ok(())
}

#[test]
fn logs_unknown_level_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let log = temp.path().join("server.log");
    fs::write(&log, SERVER_LOG)?;

    medic(temp.path())
        .args(["logs", "--level", "loud", "--file"])
        .arg(&log)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
    Ok(())
}
