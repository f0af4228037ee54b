use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn keepgo() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("keepgo"));
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn write_service(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("web.yaml");
    fs::write(&path, body).expect("write service file");
    path
}

const EXPLICIT: &str = r#"
name: web
display_name: Web Frontend
description: Serves the dashboard
executable: /usr/bin/web
arguments: ["--port", "80"]
env:
  APP_ENV: production
"#;

#[test]
fn render_systemd_unit_for_explicit_command() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_service(dir.path(), EXPLICIT);

    keepgo()
        .args(["render", "--system", "linux-systemd", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("Description=Serves the dashboard"))
        .stdout(contains(r#"ExecStart=/usr/bin/web "--port" "80""#))
        .stdout(contains("[Install]"));
}

#[test]
fn render_launchd_plist() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_service(dir.path(), EXPLICIT);

    keepgo()
        .args(["--config"])
        .arg(&config)
        .args(["render", "--system", "darwin-launchd"])
        .assert()
        .success()
        .stdout(contains("<key>Label</key>"))
        .stdout(contains("<string>web</string>"))
        .stdout(contains("<key>APP_ENV</key>"));
}

#[test]
fn default_command_points_back_at_the_service_file() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_service(
        dir.path(),
        "name: web\nworkload:\n  exec: /bin/sleep\n  args: [\"60\"]\n",
    );

    keepgo()
        .args(["render", "--system", "unix-systemv", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("run"))
        .stdout(contains("--config"))
        .stdout(contains("web.yaml"));
}

#[test]
fn unknown_system_is_rejected_with_the_known_list() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_service(dir.path(), EXPLICIT);

    keepgo()
        .args(["render", "--system", "windows-scm", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("unknown init system 'windows-scm'"))
        .stderr(contains("linux-openrc"));
}

#[test]
fn missing_service_file_is_reported() {
    let dir = TempDir::new().expect("tempdir");

    keepgo()
        .args(["status", "--config"])
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .failure()
        .stderr(contains("failed to read service file"));
}

#[test]
fn render_rejects_names_install_would_reject() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_service(dir.path(), "name: a/b\nexecutable: /usr/bin/web\n");

    keepgo()
        .args(["render", "--system", "linux-systemd", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("invalid service name \"a/b\""))
        .stdout(contains("[Unit]").not());
}

#[test]
fn malformed_service_file_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_service(dir.path(), "name: web\nbogus_field: 1\n");

    keepgo()
        .args(["render", "--system", "linux-rcs", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("failed to parse service file"));
}

#[test]
fn run_requires_a_workload() {
    let dir = TempDir::new().expect("tempdir");
    let config = write_service(dir.path(), EXPLICIT);

    keepgo()
        .args(["run", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(contains("has no workload section"));
}

#[test]
fn systems_json_lists_every_init_system() {
    let output = keepgo()
        .args(["systems", "--json"])
        .output()
        .expect("run keepgo systems");
    assert!(output.status.success());

    let rows: Vec<serde_json::Value> =
        serde_json::from_slice(&output.stdout).expect("systems JSON");
    let names: Vec<&str> = rows.iter().filter_map(|r| r["name"].as_str()).collect();
    assert_eq!(
        names,
        vec![
            "linux-systemd",
            "linux-upstart",
            "linux-openrc",
            "linux-rcs",
            "unix-systemv",
            "darwin-launchd",
        ]
    );
    assert!(rows.iter().filter(|r| r["active"] == true).count() <= 1);
}

#[test]
fn help_lists_lifecycle_commands() {
    keepgo()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("install").and(contains("uninstall")).and(contains("systems")));
}
