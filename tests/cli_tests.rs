//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const PROJECT: &str = r#"
name: CliApp
version: 1.0.0.0
manufacturer: Acme
dirs:
  - name: '%ProgramFiles%\Acme\CliApp'
    files:
      - name: app.exe
"#;

const BUNDLE: &str = r#"
name: CliSuite
version: 1.0.0.0
packages:
  - type: msi
    source: CliApp.msi
"#;

fn write_project(dir: &std::path::Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_wxs_to_stdout() {
    let dir = tempdir().unwrap();
    let project = write_project(dir.path(), "app.yaml", PROJECT);

    Command::cargo_bin("wix-compose")
        .unwrap()
        .args(["wxs", project.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("<Product"))
        .stdout(predicate::str::contains("Id=\"INSTALLDIR\""));
}

#[test]
fn test_wxs_to_file() {
    let dir = tempdir().unwrap();
    let project = write_project(dir.path(), "app.yaml", PROJECT);
    let output = dir.path().join("CliApp.wxs");

    Command::cargo_bin("wix-compose")
        .unwrap()
        .args(["wxs", project.to_str().unwrap(), "-o", output.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated:"));

    let text = std::fs::read_to_string(&output).unwrap();
    assert!(text.contains("app.exe"));
}

#[test]
fn test_validate_reports_summary() {
    let dir = tempdir().unwrap();
    let project = write_project(dir.path(), "app.yaml", PROJECT);

    Command::cargo_bin("wix-compose")
        .unwrap()
        .args(["validate", project.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Project is valid"))
        .stdout(predicate::str::contains("CliApp"));
}

#[test]
fn test_validate_rejects_bad_version() {
    let dir = tempdir().unwrap();
    let project = write_project(
        dir.path(),
        "bad.yaml",
        &PROJECT.replace("version: 1.0.0.0", "version: one"),
    );

    Command::cargo_bin("wix-compose")
        .unwrap()
        .args(["validate", project.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation failed"));
}

#[test]
fn test_missing_project_file() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("wix-compose")
        .unwrap()
        .args(["wxs", dir.path().join("nope.yaml").to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load"));
}

#[test]
fn test_build_without_toolset() {
    let dir = tempdir().unwrap();
    let project = write_project(dir.path(), "app.yaml", PROJECT);
    let out = dir.path().join("dist");

    Command::cargo_bin("wix-compose")
        .unwrap()
        .args([
            "build",
            project.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--wix-bin",
            dir.path().join("no-wix").to_str().unwrap(),
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("candle"));

    assert!(out.join("CliApp.wxs").exists());
}

#[test]
fn test_bundle_source() {
    let dir = tempdir().unwrap();
    let bundle = write_project(dir.path(), "suite.yaml", BUNDLE);

    Command::cargo_bin("wix-compose")
        .unwrap()
        .args(["bundle", bundle.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("<Bundle"))
        .stdout(predicate::str::contains("<MsiPackage"));
}

#[test]
fn test_relative() {
    Command::cargo_bin("wix-compose")
        .unwrap()
        .args(["relative", r"E:\A\B\Content\readme.txt", r"E:\A\B\Install Files"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r"..\Content\readme.txt"));
}
