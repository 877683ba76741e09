//! End-to-end tests for the `mups` binary.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn mups(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mups"))
        .args(args)
        .env("MUPS_CONFIG", config)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run mups")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_name_check_exit_status() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.ini");

    assert!(mups(&config, &["name", "check", "my-pkg"]).status.success());

    let output = mups(&config, &["name", "check", "-bad"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error: "));
}

#[test]
fn test_version_compare() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.ini");

    let output = mups(&config, &["version", "compare", "1.0a1", "1.0"]);
    assert_eq!(stdout(&output), "<\n");
    let output = mups(&config, &["version", "compare", "1.0", "1.0.0"]);
    assert_eq!(stdout(&output), "=\n");
}

#[test]
fn test_filename_build_and_parse() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.ini");

    let output = mups(
        &config,
        &["filename", "build", "--name", "My.Package", "--version", "1.0", "--tag", "linux_x86_64"],
    );
    assert_eq!(stdout(&output), "My_Package-1.0-linux_x86_64.ring\n");

    let output = mups(&config, &["filename", "parse", "--json", "My_Package-1.0-linux_x86_64.ring"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "my-package");
    assert_eq!(value["version"], "1.0");
}

#[test]
fn test_config_set_then_info() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("nested").join("config.ini");

    assert!(mups(&config, &["config", "set", "author.name", "Jane Doe"]).status.success());
    assert!(mups(&config, &["config", "set", "build.platform", "mac"]).status.success());
    assert!(config.exists());

    let output = mups(&config, &["config", "get", "author.name"]);
    assert_eq!(stdout(&output), "Jane Doe\n");

    let output = mups(&config, &["info", "--name", "pkg", "--version", "2.0", "--no-git"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["author"], "Jane Doe");
    assert_eq!(value["file_name"], "pkg-2.0-mac.ring");
}

#[test]
fn test_config_path_honours_env() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("custom.ini");

    let output = mups(&config, &["config", "path"]);
    assert_eq!(stdout(&output).trim(), config.display().to_string());
}
