use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("sanctum")
        .env("SANCTUM_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("sanctum")
        .env("SANCTUM_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("setup_completed = false"));
    assert!(contents.contains("# url ="));
    assert!(contents.contains("list_limit = 50"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "# existing config").unwrap();

    cargo_bin_cmd!("sanctum")
        .env("SANCTUM_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_commands_ignore_broken_config() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "setup_completed = [").unwrap();

    cargo_bin_cmd!("sanctum")
        .env("SANCTUM_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success();
}

#[test]
fn test_backend_commands_require_valid_config() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), "setup_completed = [").unwrap();

    cargo_bin_cmd!("sanctum")
        .env("SANCTUM_HOME", dir.path())
        .arg("status")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("load config"));
}

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("sanctum")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("signup"))
        .stdout(predicate::str::contains("probe"))
        .stdout(predicate::str::contains("entities"));
}

#[test]
fn test_non_terminal_launch_is_refused() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("sanctum")
        .env("SANCTUM_HOME", dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires a terminal"));
}
