use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::PathBuf;

/// Helper to get a temporary home directory
fn temp_home() -> tempfile::TempDir {
    tempfile::tempdir().expect("create temp dir")
}

/// Helper to get config file path in the temp dir
fn config_file_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join(".insights").join("config.json")
}

fn preferences_file_path(dir: &tempfile::TempDir) -> PathBuf {
    dir.path().join(".insights").join("preferences.json")
}

const BINARY_NAME: &str = "insights";

fn insights(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.env("HOME", home.path())
        .env_remove("INSIGHTS_ENVIRONMENT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
/// Help command should display usage information.
fn cli_help_displays_usage() {
    let mut cmd = Command::cargo_bin(BINARY_NAME).unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(contains("Command-line client for the Insights"))
        .stdout(contains("browse"));
}

#[test]
/// Logout command should delete an existing config file.
fn logout_deletes_config_file() {
    let tmp = temp_home();
    let config_path = config_file_path(&tmp);
    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    fs::write(&config_path, "{}").unwrap();

    assert!(config_path.exists());

    insights(&tmp)
        .arg("logout")
        .assert()
        .success()
        .stdout(contains("Logging out"));

    assert!(!config_path.exists());
}

#[test]
/// Filters work without a session and start from the default window.
fn filters_show_defaults() {
    let tmp = temp_home();

    insights(&tmp)
        .args(["filters", "show"])
        .assert()
        .success()
        .stdout(contains("Granularity:  weekly"))
        .stdout(contains("Date range:"));
}

#[test]
fn filters_set_persists_granularity() {
    let tmp = temp_home();

    insights(&tmp)
        .args(["filters", "set", "--granularity", "monthly"])
        .assert()
        .success();
    assert!(preferences_file_path(&tmp).exists());

    insights(&tmp)
        .args(["filters", "show"])
        .assert()
        .success()
        .stdout(contains("Granularity:  monthly"));
}

#[test]
/// Picking authors before teams is refused.
fn toggle_author_requires_a_team() {
    let tmp = temp_home();

    insights(&tmp)
        .args(["filters", "toggle-author", "7"])
        .assert()
        .failure()
        .stdout(contains("Select at least one team first"));
}

#[test]
/// Commands that call the API need a saved session.
fn boards_without_login_fails() {
    let tmp = temp_home();

    insights(&tmp)
        .arg("boards")
        .assert()
        .failure()
        .stdout(contains("Not logged in"));
}

#[test]
fn unknown_environment_is_rejected() {
    let tmp = temp_home();

    insights(&tmp)
        .args(["--api-url", "staging", "filters", "show"])
        .assert()
        .failure()
        .stderr(contains("Unknown environment"));
}
