//! Smoke tests to verify command wiring

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("medtrack").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("stats"));
}

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("medtrack").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--memory"))
        .stdout(predicate::str::contains("--no-migrate"))
        .stdout(predicate::str::contains("Allow permissive CORS"));
}

#[test]
fn test_migrate_help() {
    let mut cmd = Command::cargo_bin("medtrack").unwrap();
    cmd.arg("migrate").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--database-url"));
}

#[test]
fn test_config_prints_file_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [statistics]
        timezone = "Europe/Madrid"
        due_soon_days = 14
        "#
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("medtrack").unwrap();
    cmd.arg("--config")
        .arg(file.path())
        .arg("config")
        .env_remove("MEDTRACK_TIMEZONE")
        .env_remove("MEDTRACK_BIND");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("timezone = \"Europe/Madrid\""))
        .stdout(predicate::str::contains("due_soon_days = 14"));
}

#[test]
fn test_explicit_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("medtrack").unwrap();
    cmd.arg("--config").arg(dir.path().join("missing.toml")).arg("config");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn test_stats_without_database_url_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "").unwrap();

    let mut cmd = Command::cargo_bin("medtrack").unwrap();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("DATABASE_URL")
        .arg("--config")
        .arg(&config)
        .arg("stats");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL not set"));
}
