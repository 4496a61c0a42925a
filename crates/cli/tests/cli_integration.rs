//! End-to-end tests for the `pw` binary

mod support;

use std::fs;
use std::time::Duration;
use support::PwCommand;
use tempfile::TempDir;

/// Config file that pins every setting the tests depend on
fn write_config(dir: &TempDir, body: &str) -> String {
    let path = dir.path().join("config.toml");
    fs::write(&path, body).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_missing_path_fails_with_errno() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "");
    let missing = temp_dir.path().join("missing");

    let result = PwCommand::new()
        .args(&["--config", &config, missing.to_str().unwrap()])
        .assert_failure()
        .unwrap();

    assert_eq!(result.exit_code, 1);
    assert!(result.stderr.contains("ENOENT"), "stderr: {}", result.stderr);
    assert!(result.stdout.is_empty());
}

#[test]
fn test_non_persistent_watch_exits_immediately() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "[watch]\npersistent = false\n");

    let result = PwCommand::new()
        .args(&["--config", &config, temp_dir.path().to_str().unwrap()])
        .assert_success()
        .unwrap();

    assert!(result.stdout.is_empty());
    assert!(result.duration < Duration::from_secs(5));
}

#[test]
fn test_timeout_ends_persistent_watch() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "");

    let result = PwCommand::new()
        .args(&["--config", &config, "--timeout", "1", temp_dir.path().to_str().unwrap()])
        .assert_success()
        .unwrap();

    assert!(result.duration >= Duration::from_secs(1));
}

#[test]
fn test_json_event_for_created_file() {
    let temp_dir = TempDir::new().unwrap();
    let watched = temp_dir.path().join("watched");
    fs::create_dir(&watched).unwrap();
    let config = write_config(&temp_dir, "[log]\nlevel = \"debug\"\n");

    let running = PwCommand::new()
        .args(&[
            "--config",
            &config,
            "--json",
            "--count",
            "1",
            "--timeout",
            "10",
            watched.to_str().unwrap(),
        ])
        .spawn()
        .unwrap();

    // Let pw arm the watch before touching the directory
    std::thread::sleep(Duration::from_millis(500));
    fs::write(watched.join("a.txt"), b"hello").unwrap();

    let result = running.wait().unwrap();
    assert!(result.success(), "stderr: {}", result.stderr);

    let events = result.json_events();
    assert_eq!(events.len(), 1, "stdout: {}", result.stdout);
    assert_eq!(events[0]["status"], 0);
    assert_eq!(events[0]["filename"], "a.txt");
    assert!(events[0]["event"] == "rename" || events[0]["event"] == "change");
    assert!(result.duration < Duration::from_secs(10));
}

#[test]
fn test_invalid_config_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "[watch]\npersistent = 3\n");

    let result = PwCommand::new()
        .args(&["--config", &config, temp_dir.path().to_str().unwrap()])
        .assert_failure()
        .unwrap();

    assert!(result.stderr.contains("config"), "stderr: {}", result.stderr);
}

#[test]
fn test_log_env_overrides_config_level() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "[watch]\npersistent = false\n\n[log]\nlevel = \"error\"\n");
    let path = temp_dir.path().to_str().unwrap();

    let quiet = PwCommand::new()
        .args(&["--config", &config, path])
        .assert_success()
        .unwrap();
    assert!(!quiet.stderr.contains("loaded configuration"), "stderr: {}", quiet.stderr);

    let verbose = PwCommand::new()
        .args(&["--config", &config, path])
        .env("PATHWATCH_LOG", "debug")
        .assert_success()
        .unwrap();
    assert!(verbose.stderr.contains("loaded configuration"), "stderr: {}", verbose.stderr);
}

#[test]
fn test_log_level_flag_overrides_env() {
    let temp_dir = TempDir::new().unwrap();
    let config = write_config(&temp_dir, "[watch]\npersistent = false\n");

    let result = PwCommand::new()
        .args(&["--config", &config, "--log-level", "error", temp_dir.path().to_str().unwrap()])
        .env("PATHWATCH_LOG", "debug")
        .assert_success()
        .unwrap();

    assert!(!result.stderr.contains("loaded configuration"), "stderr: {}", result.stderr);
    assert!(!result.stderr.contains("watching"), "stderr: {}", result.stderr);
}

#[test]
fn test_zero_count_is_rejected() {
    let temp_dir = TempDir::new().unwrap();

    let result = PwCommand::new()
        .args(&["-n", "0", temp_dir.path().to_str().unwrap()])
        .assert_failure()
        .unwrap();

    assert!(result.stdout.is_empty());
}
