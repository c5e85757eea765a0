//! Integration tests for the `cf` binary

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Path to the compiled cf binary
fn cf_bin() -> String {
    env!("CARGO_BIN_EXE_cf").to_string()
}

/// Run a `cf` command and return (stdout, stderr, exit code).
fn run_cf(args: &[&str]) -> (String, String, Option<i32>) {
    let output = Command::new(cf_bin())
        .args(args)
        .env_remove("CF_TARGET")
        .env_remove("CF_PASSWORD")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute cf with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code(),
    )
}

/// Project pointing at a port nothing listens on
fn sample_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("clickforge.yml"),
        "name: analytics\n\
         connection:\n  url: http://127.0.0.1:9\n\
         vars:\n  cluster: main\n",
    )
    .unwrap();

    let migrations = dir.path().join("migrations");
    fs::create_dir(&migrations).unwrap();
    fs::write(
        migrations.join("Version000001.up.sql"),
        "CREATE TABLE IF NOT EXISTS payments ON CLUSTER {{ var('cluster') }} \
         (id UInt64) ENGINE = MergeTree() ORDER BY id;\n",
    )
    .unwrap();
    fs::write(
        migrations.join("Version000001.down.sql"),
        "DROP TABLE IF EXISTS payments ON CLUSTER {{ var('cluster') }};\n",
    )
    .unwrap();
    fs::write(
        migrations.join("Version000002.up.sql"),
        "ALTER TABLE payments ADD COLUMN amount Decimal(38, 18);\n",
    )
    .unwrap();
    dir
}

fn project_arg(dir: &Path) -> String {
    dir.display().to_string()
}

#[test]
fn test_render_up() {
    let dir = sample_project();
    let (stdout, stderr, code) =
        run_cf(&["render", "Version000001", "-p", &project_arg(dir.path())]);
    assert_eq!(code, Some(0), "stderr: {}", stderr);
    assert_eq!(
        stdout.trim(),
        "CREATE TABLE IF NOT EXISTS payments ON CLUSTER main (id UInt64) ENGINE = MergeTree() ORDER BY id;"
    );
}

#[test]
fn test_render_down() {
    let dir = sample_project();
    let (stdout, _, code) = run_cf(&[
        "render",
        "Version000001",
        "--down",
        "-p",
        &project_arg(dir.path()),
    ]);
    assert_eq!(code, Some(0));
    assert_eq!(stdout.trim(), "DROP TABLE IF EXISTS payments ON CLUSTER main;");
}

#[test]
fn test_render_down_without_script_fails() {
    let dir = sample_project();
    let (_, stderr, code) = run_cf(&[
        "render",
        "Version000002",
        "--down",
        "-p",
        &project_arg(dir.path()),
    ]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("[M007]"), "stderr: {}", stderr);
}

#[test]
fn test_render_unknown_version() {
    let dir = sample_project();
    let (_, stderr, code) = run_cf(&["render", "Version000099", "-p", &project_arg(dir.path())]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("Migration Version000099 not found"));
    assert!(stderr.contains("Version000001, Version000002"));
}

#[test]
fn test_version_flag_requires_down() {
    let dir = sample_project();
    let (_, stderr, code) = run_cf(&[
        "migrate",
        "--version",
        "Version000001",
        "-p",
        &project_arg(dir.path()),
    ]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("option `--version` can be used after `down` argument only"));
}

#[test]
fn test_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let (_, stderr, code) = run_cf(&["migrate", "-p", &project_arg(dir.path())]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("Failed to load project config"));
}

#[test]
fn test_unknown_target_fails() {
    let dir = sample_project();
    let (_, stderr, code) = run_cf(&[
        "migrate",
        "-t",
        "prod",
        "-p",
        &project_arg(dir.path()),
    ]);
    assert_eq!(code, Some(1));
    assert!(stderr.contains("Target 'prod' not found"), "stderr: {}", stderr);
}

#[test]
fn test_unreachable_store_fails() {
    let dir = sample_project();
    let (stdout, stderr, code) = run_cf(&["migrate", "-p", &project_arg(dir.path())]);
    assert_eq!(code, Some(1));
    assert!(stdout.is_empty());
    assert!(stderr.contains("Migration failed"), "stderr: {}", stderr);
}
