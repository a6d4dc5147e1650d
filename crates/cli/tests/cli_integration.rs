//! CLI integration tests.
//!
//! Uses `assert_cmd` to spawn the `runlog` binary and verify exit codes,
//! stdout content, and stderr content. Every command runs with a cleared
//! environment inside an empty temp directory so no `.env` file or
//! developer credentials leak in, and none of them reach a real database
//! or provider.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper: a `runlog` command with an empty environment, rooted at `dir`.
fn runlog(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("runlog");
    cmd.env_clear().current_dir(dir.path());
    cmd
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    let dir = TempDir::new().unwrap();
    runlog(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Execution report generator for automation logs",
        ))
        .stdout(predicate::str::contains("preview"));
}

#[test]
fn version_exits_0() {
    let dir = TempDir::new().unwrap();
    runlog(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("runlog"));
}

#[test]
fn run_help_lists_flags() {
    let dir = TempDir::new().unwrap();
    runlog(&dir)
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-stream"))
        .stdout(predicate::str::contains("--prompts"));
}

// ──────────────────────────────────────────────
// 2. Configuration errors exit 3
// ──────────────────────────────────────────────

#[test]
fn run_without_database_config_exits_3() {
    let dir = TempDir::new().unwrap();
    runlog(&dir)
        .arg("run")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("DB_HOST"));
}

#[test]
fn bare_invocation_runs_the_pipeline() {
    let dir = TempDir::new().unwrap();
    runlog(&dir)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("DB_HOST"));
}

#[test]
fn show_without_database_config_exits_3() {
    let dir = TempDir::new().unwrap();
    runlog(&dir)
        .args(["show", "1"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("DB_HOST"));
}

#[test]
fn dotenv_file_is_read() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".env"),
        "DB_HOST=localhost\nDB_USER=u\nDB_NAME=n\nDB_PORT=not-a-port\n",
    )
    .unwrap();

    runlog(&dir)
        .args(["preview"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("DB_PORT"));
}

#[test]
fn balance_without_api_key_exits_3() {
    let dir = TempDir::new().unwrap();
    runlog(&dir)
        .arg("balance")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("DEEPSEEK_API_KEY"));
}

#[test]
fn missing_prompt_file_exits_3() {
    let dir = TempDir::new().unwrap();
    runlog(&dir)
        .args(["run", "--prompts", "nope.toml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("nope.toml"));
}

#[test]
fn prompt_file_without_placeholder_exits_3() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("prompts.toml"),
        "user = \"no placeholder here\"\n",
    )
    .unwrap();

    runlog(&dir)
        .args(["preview", "--render", "--prompts", "prompts.toml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("{log_content}"));
}

// ──────────────────────────────────────────────
// 3. Argument errors
// ──────────────────────────────────────────────

#[test]
fn unknown_output_format_is_rejected() {
    let dir = TempDir::new().unwrap();
    runlog(&dir)
        .args(["--output", "yaml", "run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("yaml"));
}

#[test]
fn show_requires_numeric_id() {
    let dir = TempDir::new().unwrap();
    runlog(&dir)
        .args(["show", "latest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("latest"));
}
