// tests/cli_binary.rs
//
// Drive the built `ctx` binary the way a user would.

#![cfg(unix)]

mod common;

use std::error::Error;
use std::process::Command;

use serde_json::{Value, json};
use tempfile::TempDir;

use common::{search_path_with, write_script};

type TestResult = Result<(), Box<dyn Error>>;

fn ctx_command(search_path: &str) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ctx"));
    cmd.env_clear().env("PATH", search_path);
    cmd
}

#[test]
fn json_run_prints_the_merged_document() -> TestResult {
    let dir = TempDir::new()?;
    write_script(
        dir.path(),
        "ctx-alpha",
        r#"echo '{"name":"alpha","version":"1","data":{"x":1}}'"#,
    );
    write_script(dir.path(), "ctx-fail", "exit 3");

    let out = ctx_command(&search_path_with(dir.path()))
        .args(["--output", "json", "-P", "2"])
        .output()?;

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let stdout = String::from_utf8(out.stdout)?;
    assert!(stdout.ends_with("}\n"));
    let value: Value = serde_json::from_str(&stdout)?;
    assert_eq!(value, json!({"alpha": {"x": 1}}));
    Ok(())
}

#[test]
fn list_plugins_names_each_candidate() -> TestResult {
    let dir = TempDir::new()?;
    let script = write_script(dir.path(), "ctx-one", "exit 0");

    let out = ctx_command(&search_path_with(dir.path()))
        .arg("--list-plugins")
        .output()?;

    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout)?;
    assert!(stdout.starts_with("Discovered potential plugins"));
    let canonical = std::fs::canonicalize(&script)?;
    assert!(stdout.contains(&format!("  - {}\n", canonical.display())), "{stdout}");
    Ok(())
}

#[test]
fn plugin_mode_emits_a_valid_envelope() -> TestResult {
    let dir = TempDir::new()?;
    let out = ctx_command(&search_path_with(dir.path()))
        .arg("--plugin")
        .env("CTX_SESSION", "ctx_outer")
        .output()?;

    assert!(out.status.success());
    let value: Value = serde_json::from_slice(&out.stdout)?;
    assert_eq!(value["name"], json!("ctx"));
    assert_eq!(value["data"]["environment"]["CTX_SESSION"], json!("ctx_outer"));
    Ok(())
}

#[test]
fn print_spec_shows_the_contract() -> TestResult {
    let out = ctx_command("/nonexistent").arg("--print-spec").output()?;
    assert!(out.status.success());
    assert!(String::from_utf8(out.stdout)?.contains("CTX_SESSION"));
    Ok(())
}

#[test]
fn unset_path_exits_with_an_error() -> TestResult {
    let out = Command::new(env!("CARGO_BIN_EXE_ctx"))
        .env_clear()
        .args(["--output", "json"])
        .output()?;

    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    assert!(String::from_utf8_lossy(&out.stderr).contains("PATH"));
    Ok(())
}

#[test]
fn help_goes_to_stderr_and_fails() -> TestResult {
    for flag in ["-h", "--help"] {
        let out = ctx_command("/nonexistent").arg(flag).output()?;
        assert_eq!(out.status.code(), Some(1), "{flag}");
        assert!(out.stdout.is_empty(), "{flag} wrote to stdout");
        assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
    }
    Ok(())
}

#[test]
fn huge_nesting_level_does_not_abort_the_run() -> TestResult {
    let dir = TempDir::new()?;
    let out = ctx_command(&search_path_with(dir.path()))
        .args(["--output", "json"])
        .env("CTX_SHLVL", "4294967295")
        .output()?;

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(String::from_utf8(out.stdout)?, "{}\n");
    Ok(())
}

#[test]
fn oversized_timeout_is_a_usage_error() -> TestResult {
    let out = ctx_command("/nonexistent")
        .args(["--plugin-timeout", "99999999999999999h"])
        .output()?;
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("too large"));
    Ok(())
}

#[test]
fn zero_parallelism_is_rejected() -> TestResult {
    let out = ctx_command("/nonexistent").args(["-P", "0"]).output()?;
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
    Ok(())
}
