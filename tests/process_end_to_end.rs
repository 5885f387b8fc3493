// tests/process_end_to_end.rs
//
// Real `ctx-*` scripts on a temporary search path, run through discovery,
// the process launcher and the formatter.

#![cfg(unix)]

mod common;

use std::error::Error;
use std::ffi::OsStr;
use std::time::{Duration, Instant};

use ctx::cli::OutputFormat;
use ctx::config::{FormatOptions, PLUGIN_PREFIX};
use ctx::discover::{DiscoveryRequest, discover};
use ctx::engine::gather;
use ctx::env::AmbientEnv;
use ctx::exec::ProcessLauncher;
use ctx::fs::RealFileSystem;
use ctx_test_utils::builders::RunConfigBuilder;
use ctx_test_utils::{init_tracing, with_timeout};
use serde_json::json;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use common::{aggregate_value, render, search_path_with, write_script};

type TestResult = Result<(), Box<dyn Error>>;

fn discover_in(search_path: &str) -> ctx::errors::Result<Vec<ctx::discover::Candidate>> {
    discover(
        &RealFileSystem,
        &DiscoveryRequest {
            search_path: Some(OsStr::new(search_path)),
            prefix: PLUGIN_PREFIX,
            self_path: None,
        },
    )
}

#[tokio::test]
async fn scripts_on_path_are_discovered_run_and_merged() -> TestResult {
    init_tracing();

    let dir = TempDir::new()?;
    write_script(
        dir.path(),
        "ctx-alpha",
        r#"echo '{"name":"alpha","version":"1","data":{"x":1}}'"#,
    );
    write_script(
        dir.path(),
        "ctx-beta",
        r#"echo '{"name":"beta","version":"1","data":{"y":[1,2]}}'"#,
    );
    write_script(dir.path(), "ctx-broken", "echo oops >&2; exit 1");
    write_script(dir.path(), "unrelated", "echo nope");

    let search_path = search_path_with(dir.path());
    let candidates = discover_in(&search_path)?;
    let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["ctx-alpha", "ctx-beta", "ctx-broken"]);

    let cfg = RunConfigBuilder::new().parallel(2).build();
    let ambient = AmbientEnv::from_pairs([("PATH", search_path.as_str())]);
    let report = with_timeout(gather(
        &cfg,
        &ambient,
        candidates,
        ProcessLauncher,
        CancellationToken::new(),
    ))
    .await;

    let opts = FormatOptions {
        format: OutputFormat::Json,
        indent: 2,
        summary: true,
    };
    assert_eq!(render(&report, &opts), "{\"alpha\":{\"x\":1},\"beta\":{\"y\":[1,2]}}\n");
    Ok(())
}

#[tokio::test]
async fn plugins_receive_the_composed_environment() -> TestResult {
    init_tracing();

    let dir = TempDir::new()?;
    let cache = TempDir::new()?;
    write_script(
        dir.path(),
        "ctx-env",
        r#"printf '{"name":"env","version":"1","data":{"session":"%s","shlvl":"%s","cache":"%s","budget":"%s","inherited":"%s"}}' "$CTX_SESSION" "$CTX_SHLVL" "$CTX_CACHE_DIR" "$CTX_OUTPUT_TOKEN_BUDGET" "$KEEP_ME""#,
    );

    let search_path = search_path_with(dir.path());
    let candidates = discover_in(&search_path)?;
    let cfg = RunConfigBuilder::new()
        .cache_dir(cache.path())
        .output_token_budget(1000)
        .build();
    let ambient = AmbientEnv::from_pairs([
        ("PATH", search_path.as_str()),
        ("KEEP_ME", "yes"),
        ("CTX_SHLVL", "3"),
    ]);

    let report = with_timeout(gather(
        &cfg,
        &ambient,
        candidates,
        ProcessLauncher,
        CancellationToken::new(),
    ))
    .await;

    let data = &aggregate_value(&report)["env"];
    assert_eq!(data["session"], json!(report.session_id()));
    assert_eq!(data["shlvl"], json!("4"));
    assert_eq!(data["cache"], json!(cache.path().display().to_string()));
    assert_eq!(data["budget"], json!("1000"));
    assert_eq!(data["inherited"], json!("yes"));
    Ok(())
}

#[tokio::test]
async fn hanging_script_is_killed_at_the_deadline() -> TestResult {
    init_tracing();

    let dir = TempDir::new()?;
    write_script(dir.path(), "ctx-hang", "sleep 30");
    write_script(
        dir.path(),
        "ctx-quick",
        r#"echo '{"name":"quick","version":"1","data":{}}'"#,
    );

    let search_path = search_path_with(dir.path());
    let candidates = discover_in(&search_path)?;
    let cfg = RunConfigBuilder::new()
        .parallel(2)
        .timeout(Duration::from_millis(500))
        .build();
    let ambient = AmbientEnv::from_pairs([("PATH", search_path.as_str())]);

    let started = Instant::now();
    let report = with_timeout(gather(
        &cfg,
        &ambient,
        candidates,
        ProcessLauncher,
        CancellationToken::new(),
    ))
    .await;

    assert!(started.elapsed() < Duration::from_secs(4), "run did not stop at the deadline");
    assert_eq!(aggregate_value(&report), json!({"quick": {}}));
    Ok(())
}

#[test]
fn missing_search_path_is_fatal() {
    let err = discover(
        &RealFileSystem,
        &DiscoveryRequest {
            search_path: None,
            prefix: PLUGIN_PREFIX,
            self_path: None,
        },
    )
    .unwrap_err();
    assert!(err.to_string().contains("PATH"));
}
