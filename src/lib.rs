// src/lib.rs

pub mod cli;
pub mod config;
pub mod discover;
pub mod engine;
pub mod env;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod output;
pub mod plugin;
pub mod result;

use std::io::Write;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::RunConfig;
use crate::discover::{Candidate, DiscoveryRequest, discover};
use crate::env::AmbientEnv;
use crate::errors::Result;
use crate::exec::ProcessLauncher;
use crate::fs::RealFileSystem;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the informational modes (`--print-spec`, `--plugin`, `--list-plugins`)
/// - plugin discovery on `PATH`
/// - environment composition and bounded parallel execution
/// - output formatting
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    if args.print_spec {
        return emit(plugin::PLUGIN_SPEC);
    }

    let ambient = AmbientEnv::capture();

    if args.plugin {
        return emit(&plugin::self_envelope(&ambient)?);
    }

    let cfg = RunConfig::try_from(&args)?;

    debug!("discovering plugins in PATH");
    let self_path = std::env::current_exe().ok();
    let candidates = discover(
        &RealFileSystem,
        &DiscoveryRequest {
            search_path: ambient.get_os("PATH"),
            prefix: &cfg.plugin_prefix,
            self_path: self_path.as_deref(),
        },
    )?;
    info!(found = candidates.len(), "plugin discovery complete");

    if args.list_plugins {
        return emit(&render_listing(&candidates, &cfg.plugin_prefix));
    }

    // Ctrl-C → cancel every outstanding plugin.
    let cancel = CancellationToken::new();
    {
        let token = cancel.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            token.cancel();
        });
    }

    let report = engine::gather(&cfg, &ambient, candidates, ProcessLauncher, cancel).await;
    let rendered = output::format_output(&report.aggregate, &cfg.format, report.session_id())?;
    emit(&rendered)
}

/// Listing mode output: one discovered path per line.
pub fn render_listing(candidates: &[Candidate], prefix: &str) -> String {
    let mut out = format!("Discovered potential plugins (executables named {prefix}* in PATH):\n");
    if candidates.is_empty() {
        out.push_str("  (None found)\n");
    }
    for c in candidates {
        out.push_str(&format!("  - {}\n", c.path.display()));
    }
    out
}

fn emit(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
