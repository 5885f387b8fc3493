// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use crate::cli::OutputFormat;

/// File-name prefix every plugin executable must carry.
pub const PLUGIN_PREFIX: &str = "ctx-";

/// Ambient tracing variables forwarded to plugins when already present.
pub const DEFAULT_TRACING_KEYS: &[&str] = &["TRACEPARENT", "TRACESTATE"];

/// Immutable configuration for a single `ctx` run.
///
/// Built once (see [`crate::config::validate`]) before discovery and then
/// only ever passed around by reference.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Explicit cache directory; `None` falls back to the XDG/home default.
    pub cache_dir: Option<PathBuf>,

    /// Budgets forwarded to plugins. Zero means "no constraint" and is omitted.
    pub output_token_budget: u64,
    pub thinking_token_budget: u64,
    pub cost_budget_cents: u64,

    /// External commands plugins may call.
    pub allowed_tools: Vec<String>,

    /// Per-plugin timeout. Doubles as the shared deadline for the whole run.
    pub plugin_timeout: Option<Duration>,

    /// Advisory only; `ctx` never retries on its own.
    pub plugin_retries: u32,

    /// Size of the admission gate (always >= 1).
    pub max_parallel: usize,

    pub show_source: bool,

    pub format: FormatOptions,

    /// Executable name prefix used by discovery.
    pub plugin_prefix: String,

    /// Tracing identifiers propagated from the ambient environment.
    pub tracing_keys: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            output_token_budget: 0,
            thinking_token_budget: 0,
            cost_budget_cents: 0,
            allowed_tools: Vec::new(),
            plugin_timeout: None,
            plugin_retries: 0,
            max_parallel: 1,
            show_source: false,
            format: FormatOptions::default(),
            plugin_prefix: PLUGIN_PREFIX.to_string(),
            tracing_keys: DEFAULT_TRACING_KEYS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl RunConfig {
    /// The configured timeout, ignoring a zero value.
    pub fn effective_timeout(&self) -> Option<Duration> {
        self.plugin_timeout.filter(|d| !d.is_zero())
    }
}

/// Output selection for the formatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub format: OutputFormat,
    /// Indentation width for JSON and XML.
    pub indent: usize,
    /// Compact output; wins over `indent`.
    pub summary: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Yaml,
            indent: 2,
            summary: false,
        }
    }
}

impl FormatOptions {
    /// Indentation actually applied, `None` for compact output.
    pub fn effective_indent(&self) -> Option<usize> {
        if self.summary || self.indent == 0 {
            None
        } else {
            Some(self.indent)
        }
    }
}
