// src/plugin.rs

//! `ctx --plugin`: behave like a `ctx-*` plugin.
//!
//! Reports the `CTX_*` variables it was started with, which makes it handy
//! for checking what a nested run passes down.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::env::AmbientEnv;
use crate::errors::Result;

/// The contract document printed by `--print-spec`.
pub const PLUGIN_SPEC: &str = include_str!("../docs/PLUGIN_SPEC.md");

#[derive(Debug, Serialize)]
struct SelfEnvelope<'a> {
    name: &'a str,
    version: &'a str,
    data: Value,
}

/// Render this tool's own plugin envelope as a single JSON line.
pub fn self_envelope(ambient: &AmbientEnv) -> Result<String> {
    let environment: Map<String, Value> = ambient
        .iter()
        .filter_map(|(k, v)| Some((k.to_str()?, v.to_str()?)))
        .filter(|(k, _)| k.starts_with("CTX_"))
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect();

    let envelope = SelfEnvelope {
        name: "ctx",
        version: env!("CARGO_PKG_VERSION"),
        data: json!({
            "environment": environment,
            "description": "Core ctx metadata",
        }),
    };

    let mut line = serde_json::to_string(&envelope)?;
    line.push('\n');
    Ok(line)
}
