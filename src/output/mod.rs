// src/output/mod.rs

//! Serialization of the final aggregate.
//!
//! Every format ends with exactly one newline.

pub mod json;
pub mod xml;
pub mod yaml;

use crate::cli::OutputFormat;
use crate::config::FormatOptions;
use crate::errors::{CtxError, Result};
use crate::result::AggregateResult;

/// Render `aggregate` in the configured format.
///
/// `session_id` is only used by the XML envelope.
pub fn format_output(
    aggregate: &AggregateResult,
    opts: &FormatOptions,
    session_id: &str,
) -> Result<String> {
    let rendered = match opts.format {
        OutputFormat::Json => json::render(aggregate, opts.effective_indent()),
        OutputFormat::Yaml => yaml::render(aggregate),
        OutputFormat::Xml => xml::render(aggregate, session_id, opts.effective_indent()),
    }
    .map_err(|reason| CtxError::Format {
        format: opts.format.to_string(),
        reason,
    })?;

    Ok(ensure_trailing_newline(rendered))
}

fn ensure_trailing_newline(mut s: String) -> String {
    if !s.ends_with('\n') {
        s.push('\n');
    }
    s
}
