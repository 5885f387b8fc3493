// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Only run-level failures live here. Per-plugin problems (spawn errors,
//! non-zero exits, bad envelopes) are logged and dropped where they happen.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CtxError {
    /// The search path variable is unset or empty; there is nothing to scan.
    #[error("PATH environment variable is not set")]
    SearchPathUnset,

    #[error("Configuration error: {0}")]
    Config(String),

    /// The aggregate could not be serialized in the requested format.
    #[error("failed to format output as {format}: {reason}")]
    Format { format: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CtxError>;
