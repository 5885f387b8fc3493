// src/config/mod.rs

//! Run configuration for ctx.
//!
//! Responsibilities:
//! - Define the immutable run configuration (`model.rs`).
//! - Build and validate it from CLI arguments (`validate.rs`).

pub mod model;
pub mod validate;

pub use model::{DEFAULT_TRACING_KEYS, FormatOptions, PLUGIN_PREFIX, RunConfig};
