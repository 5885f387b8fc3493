// src/env/mod.rs

//! Plugin environment handling.
//!
//! - [`ambient`] snapshots the environment `ctx` itself was started with.
//! - [`composer`] turns that snapshot plus the run config into the
//!   environment handed to every plugin.

pub mod ambient;
pub mod composer;

pub use ambient::AmbientEnv;
pub use composer::{ChildEnv, EnvComposer, new_session_id};

/// Names of the variables `ctx` sets for plugins.
pub mod keys {
    pub const SESSION: &str = "CTX_SESSION";
    pub const SHLVL: &str = "CTX_SHLVL";
    /// Generic shell nesting counter used as a fallback for [`SHLVL`].
    pub const SHELL_SHLVL: &str = "SHLVL";
    pub const CACHE_DIR: &str = "CTX_CACHE_DIR";
    pub const OUTPUT_TOKEN_BUDGET: &str = "CTX_OUTPUT_TOKEN_BUDGET";
    pub const THINKING_TOKEN_BUDGET: &str = "CTX_THINKING_TOKEN_BUDGET";
    pub const COST_BUDGET_CENTS: &str = "CTX_COST_BUDGET_CENTS";
    pub const ALLOWED_TOOLS: &str = "CTX_ALLOWED_TOOLS";
    pub const TIMEOUT_SECONDS: &str = "CTX_TIMEOUT_SECONDS";
    pub const DEADLINE_TIMESTAMP: &str = "CTX_DEADLINE_TIMESTAMP";
    pub const RETRY_MAX: &str = "CTX_RETRY_MAX";
    pub const SHOW_SOURCE: &str = "CTX_SHOW_SOURCE";

    /// Subdirectory appended to the user cache base.
    pub const CACHE_SUBDIR: &str = "ctx";

    /// Never inherited from the parent, even when `ctx` leaves them unset.
    pub const MANAGED: &[&str] = &[
        SESSION,
        SHLVL,
        SHELL_SHLVL,
        CACHE_DIR,
        OUTPUT_TOKEN_BUDGET,
        THINKING_TOKEN_BUDGET,
        COST_BUDGET_CENTS,
        ALLOWED_TOOLS,
        TIMEOUT_SECONDS,
        DEADLINE_TIMESTAMP,
        RETRY_MAX,
        SHOW_SOURCE,
    ];
}
