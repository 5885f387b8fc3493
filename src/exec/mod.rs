// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`backend`] provides the `Launcher` trait the coordinator runs plugins
//!   through, and which tests replace with fakes.
//! - [`process`] is the production launcher built on `tokio::process`.
//! - [`coordinator`] runs every candidate behind a bounded admission gate
//!   with one shared cancellation token.

use std::time::Duration;

use crate::discover::Candidate;

pub mod backend;
pub mod coordinator;
pub mod process;

pub use backend::Launcher;
pub use coordinator::{Coordinator, arm_deadline};
pub use process::ProcessLauncher;

/// How a single plugin run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Exit code 0; stdout is kept for validation.
    Success { stdout: Vec<u8> },
    /// Non-zero exit or killed by a signal (`exit_code` is `None` then).
    Failed {
        exit_code: Option<i32>,
        stderr: String,
    },
    /// The process could not be started or waited on.
    SpawnError(String),
    /// The shared deadline fired (or Ctrl-C) before the plugin finished.
    Cancelled,
}

/// Result of running one candidate. Exactly one per candidate.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub candidate: Candidate,
    /// Position in discovery order.
    pub index: usize,
    pub status: OutcomeStatus,
    /// Wall-clock time from admission to completion.
    pub duration: Duration,
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Success { .. })
    }
}
