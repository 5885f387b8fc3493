// src/exec/backend.rs

//! Pluggable launcher abstraction.
//!
//! The coordinator talks to a `Launcher` instead of spawning processes
//! directly. Production uses [`super::ProcessLauncher`]; tests can provide
//! launchers that sleep, fail or emit canned output without touching the OS.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use super::OutcomeStatus;
use crate::discover::Candidate;
use crate::env::ChildEnv;

/// Trait abstracting how one candidate is executed.
pub trait Launcher: Send + Sync + 'static {
    /// Run `candidate` with `env` until it exits or `cancel` fires.
    ///
    /// Implementations must return [`OutcomeStatus::Cancelled`] (and stop any
    /// work they started) once the token is cancelled.
    fn launch<'a>(
        &'a self,
        candidate: &'a Candidate,
        env: &'a ChildEnv,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = OutcomeStatus> + Send + 'a>>;
}
