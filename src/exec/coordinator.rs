// src/exec/coordinator.rs

//! Bounded-concurrency execution of all discovered candidates.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::backend::Launcher;
use super::{ExecutionOutcome, OutcomeStatus};
use crate::discover::Candidate;
use crate::env::ChildEnv;

/// Runs every candidate exactly once behind an admission gate.
///
/// At most `max_parallel` launches are in flight at any time. Each worker
/// waits for either a gate permit or cancellation, then for either the
/// launcher or cancellation. Failures stay local to their candidate.
pub struct Coordinator<L: Launcher> {
    launcher: Arc<L>,
    max_parallel: usize,
}

impl<L: Launcher> Coordinator<L> {
    pub fn new(launcher: L, max_parallel: usize) -> Self {
        Self {
            launcher: Arc::new(launcher),
            max_parallel: max_parallel.max(1),
        }
    }

    /// Run all candidates and return one outcome per candidate, in discovery
    /// order.
    ///
    /// `on_complete` is invoked from each worker as soon as its outcome is
    /// known, so validation and merging overlap with other executions. This
    /// returns only after every worker has finished (the join barrier).
    pub async fn run<F>(
        &self,
        candidates: Vec<Candidate>,
        env: Arc<ChildEnv>,
        cancel: CancellationToken,
        on_complete: F,
    ) -> Vec<ExecutionOutcome>
    where
        F: Fn(&ExecutionOutcome) + Send + Sync + 'static,
    {
        let total = candidates.len();
        let gate = Arc::new(Semaphore::new(self.max_parallel));
        let on_complete = Arc::new(on_complete);
        let mut workers = JoinSet::new();

        debug!(total, max_parallel = self.max_parallel, "executing plugins");

        for (index, candidate) in candidates.into_iter().enumerate() {
            let launcher = Arc::clone(&self.launcher);
            let gate = Arc::clone(&gate);
            let env = Arc::clone(&env);
            let cancel = cancel.clone();
            let on_complete = Arc::clone(&on_complete);

            workers.spawn(async move {
                let outcome = run_one(launcher.as_ref(), candidate, index, &env, gate, cancel).await;
                on_complete(&outcome);
                outcome
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => error!(error = %err, "plugin worker panicked"),
            }
        }
        outcomes.sort_by_key(|o| o.index);
        outcomes
    }
}

async fn run_one<L: Launcher>(
    launcher: &L,
    candidate: Candidate,
    index: usize,
    env: &ChildEnv,
    gate: Arc<Semaphore>,
    cancel: CancellationToken,
) -> ExecutionOutcome {
    let permit = tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        permit = gate.acquire_owned() => permit.ok(),
    };

    let started = Instant::now();
    let status = match permit {
        Some(_permit) if !cancel.is_cancelled() => {
            launcher.launch(&candidate, env, cancel.clone()).await
        }
        _ => {
            debug!(plugin = %candidate.name, "cancelled before admission");
            OutcomeStatus::Cancelled
        }
    };

    let duration = started.elapsed();
    debug!(
        plugin = %candidate.name,
        elapsed_ms = duration.as_millis() as u64,
        success = matches!(status, OutcomeStatus::Success { .. }),
        "plugin finished"
    );

    ExecutionOutcome {
        candidate,
        index,
        status,
        duration,
    }
}

/// Cancel `token` once `timeout` has elapsed.
///
/// Returns `None` when no deadline is configured. Dropping the returned
/// handle does not disarm the timer; abort it if the run finishes first.
pub fn arm_deadline(
    token: &CancellationToken,
    timeout: Option<Duration>,
) -> Option<tokio::task::JoinHandle<()>> {
    let timeout = timeout.filter(|d| !d.is_zero())?;
    let token = token.clone();
    Some(tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "plugin deadline reached; cancelling outstanding plugins");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    }))
}
