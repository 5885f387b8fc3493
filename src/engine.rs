// src/engine.rs

//! One complete gather pass: compose the environment, run every candidate,
//! validate and merge, then freeze the aggregate.

use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::RunConfig;
use crate::discover::Candidate;
use crate::env::{AmbientEnv, ChildEnv, EnvComposer};
use crate::exec::{Coordinator, ExecutionOutcome, Launcher, arm_deadline};
use crate::result::{AggregateResult, Aggregator, collect_outcome};

/// Everything a finished run produced.
#[derive(Debug)]
pub struct RunReport {
    pub env: Arc<ChildEnv>,
    pub aggregate: AggregateResult,
    /// One per candidate, in discovery order.
    pub outcomes: Vec<ExecutionOutcome>,
}

impl RunReport {
    pub fn session_id(&self) -> &str {
        self.env.session_id()
    }
}

/// Run `candidates` through `launcher` and aggregate their results.
///
/// `cancel` is shared by every plugin; it is additionally armed with the
/// configured plugin timeout. Per-plugin failures never surface as errors.
pub async fn gather<L: Launcher>(
    cfg: &RunConfig,
    ambient: &AmbientEnv,
    candidates: Vec<Candidate>,
    launcher: L,
    cancel: CancellationToken,
) -> RunReport {
    let env = Arc::new(EnvComposer::new(cfg, ambient).compose());
    info!(session_id = %env.session_id(), plugins = candidates.len(), "starting run");

    let aggregator = Arc::new(Aggregator::new());
    if candidates.is_empty() {
        debug!("no plugins to execute");
        return RunReport {
            env,
            aggregate: aggregator.freeze(),
            outcomes: Vec::new(),
        };
    }

    let deadline = arm_deadline(&cancel, cfg.effective_timeout());
    let coordinator = Coordinator::new(launcher, cfg.max_parallel);
    let started = Instant::now();

    let sink = Arc::clone(&aggregator);
    let outcomes = coordinator
        .run(candidates, Arc::clone(&env), cancel, move |outcome| {
            collect_outcome(&sink, outcome);
        })
        .await;

    if let Some(timer) = deadline {
        timer.abort();
    }

    let aggregate = aggregator.freeze();
    info!(
        executed = outcomes.len(),
        aggregated = aggregate.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "finished execution"
    );

    RunReport {
        env,
        aggregate,
        outcomes,
    }
}
