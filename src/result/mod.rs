// src/result/mod.rs

//! Plugin result handling: envelope validation and aggregation.

pub mod aggregate;
pub mod envelope;

pub use aggregate::{AggregateEntry, AggregateResult, Aggregator, MergeOutcome};
pub use envelope::{DataSchema, Envelope, Rejection, validate};

use tracing::{debug, warn};

use crate::exec::ExecutionOutcome;

/// Validate one outcome and merge it on success.
///
/// Rejections are logged and swallowed; they never fail the run.
pub fn collect_outcome(aggregator: &Aggregator, outcome: &ExecutionOutcome) -> Option<MergeOutcome> {
    let plugin = outcome.candidate.name.as_str();
    match validate(outcome) {
        Ok(envelope) => {
            debug!(plugin, name = %envelope.name, version = %envelope.version, "plugin succeeded");
            Some(aggregator.merge(outcome.index, &outcome.candidate.path, envelope))
        }
        Err(Rejection::Cancelled) => {
            warn!(plugin, "plugin cancelled; skipping");
            None
        }
        Err(reason) => {
            warn!(plugin, reason = %reason, "discarding plugin result");
            None
        }
    }
}
