// src/result/aggregate.rs

//! Shared sink for validated envelopes.
//!
//! Writers hold the lock only for a single insert. Once every worker has
//! joined, [`Aggregator::freeze`] hands out an immutable [`AggregateResult`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};
use tracing::warn;

use super::envelope::Envelope;

/// One aggregated plugin result.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateEntry {
    pub version: String,
    pub data: Value,
    /// Executable that produced this entry.
    pub source: PathBuf,
    /// Discovery position of [`Self::source`]; decides name collisions.
    pub rank: usize,
}

/// What happened to an envelope offered to the aggregator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    Inserted,
    /// Replaced an entry from a plugin earlier in discovery order.
    Replaced { previous: PathBuf },
    /// Dropped because a plugin later in discovery order already owns the name.
    Ignored { kept: PathBuf },
}

/// Concurrent-safe collector of plugin results keyed by envelope name.
///
/// Name collisions are resolved by discovery order, not completion order:
/// the plugin discovered last wins, whichever process finished first.
#[derive(Debug, Default)]
pub struct Aggregator {
    entries: Mutex<BTreeMap<String, AggregateEntry>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&self, rank: usize, source: &Path, envelope: Envelope) -> MergeOutcome {
        let Envelope { name, version, data, .. } = envelope;
        let entry = AggregateEntry {
            version,
            data,
            source: source.to_path_buf(),
            rank,
        };

        let mut entries = self.lock();
        match entries.get(&name) {
            None => {
                entries.insert(name, entry);
                MergeOutcome::Inserted
            }
            Some(existing) if existing.rank < rank => {
                let previous = existing.source.clone();
                warn!(
                    plugin = %name,
                    path = ?source,
                    previous = ?previous,
                    "duplicate plugin name; overwriting result from earlier plugin"
                );
                entries.insert(name, entry);
                MergeOutcome::Replaced { previous }
            }
            Some(existing) => {
                let kept = existing.source.clone();
                warn!(
                    plugin = %name,
                    path = ?source,
                    kept = ?kept,
                    "duplicate plugin name; keeping result from later plugin"
                );
                MergeOutcome::Ignored { kept }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freeze the collected entries.
    ///
    /// Call after the join barrier. If other handles are somehow still alive
    /// the current contents are copied out.
    pub fn freeze(self: Arc<Self>) -> AggregateResult {
        let entries = match Arc::try_unwrap(self) {
            Ok(agg) => agg.entries.into_inner().unwrap_or_else(PoisonError::into_inner),
            Err(shared) => {
                let copy = shared.lock().clone();
                copy
            }
        };
        AggregateResult { entries }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, AggregateEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read-only aggregate, sorted by plugin name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateResult {
    entries: BTreeMap<String, AggregateEntry>,
}

impl AggregateResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&AggregateEntry> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregateEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The aggregate as `{ name: data }`.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.data.clone()))
            .collect();
        Value::Object(map)
    }
}

impl FromIterator<(String, AggregateEntry)> for AggregateResult {
    fn from_iter<I: IntoIterator<Item = (String, AggregateEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
