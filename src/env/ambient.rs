// src/env/ambient.rs

use std::ffi::{OsStr, OsString};

/// Snapshot of the orchestrator's inherited environment.
///
/// Captured once at startup; every component reads from this instead of the
/// live process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbientEnv {
    vars: Vec<(OsString, OsString)>,
}

impl AmbientEnv {
    /// Capture the current process environment, in the order the OS reports it.
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars_os().collect(),
        }
    }

    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<OsString>,
        V: Into<OsString>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get_os(&self, key: &str) -> Option<&OsStr> {
        self.vars
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }

    /// Value of `key` if set, valid UTF-8 and non-empty.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_os(key)
            .and_then(OsStr::to_str)
            .filter(|v| !v.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }
}
