// src/env/composer.rs

//! Builds the environment every plugin process receives.
//!
//! Inherited variables come first, in their original order, minus every key
//! this module manages. Managed variables follow in a fixed order.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::ambient::AmbientEnv;
use super::keys;
use crate::config::RunConfig;

/// The environment shared by every plugin of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEnv {
    session_id: String,
    entries: Vec<(OsString, OsString)>,
}

impl ChildEnv {
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn entries(&self) -> &[(OsString, OsString)] {
        &self.entries
    }

    /// Look up a value by key (last entry wins, as with `Command::envs`).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| v.to_str())
    }

    /// Render as `KEY=value` strings.
    pub fn to_strings(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", k.to_string_lossy(), v.to_string_lossy()))
            .collect()
    }
}

/// Composes [`ChildEnv`] from the run config and the inherited environment.
///
/// Time and session-id minting are injectable so composition is reproducible
/// in tests.
pub struct EnvComposer<'a> {
    config: &'a RunConfig,
    ambient: &'a AmbientEnv,
    now: DateTime<Utc>,
    mint_session: Box<dyn Fn() -> String + 'a>,
}

impl<'a> EnvComposer<'a> {
    pub fn new(config: &'a RunConfig, ambient: &'a AmbientEnv) -> Self {
        Self {
            config,
            ambient,
            now: Utc::now(),
            mint_session: Box::new(new_session_id),
        }
    }

    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn with_session_minter(mut self, mint: impl Fn() -> String + 'a) -> Self {
        self.mint_session = Box::new(mint);
        self
    }

    pub fn compose(&self) -> ChildEnv {
        let managed = self.managed_keys();
        let mut entries: Vec<(OsString, OsString)> = self
            .ambient
            .iter()
            .filter(|(k, _)| k.to_str().is_none_or(|k| !managed.contains(k)))
            .map(|(k, v)| (k.to_os_string(), v.to_os_string()))
            .collect();

        let session_id = self.session_id();
        let mut set = |key: &str, value: OsString| entries.push((OsString::from(key), value));

        set(keys::SESSION, session_id.clone().into());
        set(keys::SHLVL, self.next_level().to_string().into());

        for key in &self.config.tracing_keys {
            if let Some(value) = self.ambient.get_os(key) {
                set(key.as_str(), value.to_os_string());
            }
        }

        if let Some(dir) = self.cache_dir() {
            set(keys::CACHE_DIR, dir.into_os_string());
        }

        for (key, value) in [
            (keys::OUTPUT_TOKEN_BUDGET, self.config.output_token_budget),
            (keys::THINKING_TOKEN_BUDGET, self.config.thinking_token_budget),
            (keys::COST_BUDGET_CENTS, self.config.cost_budget_cents),
        ] {
            if value > 0 {
                set(key, value.to_string().into());
            }
        }

        if !self.config.allowed_tools.is_empty() {
            set(keys::ALLOWED_TOOLS, self.config.allowed_tools.join(",").into());
        }

        if let Some(timeout) = self.config.effective_timeout() {
            set(keys::TIMEOUT_SECONDS, timeout_seconds(timeout).to_string().into());
            set(keys::DEADLINE_TIMESTAMP, self.deadline(timeout).to_string().into());
        }

        if self.config.plugin_retries > 0 {
            set(keys::RETRY_MAX, self.config.plugin_retries.to_string().into());
        }

        if self.config.show_source {
            set(keys::SHOW_SOURCE, "true".into());
        }

        debug!(session_id = %session_id, vars = entries.len(), "composed plugin environment");
        ChildEnv { session_id, entries }
    }

    /// Every key whose inherited value is dropped, whether or not it is re-set.
    fn managed_keys(&self) -> HashSet<&str> {
        keys::MANAGED
            .iter()
            .copied()
            .chain(self.config.tracing_keys.iter().map(String::as_str))
            .collect()
    }

    fn session_id(&self) -> String {
        match self.ambient.get(keys::SESSION) {
            Some(existing) => existing.to_string(),
            None => (self.mint_session)(),
        }
    }

    /// Inherited level plus one. Unparsable or overflowing levels restart at 1.
    fn next_level(&self) -> u64 {
        let raw = self
            .ambient
            .get(keys::SHLVL)
            .or_else(|| self.ambient.get(keys::SHELL_SHLVL));
        raw.and_then(|s| s.trim().parse::<u64>().ok())
            .and_then(|level| level.checked_add(1))
            .unwrap_or(1)
    }

    fn cache_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.config.cache_dir {
            return match std::path::absolute(dir) {
                Ok(abs) => Some(abs),
                Err(err) => {
                    warn!(dir = ?dir, error = %err, "could not make --cache-dir absolute; CTX_CACHE_DIR not set");
                    None
                }
            };
        }

        let base = self
            .ambient
            .get_os("XDG_CACHE_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| self.home_dir().map(|home| home.join(".cache")))?;
        Some(base.join(keys::CACHE_SUBDIR))
    }

    fn home_dir(&self) -> Option<PathBuf> {
        let key = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
        self.ambient
            .get_os(key)
            .filter(|v| !v.is_empty())
            .map(|v| Path::new(v).to_path_buf())
    }

    fn deadline(&self, timeout: Duration) -> i64 {
        chrono::Duration::from_std(timeout)
            .ok()
            .and_then(|delta| self.now.checked_add_signed(delta))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
            .timestamp()
    }
}

/// Whole seconds, rounded up so sub-second timeouts are still advertised.
fn timeout_seconds(timeout: Duration) -> u64 {
    let secs = timeout.as_secs();
    if timeout.subsec_nanos() > 0 { secs + 1 } else { secs }
}

/// Mint a new, time-ordered session identifier.
pub fn new_session_id() -> String {
    format!("ctx_{}", uuid::Uuid::now_v7().simple())
}
