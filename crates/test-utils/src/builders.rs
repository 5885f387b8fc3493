#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use ctx::cli::OutputFormat;
use ctx::config::RunConfig;
use ctx::discover::Candidate;
use serde_json::{Value, json};

/// Builder for `RunConfig` to simplify test setup.
pub struct RunConfigBuilder {
    config: RunConfig,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RunConfig::default(),
        }
    }

    pub fn parallel(mut self, n: usize) -> Self {
        self.config.max_parallel = n;
        self
    }

    pub fn timeout(mut self, d: Duration) -> Self {
        self.config.plugin_timeout = Some(d);
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = Some(dir.into());
        self
    }

    pub fn output_token_budget(mut self, n: u64) -> Self {
        self.config.output_token_budget = n;
        self
    }

    pub fn allowed_tool(mut self, tool: &str) -> Self {
        self.config.allowed_tools.push(tool.to_string());
        self
    }

    pub fn show_source(mut self, val: bool) -> Self {
        self.config.show_source = val;
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format.format = format;
        self
    }

    pub fn summary(mut self, val: bool) -> Self {
        self.config.format.summary = val;
        self
    }

    pub fn indent(mut self, n: usize) -> Self {
        self.config.format.indent = n;
        self
    }

    pub fn build(self) -> RunConfig {
        self.config
    }
}

impl Default for RunConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A candidate living in `/plugins`, e.g. `candidate("ctx-git")`.
pub fn candidate(file_name: &str) -> Candidate {
    Candidate {
        path: PathBuf::from("/plugins").join(file_name),
        name: file_name.to_string(),
        executable: true,
    }
}

/// Stdout of a well-behaved plugin.
pub fn envelope_json(name: &str, version: &str, data: Value) -> Vec<u8> {
    json!({ "name": name, "version": version, "data": data })
        .to_string()
        .into_bytes()
}
