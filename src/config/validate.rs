// src/config/validate.rs

use crate::cli::CliArgs;
use crate::config::model::{FormatOptions, RunConfig};
use crate::errors::{CtxError, Result};

impl TryFrom<&CliArgs> for RunConfig {
    type Error = CtxError;

    fn try_from(args: &CliArgs) -> std::result::Result<Self, Self::Error> {
        validate_args(args)?;

        let allowed_tools = args
            .allowed_tools
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        Ok(RunConfig {
            cache_dir: args.cache_dir.clone().filter(|p| !p.as_os_str().is_empty()),
            output_token_budget: args.output_token_budget,
            thinking_token_budget: args.thinking_token_budget,
            cost_budget_cents: args.cost_budget_cents,
            allowed_tools,
            plugin_timeout: args.plugin_timeout.filter(|d| !d.is_zero()),
            plugin_retries: args.plugin_retries,
            max_parallel: args.parallel,
            show_source: args.show_source,
            format: FormatOptions {
                format: args.output,
                indent: args.indent,
                summary: args.summary,
            },
            ..RunConfig::default()
        })
    }
}

fn validate_args(args: &CliArgs) -> Result<()> {
    if args.parallel == 0 {
        return Err(CtxError::Config(
            "--parallel must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
