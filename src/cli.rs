// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{Parser, ValueEnum};

/// Command-line arguments for `ctx`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ctx",
    version,
    about = "Gather context by running every ctx-* plugin found in PATH.",
    long_about = None
)]
pub struct CliArgs {
    /// Output format.
    #[arg(long, value_enum, value_name = "FORMAT", default_value = "yaml", ignore_case = true)]
    pub output: OutputFormat,

    /// List discovered plugins and exit.
    #[arg(long)]
    pub list_plugins: bool,

    /// Print the plugin specification to stdout and exit.
    #[arg(long)]
    pub print_spec: bool,

    /// Act as a ctx-* plugin itself and print a plugin envelope.
    #[arg(long)]
    pub plugin: bool,

    /// Base directory for plugin caches (sets CTX_CACHE_DIR).
    ///
    /// Defaults to `$XDG_CACHE_HOME/ctx` or `$HOME/.cache/ctx`.
    #[arg(long, value_name = "PATH")]
    pub cache_dir: Option<PathBuf>,

    /// Estimated output token budget (sets CTX_OUTPUT_TOKEN_BUDGET, 0 means unset).
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub output_token_budget: u64,

    /// Estimated thinking token budget (sets CTX_THINKING_TOKEN_BUDGET, 0 means unset).
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub thinking_token_budget: u64,

    /// Estimated cost budget in USD cents (sets CTX_COST_BUDGET_CENTS, 0 means unset).
    #[arg(long = "cost-budget", value_name = "CENTS", default_value_t = 0)]
    pub cost_budget_cents: u64,

    /// Comma-separated list of external commands plugins may call (sets CTX_ALLOWED_TOOLS).
    #[arg(long, value_name = "TOOLS", value_delimiter = ',')]
    pub allowed_tools: Vec<String>,

    /// Plugin timeout, e.g. `500ms`, `30s`, `1m`. Also the overall run deadline.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub plugin_timeout: Option<Duration>,

    /// Suggested maximum number of retries for plugins (sets CTX_RETRY_MAX, 0 means unset).
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub plugin_retries: u32,

    /// Number of spaces for JSON/XML indentation.
    #[arg(long, value_name = "N", default_value_t = 2)]
    pub indent: usize,

    /// Compact JSON/XML output (overrides --indent).
    #[arg(long)]
    pub summary: bool,

    /// Maximum number of plugins to run in parallel.
    #[arg(short = 'P', long = "parallel", value_name = "N", default_value_t = 1)]
    pub parallel: usize,

    /// Ask plugins to include their source (sets CTX_SHOW_SOURCE=true).
    #[arg(long)]
    pub show_source: bool,

    /// Verbose logging (same as `--log-level debug`).
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CTX_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Output format as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
    Xml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
            OutputFormat::Xml => "xml",
        };
        f.write_str(s)
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse the process arguments.
///
/// `-h`/`--help` print usage to stderr and exit 1, as every `ctx-*` plugin
/// must; `ctx --plugin` makes this binary one of them. Other parse errors and
/// `--version` keep clap's behaviour.
pub fn parse() -> CliArgs {
    match CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) if is_help_request(&err) => {
            eprint!("{}", err.render());
            std::process::exit(1);
        }
        Err(err) => err.exit(),
    }
}

fn is_help_request(err: &clap::Error) -> bool {
    err.kind() == ErrorKind::DisplayHelp
}

/// Parse a duration like `250ms`, `30s`, `5m` or `1h`. A bare `0` means unset.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };
    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", s))
}
