//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument
//! parsing and configuration.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_DEPTH, DEFAULT_SLOW_THRESHOLD_MS, DEFAULT_TIMEOUT_SECS,
    DEFAULT_USER_AGENT,
};

/// Logging level for the application.
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Report output format.
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Category counts plus a grouped list of non-ok URLs
    Human,
    /// The full report as a JSON object
    Json,
}

/// Configuration for a link check run.
///
/// Doubles as the CLI surface (via `clap`) and the library configuration.
/// For programmatic use construct it with `Config::default()` and override
/// fields:
///
/// ```no_run
/// use link_status::Config;
///
/// let config = Config {
///     seed: "https://example.com".to_string(),
///     max_depth: 2,
///     concurrency: 4,
///     ..Default::default()
/// };
/// ```
#[derive(Parser, Debug, Clone)]
#[command(
    name = "link_status",
    version,
    about = "Crawl a website and verify that every internal page and external reference resolves"
)]
pub struct Config {
    /// Seed URL; its host defines which links count as internal
    pub seed: String,

    /// Maximum internal link depth to follow (the seed is depth 0)
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: u32,

    /// Number of in-flight fetches
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Per-URL total timeout in seconds
    #[arg(long = "timeout", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Elapsed milliseconds above which an OK response is reported as slow
    #[arg(long = "slow-ms", default_value_t = DEFAULT_SLOW_THRESHOLD_MS)]
    pub slow_threshold_ms: u64,

    /// Minimum milliseconds between fetches to the same host (0 disables pacing)
    #[arg(long = "per-host-rate-ms", default_value_t = 0)]
    pub per_host_rate_ms: u64,

    /// Only check URLs containing one of these substrings (repeatable)
    #[arg(long = "include", value_name = "PATTERN")]
    pub include_patterns: Vec<String>,

    /// Skip URLs containing one of these substrings (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    pub exclude_patterns: Vec<String>,

    /// Additional hosts treated as internal, e.g. a www alias (repeatable)
    #[arg(long = "alias", value_name = "HOST")]
    pub alias_hosts: Vec<String>,

    /// Report format
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Write the report to this path instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, value_enum, default_value = "plain")]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: String::new(),
            max_depth: DEFAULT_MAX_DEPTH,
            concurrency: DEFAULT_CONCURRENCY,
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
            per_host_rate_ms: 0,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            alias_hosts: Vec::new(),
            format: OutputFormat::Human,
            output: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}
