//! Configuration constants.
//!
//! This module defines all configuration constants used throughout the
//! application, including timeouts, size limits, and operational defaults.

use std::time::Duration;

// Crawl defaults (overridable from the CLI)
/// Default maximum internal link depth to follow from the seed
pub const DEFAULT_MAX_DEPTH: u32 = 5;
/// Default number of concurrent worker tasks
pub const DEFAULT_CONCURRENCY: usize = 8;
/// Default per-URL total timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Default elapsed-time threshold above which an OK response is reported as slow
pub const DEFAULT_SLOW_THRESHOLD_MS: u64 = 2000;

/// Default User-Agent string for HTTP requests.
///
/// A stable identity so target servers can rate-limit predictably. Users
/// can override this via the `--user-agent` CLI flag.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; link-status/0.1; +https://ethicic.com/robots.txt)";

// Browser-like request headers. Some origins serve different content (or
// block) requests without them.
/// Accept header sent with every request
pub const ACCEPT_HEADER: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
/// Accept-Language header sent with every request
pub const ACCEPT_LANGUAGE_HEADER: &str = "en-US,en;q=0.5";

// Redirect handling
/// Maximum number of redirect hops to follow
/// Prevents infinite redirect loops and excessive request chains
pub const MAX_REDIRECT_HOPS: usize = 10;

// Response and URL size limits
/// Maximum response body size in bytes (2MB)
/// Bodies larger than this are truncated before link extraction
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;
/// Maximum URL length (2048 characters), matching common browser and server limits
pub const MAX_URL_LENGTH: usize = 2048;
/// Maximum stored link-context length in characters (anchor text etc.)
pub const MAX_CONTEXT_LENGTH: usize = 100;

// Retry strategy for transient transport failures
/// Initial delay in milliseconds before first retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 15;
/// Maximum number of retries after the initial attempt
pub const RETRY_MAX_ATTEMPTS: usize = 2;

// Worker scheduling
/// How long an idle worker naps before re-polling the frontier
pub const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(20);
/// Upper bound on the nap taken after re-queueing a rate-limited URL
pub const PACING_NAP: Duration = Duration::from_millis(50);

/// Progress logging interval in seconds
pub const LOGGING_INTERVAL_SECS: u64 = 5;
