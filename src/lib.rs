//! link_status library: crawl a website and verify link integrity.
//!
//! Starting from a seed URL, the checker visits every reachable internal
//! page, verifies every referenced external resource, and aggregates the
//! outcomes into a structured report (ok, redirect, broken, slow, warning,
//! skipped).
//!
//! # Example
//!
//! ```no_run
//! use link_status::{run_check, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     seed: "https://ethicic.com".to_string(),
//!     max_depth: 3,
//!     concurrency: 8,
//!     ..Default::default()
//! };
//!
//! let report = run_check(config).await?;
//! println!(
//!     "{} URLs checked, {} broken",
//!     report.total_urls(),
//!     report.count(link_status::Category::Broken)
//! );
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your
//! application or call library functions from within an async context.

#![warn(missing_docs)]

mod app;
mod checker;
pub mod config;
mod error_handling;
mod extract;
mod fetch;
mod frontier;
pub mod initialization;
mod models;
pub mod report;

// Re-export public API
pub use app::url::normalize;
pub use config::{Config, LogFormat, LogLevel, OutputFormat};
pub use report::{write_report, Category, CheckResult, Report};
pub use run::{run_check, run_with_cancellation};

// Internal run module (contains the main crawl orchestration)
mod run {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use anyhow::{Context, Result};
    use chrono::Utc;
    use log::info;
    use tokio_util::sync::CancellationToken;

    use crate::app::url::normalize_parsed;
    use crate::app::{
        log_progress, print_error_statistics, shutdown_gracefully, validate_seed,
    };
    use crate::checker::{self, CheckContext};
    use crate::config::{Config, LOGGING_INTERVAL_SECS};
    use crate::error_handling::ProcessingStats;
    use crate::initialization::init_client;
    use crate::models::UrlRecord;
    use crate::report::{Category, CheckResult, Report};

    /// Runs a link check with the provided configuration.
    ///
    /// This is the main entry point for the library. It crawls from the
    /// configured seed, checks every discovered URL exactly once, and
    /// returns the aggregated report. A Ctrl-C interrupt triggers a
    /// graceful shutdown: in-flight fetches finish, unvisited URLs are
    /// reported as skipped, and a partial report is returned.
    ///
    /// # Errors
    ///
    /// Returns an error only for configuration problems: an invalid seed
    /// URL, an unreachable seed, or failing resource initialization.
    /// Per-URL failures never abort the run; they become broken results.
    pub async fn run_check(config: Config) -> Result<Report> {
        let cancel = CancellationToken::new();
        let signal_cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                log::warn!("Interrupt received; finishing in-flight fetches");
                signal_cancel.cancel();
            }
        });
        run_with_cancellation(config, cancel).await
    }

    /// Like [`run_check`], but driven by a caller-supplied cancellation
    /// token instead of Ctrl-C. Cancelling the token stops the crawl
    /// gracefully; whatever is still queued is reported as skipped.
    pub async fn run_with_cancellation(
        config: Config,
        cancel: CancellationToken,
    ) -> Result<Report> {
        let seed = validate_seed(&config.seed)?;
        let seed_url = normalize_parsed(&seed);

        let started_at = Utc::now();
        let start = Instant::now();

        let stats = Arc::new(ProcessingStats::new());
        let client = init_client(&config).context("Failed to initialize HTTP client")?;
        let ctx = Arc::new(CheckContext::new(
            client,
            &config,
            &seed,
            Arc::clone(&stats),
            cancel.clone(),
        ));

        info!(
            "Starting link check for {} (max depth {}, concurrency {})",
            seed_url, config.max_depth, config.concurrency
        );

        // The seed is checked before the pool starts: an unreachable seed
        // aborts the run, and its links are enqueued only after its own
        // result is recorded.
        checker::check_seed(&ctx, UrlRecord::seed(seed_url.clone())).await?;

        let log_cancel = CancellationToken::new();
        let logging_token = log_cancel.child_token();
        let logging_ctx = Arc::clone(&ctx);
        let logging_task = tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(LOGGING_INTERVAL_SECS));
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        log_progress(start, logging_ctx.results_len(), logging_ctx.frontier.len());
                    }
                    _ = logging_token.cancelled() => {
                        break;
                    }
                }
            }
        });

        let workers: Vec<_> = (0..config.concurrency.max(1))
            .map(|_| tokio::spawn(checker::worker(Arc::clone(&ctx))))
            .collect();

        for outcome in futures::future::join_all(workers).await {
            if let Err(join_error) = outcome {
                log::warn!("Worker task panicked: {join_error:?}");
            }
        }

        shutdown_gracefully(log_cancel, Some(logging_task)).await;

        // Whatever is still queued after cancellation is reported, not
        // silently lost.
        for record in ctx.frontier.drain() {
            ctx.record_result(CheckResult {
                url: record.url,
                category: Category::Skipped,
                status: None,
                final_url: None,
                elapsed_ms: None,
                redirect_chain: Vec::new(),
                referrer: record.referrer,
                context: record.context,
                error: Some("cancelled before fetch".to_string()),
            });
        }

        print_error_statistics(&stats);

        let report = Report::new(seed_url, started_at, Utc::now(), ctx.take_results());
        info!(
            "Checked {} URLs in {:.1}s ({} broken, {} warnings, {} skipped)",
            report.total_urls(),
            report.elapsed_seconds(),
            report.count(Category::Broken),
            report.count(Category::Warning),
            report.count(Category::Skipped),
        );

        Ok(report)
    }
}
