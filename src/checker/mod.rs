//! The crawl orchestrator.
//!
//! A fixed pool of worker tasks pulls URLs from the frontier, fetches
//! them, records one result per URL, and feeds links extracted from
//! internal pages back into the frontier. The frontier and the result map
//! are the only shared mutable state; their locks are never held across
//! I/O.

mod pacing;

pub(crate) use pacing::HostPacer;

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::app::url::host_key;
use crate::config::{Config, IDLE_POLL_INTERVAL, PACING_NAP};
use crate::error_handling::{
    categorize_fetch_error, categorize_status, ErrorType, FetchError, InfoType, ProcessingStats,
    WarningType,
};
use crate::extract::{Extractor, Link};
use crate::fetch::{FetchOutcome, FetchPolicy, Fetcher};
use crate::frontier::Frontier;
use crate::models::{UrlClass, UrlRecord};
use crate::report::{Category, CheckResult};

/// Shared state and resources for one crawl run.
pub(crate) struct CheckContext {
    pub(crate) fetcher: Fetcher,
    pub(crate) extractor: Extractor,
    pub(crate) frontier: Frontier,
    pub(crate) stats: Arc<ProcessingStats>,
    pub(crate) cancel: CancellationToken,
    results: Mutex<BTreeMap<String, CheckResult>>,
    active: AtomicUsize,
    pacer: HostPacer,
    max_depth: u32,
    slow_threshold: Duration,
    include_patterns: Vec<String>,
    exclude_patterns: Vec<String>,
}

impl CheckContext {
    pub(crate) fn new(
        client: Arc<reqwest::Client>,
        config: &Config,
        seed: &Url,
        stats: Arc<ProcessingStats>,
        cancel: CancellationToken,
    ) -> Self {
        CheckContext {
            fetcher: Fetcher::new(
                client,
                Duration::from_secs(config.timeout_seconds),
                Arc::clone(&stats),
            ),
            extractor: Extractor::new(seed, &config.alias_hosts),
            frontier: Frontier::new(),
            stats,
            cancel,
            results: Mutex::new(BTreeMap::new()),
            active: AtomicUsize::new(0),
            pacer: HostPacer::new(Duration::from_millis(config.per_host_rate_ms)),
            max_depth: config.max_depth,
            slow_threshold: Duration::from_millis(config.slow_threshold_ms),
            include_patterns: config.include_patterns.clone(),
            exclude_patterns: config.exclude_patterns.clone(),
        }
    }

    /// Number of results recorded so far.
    pub(crate) fn results_len(&self) -> usize {
        self.lock_results().len()
    }

    /// Drains the result map. Call once, after all workers have stopped.
    pub(crate) fn take_results(&self) -> Vec<CheckResult> {
        let mut results = self.lock_results();
        std::mem::take(&mut *results).into_values().collect()
    }

    /// Records a result, enforcing exactly one result per URL.
    pub(crate) fn record_result(&self, result: CheckResult) {
        let mut results = self.lock_results();
        match results.entry(result.url.clone()) {
            Entry::Vacant(entry) => {
                entry.insert(result);
            }
            Entry::Occupied(_) => {
                log::debug!("Duplicate result for {} dropped", result.url);
            }
        }
    }

    fn lock_results(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, CheckResult>> {
        match self.results.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Whether a URL survives the include/exclude substring filters.
    fn passes_filters(&self, url: &str) -> bool {
        if self
            .exclude_patterns
            .iter()
            .any(|pattern| url.contains(pattern.as_str()))
        {
            return false;
        }
        if !self.include_patterns.is_empty()
            && !self
                .include_patterns
                .iter()
                .any(|pattern| url.contains(pattern.as_str()))
        {
            return false;
        }
        true
    }

    /// Feeds extracted links back into the frontier, applying the depth
    /// cap and URL filters before enqueue.
    fn offer_links(&self, parent: &UrlRecord, links: Vec<Link>) {
        for link in links {
            // Depth bounds internal discovery only; external URLs and
            // assets are terminal and always get checked.
            if link.class == UrlClass::Internal && parent.depth + 1 > self.max_depth {
                log::debug!("Depth cap reached, dropping {}", link.url);
                continue;
            }
            if self.frontier.seen(&link.url) {
                continue;
            }
            if !self.passes_filters(&link.url) {
                if self.frontier.suppress(&link.url) {
                    self.record_result(CheckResult {
                        url: link.url,
                        category: Category::Skipped,
                        status: None,
                        final_url: None,
                        elapsed_ms: None,
                        redirect_chain: Vec::new(),
                        referrer: Some(parent.url.clone()),
                        context: Some(link.context),
                        error: Some("excluded by URL filters".to_string()),
                    });
                }
                continue;
            }

            self.frontier.offer(UrlRecord {
                url: link.url,
                referrer: Some(parent.url.clone()),
                context: Some(link.context),
                class: link.class,
                depth: parent.depth + 1,
            });
        }
    }
}

/// Checks the seed URL before the worker pool starts.
///
/// A transport-level failure here means the seed is unreachable: that is a
/// configuration error and the run aborts. An HTTP error status is a
/// normal (broken) result. Descendant links are only enqueued once the
/// seed's own result has been recorded.
pub(crate) async fn check_seed(ctx: &Arc<CheckContext>, record: UrlRecord) -> Result<()> {
    ctx.frontier.suppress(&record.url);
    // The seed fetch opens the pacing window for its host; it never waits.
    if let Some(host) = Url::parse(&record.url).ok().and_then(|u| host_key(&u)) {
        let _ = ctx.pacer.try_acquire(&host);
    }
    let started = Instant::now();
    match ctx.fetcher.fetch(&record.url, FetchPolicy::Get).await {
        Ok(outcome) => {
            handle_outcome(ctx, record, Ok(outcome), started.elapsed());
            Ok(())
        }
        Err(e) => {
            let url = record.url;
            Err(anyhow::Error::new(e).context(format!("seed URL {url} is unreachable")))
        }
    }
}

/// One worker of the fixed pool.
///
/// Repeatedly takes a URL from the frontier, fetches it, and records its
/// result. Exits when the frontier is empty with no fetch in flight
/// anywhere, or when the run is cancelled (after finishing the in-flight
/// fetch).
pub(crate) async fn worker(ctx: Arc<CheckContext>) {
    loop {
        if ctx.cancel.is_cancelled() {
            break;
        }

        // `active` is raised before the take so that a sibling observing
        // zero can trust that nothing is still processing (and therefore
        // nothing new can be offered).
        ctx.active.fetch_add(1, Ordering::SeqCst);
        let Some(record) = ctx.frontier.take() else {
            let remaining = ctx.active.fetch_sub(1, Ordering::SeqCst) - 1;
            if remaining == 0 && ctx.frontier.is_empty() {
                break;
            }
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
            continue;
        };

        let host = Url::parse(&record.url).ok().and_then(|u| host_key(&u));
        if let Some(host) = host {
            if let Err(wait) = ctx.pacer.try_acquire(&host) {
                ctx.frontier.requeue(record);
                ctx.active.fetch_sub(1, Ordering::SeqCst);
                tokio::time::sleep(wait.min(PACING_NAP)).await;
                continue;
            }
        }

        process_url(&ctx, record).await;
        ctx.active.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn process_url(ctx: &CheckContext, record: UrlRecord) {
    log::debug!(
        "Checking {} ({}, depth {})",
        record.url,
        record.class,
        record.depth
    );

    let policy = match record.class {
        UrlClass::Internal => FetchPolicy::Get,
        UrlClass::External | UrlClass::Asset => FetchPolicy::HeadThenGet,
    };

    let started = Instant::now();
    let outcome = ctx.fetcher.fetch(&record.url, policy).await;
    handle_outcome(ctx, record, outcome, started.elapsed());
}

/// Classifies a fetch outcome, extracts links from internal successes, and
/// records the result.
fn handle_outcome(
    ctx: &CheckContext,
    record: UrlRecord,
    outcome: Result<FetchOutcome, FetchError>,
    elapsed: Duration,
) {
    let (result, body) = classify_outcome(&record, outcome, elapsed, ctx.slow_threshold, &ctx.stats);

    if record.class == UrlClass::Internal {
        if let Some(body) = &body {
            if let Some(final_url) = &result.final_url {
                // Only crawl onward if the page didn't redirect off-site.
                let still_internal = Url::parse(final_url)
                    .map(|u| ctx.extractor.is_internal(&u))
                    .unwrap_or(false);
                if still_internal {
                    let links = ctx.extractor.extract(final_url, body);
                    log::debug!("Extracted {} links from {}", links.len(), record.url);
                    ctx.offer_links(&record, links);
                } else {
                    log::debug!(
                        "Not crawling {}: redirected off-site to {final_url}",
                        record.url
                    );
                }
            }
        }
    }

    ctx.record_result(result);
}

/// Maps a fetch outcome to an outcome category per the classification
/// table, updating statistics counters along the way. Returns the result
/// plus the page body (if one was retained) for link extraction.
fn classify_outcome(
    record: &UrlRecord,
    outcome: Result<FetchOutcome, FetchError>,
    fallback_elapsed: Duration,
    slow_threshold: Duration,
    stats: &ProcessingStats,
) -> (CheckResult, Option<String>) {
    match outcome {
        Ok(outcome) => {
            let status = outcome.status;
            let (category, error) = if (200..300).contains(&status) {
                if !outcome.redirect_chain.is_empty() {
                    stats.increment_info(InfoType::Redirect);
                    if outcome.redirect_chain.len() > 1 {
                        stats.increment_info(InfoType::MultipleRedirects);
                    }
                    if record.url.starts_with("http://") && outcome.final_url.starts_with("https://")
                    {
                        stats.increment_info(InfoType::HttpsUpgrade);
                    }
                    (Category::Redirect, None)
                } else if outcome.elapsed > slow_threshold {
                    (Category::Slow, None)
                } else {
                    (Category::Ok, None)
                }
            } else if (300..400).contains(&status) {
                // The fetcher follows redirects, so a terminal 3xx means
                // the target was never provided.
                stats.increment_error(ErrorType::RedirectWithoutLocation);
                (
                    Category::Broken,
                    Some("redirect without Location header".to_string()),
                )
            } else if matches!(status, 405 | 501) && record.class != UrlClass::Internal {
                // HEAD and the GET fallback were both rejected: the link
                // cannot be verified, which is not the same as broken.
                stats.increment_warning(WarningType::MethodNotAllowed);
                (
                    Category::Warning,
                    Some("method not allowed; link could not be verified".to_string()),
                )
            } else if (500..600).contains(&status) {
                stats.increment_error(categorize_status(status));
                (Category::Broken, Some("server error".to_string()))
            } else if (400..500).contains(&status) {
                stats.increment_error(categorize_status(status));
                (Category::Broken, None)
            } else {
                stats.increment_error(ErrorType::OtherError);
                (Category::Broken, Some(format!("unexpected status {status}")))
            };

            // An internal page that answered 2xx without an HTML body has
            // nothing to extract; worth tracking, not a failure.
            if record.class == UrlClass::Internal
                && (200..300).contains(&status)
                && outcome.body.is_none()
            {
                if let Some(content_type) = &outcome.content_type {
                    log::debug!(
                        "No links extracted from {}: Content-Type '{content_type}'",
                        record.url
                    );
                }
                stats.increment_warning(WarningType::NonHtmlPage);
            }

            let result = CheckResult {
                url: record.url.clone(),
                category,
                status: Some(status),
                final_url: Some(outcome.final_url),
                elapsed_ms: Some(outcome.elapsed.as_millis() as u64),
                redirect_chain: outcome.redirect_chain,
                referrer: record.referrer.clone(),
                context: record.context.clone(),
                error,
            };
            (result, outcome.body)
        }
        Err(err) => {
            stats.increment_error(categorize_fetch_error(&err));
            let result = CheckResult {
                url: record.url.clone(),
                category: Category::Broken,
                status: None,
                final_url: None,
                elapsed_ms: Some(fallback_elapsed.as_millis() as u64),
                redirect_chain: Vec::new(),
                referrer: record.referrer.clone(),
                context: record.context.clone(),
                error: Some(err.to_string()),
            };
            (result, None)
        }
    }
}
