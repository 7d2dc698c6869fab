//! One-shot URL fetching.
//!
//! The fetcher performs a single HTTP check: it resolves the redirect
//! chain manually (so every intermediate hop is captured), applies the
//! HEAD-first policy for terminal URLs, retries transient transport
//! failures with exponential backoff, and enforces the per-URL total
//! timeout.

mod redirects;

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use url::Url;

use crate::config::MAX_RESPONSE_BODY_SIZE;
use crate::error_handling::{get_retry_strategy, FetchError, InfoType, ProcessingStats};

/// Request method policy for a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPolicy {
    /// Plain GET; the body is retained for link extraction. Used for
    /// internal pages.
    Get,
    /// HEAD first, with one GET retry if the server rejects HEAD with
    /// 405/501. Used for external URLs and assets, which are terminal.
    HeadThenGet,
}

/// The observable result of one fetch.
#[derive(Debug)]
pub struct FetchOutcome {
    /// Terminal HTTP status code.
    pub status: u16,
    /// Final URL after following redirects.
    pub final_url: String,
    /// URLs that answered with a redirect status, in order (one per hop).
    pub redirect_chain: Vec<String>,
    /// Content-Type of the terminal response, if present.
    pub content_type: Option<String>,
    /// Response body, retained only for successful GET fetches of HTML.
    pub body: Option<String>,
    /// Wall-clock time for the whole fetch.
    pub elapsed: Duration,
}

/// Performs HTTP checks. Cheap to share behind an `Arc` via the context.
pub struct Fetcher {
    client: Arc<reqwest::Client>,
    total_timeout: Duration,
    stats: Arc<ProcessingStats>,
}

impl Fetcher {
    pub fn new(
        client: Arc<reqwest::Client>,
        total_timeout: Duration,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        Fetcher {
            client,
            total_timeout,
            stats,
        }
    }

    /// Fetches a URL under the given policy.
    ///
    /// The whole operation (all redirect hops, retries, and the body read)
    /// is bounded by the configured total timeout.
    ///
    /// # Errors
    ///
    /// Each failure mode is distinguishable through the `FetchError`
    /// variant: transport failures (DNS, connect, TLS, timeout), redirect
    /// loops, scheme downgrades, and the overall deadline.
    pub async fn fetch(&self, url: &str, policy: FetchPolicy) -> Result<FetchOutcome, FetchError> {
        let started = Instant::now();
        match tokio::time::timeout(self.total_timeout, self.fetch_with_retry(url, policy)).await {
            Ok(Ok(mut outcome)) => {
                outcome.elapsed = started.elapsed();
                Ok(outcome)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(FetchError::DeadlineExceeded(self.total_timeout)),
        }
    }

    /// Retries transient transport failures (connect errors, timeouts)
    /// with the shared exponential-backoff strategy.
    async fn fetch_with_retry(
        &self,
        url: &str,
        policy: FetchPolicy,
    ) -> Result<FetchOutcome, FetchError> {
        let mut delays = get_retry_strategy();
        loop {
            match self.fetch_once(url, policy).await {
                Ok(outcome) => return Ok(outcome),
                Err(err) => {
                    if err.is_transient() {
                        if let Some(delay) = delays.next() {
                            log::debug!("Transient failure for {url}, retrying in {delay:?}: {err}");
                            tokio::time::sleep(delay).await;
                            continue;
                        }
                    }
                    return Err(err);
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str, policy: FetchPolicy) -> Result<FetchOutcome, FetchError> {
        let initial_method = match policy {
            FetchPolicy::Get => Method::GET,
            FetchPolicy::HeadThenGet => Method::HEAD,
        };

        let (resp, chain, final_url) =
            redirects::resolve_chain(&self.client, url, initial_method).await?;

        if policy == FetchPolicy::HeadThenGet && matches!(resp.status().as_u16(), 405 | 501) {
            // Server rejects HEAD; one retry with GET before giving up.
            self.stats.increment_info(InfoType::HeadFallback);
            log::debug!(
                "HEAD rejected with {} for {url}, retrying with GET",
                resp.status()
            );
            let (resp, chain, final_url) =
                redirects::resolve_chain(&self.client, url, Method::GET).await?;
            return self.finish(resp, chain, &final_url, false).await;
        }

        self.finish(resp, chain, &final_url, policy == FetchPolicy::Get)
            .await
    }

    async fn finish(
        &self,
        resp: reqwest::Response,
        redirect_chain: Vec<String>,
        final_url: &Url,
        read_body: bool,
    ) -> Result<FetchOutcome, FetchError> {
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = if read_body && resp.status().is_success() && is_htmlish(content_type.as_deref())
        {
            let bytes = resp.bytes().await?;
            let capped = &bytes[..bytes.len().min(MAX_RESPONSE_BODY_SIZE)];
            Some(String::from_utf8_lossy(capped).into_owned())
        } else {
            None
        };

        Ok(FetchOutcome {
            status,
            final_url: final_url.to_string(),
            redirect_chain,
            content_type,
            body,
            elapsed: Duration::ZERO,
        })
    }
}

/// Whether a Content-Type is worth parsing as HTML. A missing header is
/// treated as HTML; only clearly non-HTML types are rejected.
pub fn is_htmlish(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(ct) => {
            let ct = ct.to_ascii_lowercase();
            ct.contains("text/html") || ct.contains("application/xhtml")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};

    fn test_fetcher() -> Fetcher {
        let client = Arc::new(
            reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .timeout(Duration::from_secs(5))
                .build()
                .expect("Failed to create HTTP client"),
        );
        Fetcher::new(
            client,
            Duration::from_secs(10),
            Arc::new(ProcessingStats::new()),
        )
    }

    #[test]
    fn test_is_htmlish() {
        assert!(is_htmlish(None));
        assert!(is_htmlish(Some("text/html; charset=utf-8")));
        assert!(is_htmlish(Some("application/xhtml+xml")));
        assert!(!is_htmlish(Some("application/json")));
        assert!(!is_htmlish(Some("image/png")));
        assert!(!is_htmlish(Some("text/css")));
    }

    #[tokio::test]
    async fn test_fetch_get_retains_html_body() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/page")).respond_with(
                status_code(200)
                    .insert_header("Content-Type", "text/html")
                    .body("<html><a href=\"/next\">next</a></html>"),
            ),
        );

        let fetcher = test_fetcher();
        let outcome = fetcher
            .fetch(&server.url_str("/page"), FetchPolicy::Get)
            .await
            .expect("fetch should succeed");

        assert_eq!(outcome.status, 200);
        assert!(outcome.redirect_chain.is_empty());
        assert!(outcome
            .body
            .as_deref()
            .is_some_and(|b| b.contains("/next")));
    }

    #[tokio::test]
    async fn test_fetch_head_has_no_body() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/asset"))
                .respond_with(status_code(200).insert_header("Content-Type", "image/png")),
        );

        let fetcher = test_fetcher();
        let outcome = fetcher
            .fetch(&server.url_str("/asset"), FetchPolicy::HeadThenGet)
            .await
            .expect("fetch should succeed");

        assert_eq!(outcome.status, 200);
        assert!(outcome.body.is_none());
    }

    #[tokio::test]
    async fn test_fetch_follows_redirect_and_records_chain() {
        let server = Server::run();
        let final_url = server.url_str("/final");
        server.expect(
            Expectation::matching(request::method_path("GET", "/start")).respond_with(
                status_code(301).insert_header("Location", final_url.as_str()),
            ),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/final")).respond_with(
                status_code(200)
                    .insert_header("Content-Type", "text/html")
                    .body("<html></html>"),
            ),
        );

        let fetcher = test_fetcher();
        let outcome = fetcher
            .fetch(&server.url_str("/start"), FetchPolicy::Get)
            .await
            .expect("fetch should succeed");

        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.redirect_chain.len(), 1);
        assert!(outcome.redirect_chain[0].ends_with("/start"));
        assert!(outcome.final_url.ends_with("/final"));
    }

    #[tokio::test]
    async fn test_fetch_head_falls_back_to_get_on_405() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/no-head"))
                .respond_with(status_code(405)),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/no-head"))
                .respond_with(status_code(200)),
        );

        let fetcher = test_fetcher();
        let outcome = fetcher
            .fetch(&server.url_str("/no-head"), FetchPolicy::HeadThenGet)
            .await
            .expect("fetch should succeed");

        assert_eq!(outcome.status, 200);
        assert_eq!(fetcher.stats.get_info_count(InfoType::HeadFallback), 1);
    }

    #[tokio::test]
    async fn test_fetch_reports_405_when_get_also_rejected() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("HEAD", "/never"))
                .respond_with(status_code(405)),
        );
        server.expect(
            Expectation::matching(request::method_path("GET", "/never"))
                .respond_with(status_code(405)),
        );

        let fetcher = test_fetcher();
        let outcome = fetcher
            .fetch(&server.url_str("/never"), FetchPolicy::HeadThenGet)
            .await
            .expect("fetch itself should not error");

        assert_eq!(outcome.status, 405);
    }

    #[tokio::test]
    async fn test_fetch_errors_on_redirect_loop() {
        let server = Server::run();
        let loop_url = server.url_str("/loop");
        server.expect(
            Expectation::matching(request::method_path("GET", "/loop"))
                .times(1..)
                .respond_with(status_code(302).insert_header("Location", loop_url.as_str())),
        );

        let fetcher = test_fetcher();
        let err = fetcher
            .fetch(&loop_url, FetchPolicy::Get)
            .await
            .expect_err("redirect loop should error");

        assert!(matches!(err, FetchError::TooManyRedirects { .. }));
    }

    #[tokio::test]
    async fn test_fetch_terminal_redirect_without_location() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/dangling"))
                .respond_with(status_code(302)),
        );

        let fetcher = test_fetcher();
        let outcome = fetcher
            .fetch(&server.url_str("/dangling"), FetchPolicy::Get)
            .await
            .expect("terminal 3xx is an outcome, not an error");

        assert_eq!(outcome.status, 302);
        assert!(outcome.redirect_chain.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_passes_through_error_statuses() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/missing"))
                .respond_with(status_code(404)),
        );

        let fetcher = test_fetcher();
        let outcome = fetcher
            .fetch(&server.url_str("/missing"), FetchPolicy::Get)
            .await
            .expect("HTTP errors are outcomes, not fetch errors");

        assert_eq!(outcome.status, 404);
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        // Port 1 is essentially guaranteed closed
        let client = Arc::new(
            reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .timeout(Duration::from_millis(200))
                .build()
                .expect("Failed to create HTTP client"),
        );
        let fetcher = Fetcher::new(
            client,
            Duration::from_secs(5),
            Arc::new(ProcessingStats::new()),
        );

        let err = fetcher
            .fetch("http://127.0.0.1:1/", FetchPolicy::Get)
            .await
            .expect_err("connection refused should error");

        assert!(matches!(err, FetchError::Transport(_)));
    }
}
