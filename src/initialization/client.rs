//! HTTP client initialization.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::ClientBuilder;

use crate::config::{Config, ACCEPT_HEADER, ACCEPT_LANGUAGE_HEADER};
use crate::error_handling::InitializationError;

/// Initializes the shared HTTP client.
///
/// Redirects are disabled so the fetcher can follow chains manually and
/// capture every intermediate hop. The client carries a stable User-Agent
/// and browser-like Accept headers; some origins serve different content
/// (or block outright) without them.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &Config) -> Result<Arc<reqwest::Client>, InitializationError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE_HEADER),
    );

    let client = ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .default_headers(headers)
        .build()?;
    Ok(Arc::new(client))
}
