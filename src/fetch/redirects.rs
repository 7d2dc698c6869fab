//! HTTP redirect chain resolution.
//!
//! This module follows redirect chains manually to track the full path
//! from initial URL to final destination.

use reqwest::header::LOCATION;
use reqwest::{Client, Method, Response};
use url::Url;

use crate::config::MAX_REDIRECT_HOPS;
use crate::error_handling::FetchError;

/// Follows the redirect chain for a URL up to `MAX_REDIRECT_HOPS` hops.
///
/// Returns the terminal response, the ordered chain of URLs that answered
/// with a redirect status (one entry per hop), and the final URL. A
/// redirect status without a `Location` header terminates the chain and is
/// returned as-is for the caller to classify. An `https -> http` hop is
/// never followed.
///
/// # Errors
///
/// `FetchError::TooManyRedirects` past the hop limit,
/// `FetchError::SchemeDowngrade` on an https -> http hop,
/// `FetchError::InvalidRedirect` for an unresolvable `Location`, and
/// `FetchError::Transport` for request failures.
pub(crate) async fn resolve_chain(
    client: &Client,
    start_url: &str,
    mut method: Method,
) -> Result<(Response, Vec<String>, Url), FetchError> {
    let mut chain: Vec<String> = Vec::new();
    let mut current = Url::parse(start_url)?;

    loop {
        let resp = client
            .request(method.clone(), current.clone())
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !matches!(status, 301 | 302 | 303 | 307 | 308) {
            return Ok((resp, chain, current));
        }

        let Some(location) = resp.headers().get(LOCATION) else {
            // Redirect status without a target is terminal; the caller
            // records it as broken.
            log::warn!("Redirect status {status} for {current} but no Location header");
            return Ok((resp, chain, current));
        };

        let location = location.to_str().unwrap_or_default();
        let next = current
            .join(location)
            .map_err(|e| FetchError::InvalidRedirect {
                location: location.to_string(),
                reason: e.to_string(),
            })?;

        if current.scheme() == "https" && next.scheme() == "http" {
            return Err(FetchError::SchemeDowngrade {
                from: current.to_string(),
                to: next.to_string(),
            });
        }

        chain.push(current.to_string());
        if chain.len() > MAX_REDIRECT_HOPS {
            return Err(FetchError::TooManyRedirects {
                limit: MAX_REDIRECT_HOPS,
            });
        }

        // 303 explicitly converts the follow-up request to GET
        if status == 303 {
            method = Method::GET;
        }

        log::trace!("redirect {current} -> {next}");
        current = next;
    }
}
