//! URL validation and normalization utilities.

use anyhow::{anyhow, bail, Result};
use url::Url;

use crate::config::MAX_URL_LENGTH;

/// Normalizes a URL string into its canonical form.
///
/// Canonical means: scheme and host lowercased, default ports stripped,
/// fragment removed. Both are properties of the `url` crate's parser and
/// serializer, so normalization is idempotent by construction. Only http
/// and https URLs are accepted; anything else (including URLs over
/// `MAX_URL_LENGTH`) returns `None`.
///
/// Two URLs with equal normalized form are the same unit of work for
/// deduplication purposes.
pub fn normalize(raw: &str) -> Option<String> {
    if raw.len() > MAX_URL_LENGTH {
        return None;
    }
    let mut parsed = Url::parse(raw).ok()?;
    match parsed.scheme() {
        "http" | "https" => {}
        _ => return None,
    }
    parsed.host_str()?;
    parsed.set_fragment(None);
    Some(parsed.to_string())
}

/// Normalizes an already-parsed URL (fragment removed, canonical serialization).
pub fn normalize_parsed(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);
    url.to_string()
}

/// The key used for per-host pacing and internal/external classification:
/// the lowercased host, suffixed with the port only when it is explicitly
/// non-default.
///
/// Default http/https ports collapse to the bare host so that an `http://`
/// link to an `https://` site still counts as the same host, while a
/// staging instance on `:8080` does not.
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    match url.port() {
        Some(port) => Some(format!("{host}:{port}")),
        None => Some(host),
    }
}

/// Validates the seed URL from the CLI.
///
/// The seed must parse, use http or https, and carry a host (its host
/// defines what counts as internal). Errors here are configuration
/// errors: the run aborts before the crawl loop starts.
pub fn validate_seed(raw: &str) -> Result<Url> {
    if raw.trim().is_empty() {
        bail!("seed URL is empty");
    }
    if raw.len() > MAX_URL_LENGTH {
        bail!(
            "seed URL exceeds maximum length ({} > {})",
            raw.len(),
            MAX_URL_LENGTH
        );
    }

    // Convenience: allow a bare hostname like "ethicic.com"
    let candidate = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };

    let mut parsed =
        Url::parse(&candidate).map_err(|e| anyhow!("invalid seed URL '{raw}': {e}"))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => bail!("unsupported scheme '{other}' for seed URL '{raw}'"),
    }
    if parsed.host_str().is_none() {
        bail!("seed URL '{raw}' has no host");
    }
    parsed.set_fragment(None);
    Ok(parsed)
}
