//! HTML link extraction and classification.
//!
//! Parses a page body leniently (html5ever recovers what it can from
//! malformed markup) and yields every link-bearing attribute, resolved to
//! absolute normalized form and classified as internal, external, or
//! asset.

use std::collections::HashSet;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::app::url::{host_key, normalize_parsed};
use crate::config::MAX_CONTEXT_LENGTH;
use crate::models::UrlClass;

/// A link discovered on a page, before it becomes a frontier record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Normalized absolute URL.
    pub url: String,
    /// Anchor text for `<a>` elements, attribute name otherwise.
    pub context: String,
    /// Internal, external, or asset.
    pub class: UrlClass,
}

struct LinkSelector {
    selector: Selector,
    attr: &'static str,
    asset: bool,
}

// The link-bearing attributes we care about. `link[href]` covers
// stylesheets and icons, so it counts as an asset source; `a`, `iframe`,
// and `form` point at navigable documents.
const LINK_SOURCES: &[(&str, &str, bool)] = &[
    ("a[href]", "href", false),
    ("link[href]", "href", true),
    ("script[src]", "src", true),
    ("img[src]", "src", true),
    ("source[src]", "src", true),
    ("source[srcset]", "srcset", true),
    ("iframe[src]", "src", false),
    ("form[action]", "action", false),
];

static LINK_SELECTORS: LazyLock<Vec<LinkSelector>> = LazyLock::new(|| {
    LINK_SOURCES
        .iter()
        .filter_map(|&(css, attr, asset)| match Selector::parse(css) {
            Ok(selector) => Some(LinkSelector {
                selector,
                attr,
                asset,
            }),
            Err(e) => {
                log::error!("Failed to parse selector '{css}': {e}");
                None
            }
        })
        .collect()
});

/// Extracts and classifies links from HTML bodies.
pub struct Extractor {
    internal_hosts: HashSet<String>,
}

impl Extractor {
    /// Builds an extractor for a given seed.
    ///
    /// `alias_hosts` lists additional hosts (bare host or `host:port`)
    /// treated as internal, e.g. a `www.` alias of the apex domain.
    pub fn new(seed: &Url, alias_hosts: &[String]) -> Self {
        let mut internal_hosts = HashSet::new();
        if let Some(key) = host_key(seed) {
            internal_hosts.insert(key);
        }
        for alias in alias_hosts {
            internal_hosts.insert(alias.to_ascii_lowercase());
        }
        Extractor { internal_hosts }
    }

    /// Whether a URL belongs to the site being checked.
    pub fn is_internal(&self, url: &Url) -> bool {
        let by_key = host_key(url).is_some_and(|key| self.internal_hosts.contains(&key));
        let by_host = url
            .host_str()
            .is_some_and(|host| self.internal_hosts.contains(&host.to_ascii_lowercase()));
        by_key || by_host
    }

    /// Extracts every link reference from `body`, resolved against
    /// `base_url` and normalized.
    ///
    /// Deterministic: links are yielded in document order. Malformed HTML
    /// never aborts extraction; whatever the parser recovered is scanned.
    /// mailto:, tel:, javascript:, data: references and pure fragments are
    /// skipped.
    pub fn extract(&self, base_url: &str, body: &str) -> Vec<Link> {
        let base = match Url::parse(base_url) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Cannot extract links: invalid base URL '{base_url}': {e}");
                return Vec::new();
            }
        };

        let document = Html::parse_document(body);
        let mut links = Vec::new();

        for source in LINK_SELECTORS.iter() {
            for element in document.select(&source.selector) {
                let Some(raw) = element.value().attr(source.attr) else {
                    continue;
                };

                if source.attr == "srcset" {
                    for candidate in parse_srcset(raw) {
                        self.push_link(&mut links, &base, &candidate, &element, source);
                    }
                } else {
                    self.push_link(&mut links, &base, raw, &element, source);
                }
            }
        }

        links
    }

    fn push_link(
        &self,
        links: &mut Vec<Link>,
        base: &Url,
        raw: &str,
        element: &ElementRef<'_>,
        source: &LinkSelector,
    ) {
        let Some(resolved) = resolve_reference(base, raw) else {
            return;
        };

        let class = if source.asset {
            UrlClass::Asset
        } else if self.is_internal(&resolved) {
            UrlClass::Internal
        } else {
            UrlClass::External
        };

        let context = if source.attr == "href" && element.value().name() == "a" {
            let text: String = element.text().collect::<String>().trim().to_string();
            if text.is_empty() {
                source.attr.to_string()
            } else {
                text.chars().take(MAX_CONTEXT_LENGTH).collect()
            }
        } else {
            source.attr.to_string()
        };

        links.push(Link {
            url: normalize_parsed(&resolved),
            context,
            class,
        });
    }
}

/// Resolves a raw attribute value against the page URL, skipping
/// non-checkable references.
fn resolve_reference(base: &Url, raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() || raw.starts_with('#') {
        return None;
    }
    let lower = raw.to_ascii_lowercase();
    for scheme in ["mailto:", "tel:", "javascript:", "data:", "about:", "blob:"] {
        if lower.starts_with(scheme) {
            return None;
        }
    }

    let resolved = base.join(raw).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved),
        _ => None,
    }
}

/// Pulls the URL out of each srcset candidate ("url 2x, url 640w, ...").
fn parse_srcset(srcset: &str) -> Vec<String> {
    srcset
        .split(',')
        .filter_map(|candidate| {
            candidate
                .split_whitespace()
                .next()
                .map(|url| url.to_string())
        })
        .filter(|url| !url.is_empty())
        .collect()
}
