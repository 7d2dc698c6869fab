//! Core data types shared across the crawl pipeline.

use std::fmt;

/// How a discovered URL relates to the site being checked.
///
/// The classification decides the fetch policy: internal pages are fetched
/// with GET and their bodies are parsed for further links, while external
/// references and assets are terminal and checked with HEAD first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlClass {
    /// Same host (or a configured alias) as the seed; crawled for more links.
    Internal,
    /// Different host than the seed; checked but never crawled.
    External,
    /// A referenced resource (image, script, stylesheet, media source),
    /// regardless of host. Terminal, HEAD-first.
    Asset,
}

impl UrlClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            UrlClass::Internal => "internal",
            UrlClass::External => "external",
            UrlClass::Asset => "asset",
        }
    }
}

impl fmt::Display for UrlClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URL queued for checking, with its discovery metadata.
///
/// Two records with the same normalized `url` are the same unit of work;
/// the frontier deduplicates on that field alone.
#[derive(Debug, Clone)]
pub struct UrlRecord {
    /// Normalized absolute URL (see `app::url::normalize`).
    pub url: String,
    /// The page this URL was discovered on. `None` for the seed.
    pub referrer: Option<String>,
    /// Anchor text or attribute name at the discovery site.
    pub context: Option<String>,
    /// Internal, external, or asset.
    pub class: UrlClass,
    /// Link hops from the seed. The seed itself is depth 0.
    pub depth: u32,
}

impl UrlRecord {
    /// Builds the record for the seed URL itself.
    pub fn seed(url: String) -> Self {
        UrlRecord {
            url,
            referrer: None,
            context: None,
            class: UrlClass::Internal,
            depth: 0,
        }
    }
}
