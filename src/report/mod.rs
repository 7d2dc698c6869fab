//! Report types and aggregation.
//!
//! A run produces exactly one `CheckResult` per discovered URL; the
//! `Report` groups them by outcome category, sorted lexicographically by
//! URL within each category so diffs across runs reflect real changes
//! rather than scheduling order.

mod human;
mod json;

pub use human::render_human;
pub use json::render_json;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::{Context as AnyhowContext, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

use crate::config::OutputFormat;

/// Outcome category of a single URL check.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, Serialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// 2xx within the slow threshold
    Ok,
    /// Reached a 2xx through one or more redirect hops
    Redirect,
    /// Error status or transport/protocol failure
    Broken,
    /// 2xx, but slower than the configured threshold
    Slow,
    /// Response received but the link could not be verified
    Warning,
    /// Filtered out or left unvisited at shutdown
    Skipped,
}

impl Category {
    /// Lowercase name used in totals keys and rendered output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Ok => "ok",
            Category::Redirect => "redirect",
            Category::Broken => "broken",
            Category::Slow => "slow",
            Category::Warning => "warning",
            Category::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The finalized outcome of checking one URL.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Normalized URL that was checked.
    pub url: String,
    /// Outcome category.
    pub category: Category,
    /// Terminal HTTP status, absent when no response was received.
    pub status: Option<u16>,
    /// Final URL after redirects, when a response was received.
    pub final_url: Option<String>,
    /// Wall-clock fetch time; present iff a network attempt was made.
    pub elapsed_ms: Option<u64>,
    /// URLs that answered with a redirect status, in order.
    pub redirect_chain: Vec<String>,
    /// Page the URL was discovered on (`None` for the seed).
    pub referrer: Option<String>,
    /// Anchor text or attribute name at the discovery site.
    pub context: Option<String>,
    /// Failure or policy detail, when there is one.
    pub error: Option<String>,
}

/// The aggregated result of a whole run. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Report {
    /// The seed URL the crawl started from.
    pub seed: String,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Per-category result counts. Every category is present, zero or not.
    pub totals: BTreeMap<Category, usize>,
    /// All results, grouped by category and sorted by URL within each.
    pub results: Vec<CheckResult>,
}

impl Report {
    /// Builds a report from the raw result set, establishing the canonical
    /// ordering and totals.
    pub fn new(
        seed: String,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        mut results: Vec<CheckResult>,
    ) -> Self {
        results.sort_by(|a, b| a.category.cmp(&b.category).then(a.url.cmp(&b.url)));

        let mut totals: BTreeMap<Category, usize> = Category::iter().map(|c| (c, 0)).collect();
        for result in &results {
            *totals.entry(result.category).or_insert(0) += 1;
        }

        Report {
            seed,
            started_at,
            finished_at,
            totals,
            results,
        }
    }

    /// Count of results in one category.
    pub fn count(&self, category: Category) -> usize {
        self.totals.get(&category).copied().unwrap_or(0)
    }

    /// Total number of URLs in the report.
    pub fn total_urls(&self) -> usize {
        self.results.len()
    }

    /// Process exit code reflecting the worst category observed:
    /// non-zero iff any broken URL exists.
    pub fn exit_code(&self) -> i32 {
        if self.count(Category::Broken) > 0 {
            1
        } else {
            0
        }
    }

    /// Run duration in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as f64
            / 1000.0
    }
}

/// Renders the report in the requested format and writes it to `output`
/// (or stdout when `None`).
pub fn write_report(report: &Report, format: &OutputFormat, output: Option<&Path>) -> Result<()> {
    let rendered = match format {
        OutputFormat::Human => render_human(report),
        OutputFormat::Json => render_json(report)?,
    };

    match output {
        Some(path) => {
            std::fs::write(path, rendered.as_bytes())
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .context("Failed to write report to stdout")?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) fn result_fixture(url: &str, category: Category, status: Option<u16>) -> CheckResult {
    CheckResult {
        url: url.to_string(),
        category,
        status,
        final_url: status.map(|_| url.to_string()),
        elapsed_ms: status.map(|_| 12),
        redirect_chain: Vec::new(),
        referrer: None,
        context: None,
        error: None,
    }
}
