//! Machine-readable report rendering.
//!
//! Emits the full report as one JSON object, suitable for piping to `jq`
//! or archiving for diffing across runs.

use anyhow::Result;
use serde_json::json;

use super::Report;

/// Renders the report as pretty-printed JSON.
///
/// Shape: `seed`, `started_at`/`finished_at` (RFC 3339), `totals`
/// (category -> count), and `results` (one object per URL in the report's
/// canonical order).
pub fn render_json(report: &Report) -> Result<String> {
    let totals: serde_json::Map<String, serde_json::Value> = report
        .totals
        .iter()
        .map(|(category, count)| (category.as_str().to_string(), json!(count)))
        .collect();

    let results: Vec<serde_json::Value> = report
        .results
        .iter()
        .map(|r| {
            json!({
                "url": r.url,
                "category": r.category.as_str(),
                "status": r.status,
                "final_url": r.final_url,
                "elapsed_ms": r.elapsed_ms,
                "redirect_chain": r.redirect_chain,
                "referrer": r.referrer,
                "context": r.context,
                "error": r.error,
            })
        })
        .collect();

    let document = json!({
        "seed": report.seed,
        "started_at": report.started_at.to_rfc3339(),
        "finished_at": report.finished_at.to_rfc3339(),
        "totals": totals,
        "results": results,
    });

    let mut rendered = serde_json::to_string_pretty(&document)?;
    rendered.push('\n');
    Ok(rendered)
}
