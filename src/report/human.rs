//! Human-readable report rendering.

use colored::Colorize;
use strum::IntoEnumIterator;

use super::{Category, CheckResult, Report};

/// Renders the report as a terminal-friendly summary: overall counts
/// followed by the non-ok URLs grouped per category with their discovery
/// context.
pub fn render_human(report: &Report) -> String {
    let mut out = String::new();

    let total = report.total_urls();
    let ok_ish = report.count(Category::Ok) + report.count(Category::Redirect);
    let success_rate = if total > 0 {
        ok_ish as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    out.push_str(&format!("Link check for {}\n", report.seed.bold()));
    out.push_str(&format!(
        "Checked {} URLs in {:.1}s ({:.1}% resolving)\n\n",
        total,
        report.elapsed_seconds(),
        success_rate
    ));

    out.push_str("Totals:\n");
    for category in Category::iter() {
        let count = report.count(category);
        let label = colored_category(category);
        out.push_str(&format!("  {:>7} {}\n", count, label));
    }

    // Everything that deserves a second look, grouped by category.
    for category in [
        Category::Broken,
        Category::Warning,
        Category::Slow,
        Category::Redirect,
        Category::Skipped,
    ] {
        let group: Vec<&CheckResult> = report
            .results
            .iter()
            .filter(|r| r.category == category)
            .collect();
        if group.is_empty() {
            continue;
        }

        out.push('\n');
        out.push_str(&format!(
            "{} ({})\n",
            colored_category(category).bold(),
            group.len()
        ));
        for result in group {
            out.push_str(&format!("  {}{}\n", result.url, status_suffix(result)));
            if let Some(referrer) = &result.referrer {
                match &result.context {
                    Some(context) => {
                        out.push_str(&format!("      found on {referrer} ({context})\n"));
                    }
                    None => out.push_str(&format!("      found on {referrer}\n")),
                }
            }
            if let Some(error) = &result.error {
                out.push_str(&format!("      {}\n", error.red()));
            }
        }
    }

    out
}

fn colored_category(category: Category) -> colored::ColoredString {
    match category {
        Category::Ok => category.as_str().green(),
        Category::Redirect => category.as_str().cyan(),
        Category::Broken => category.as_str().red(),
        Category::Slow => category.as_str().yellow(),
        Category::Warning => category.as_str().yellow(),
        Category::Skipped => category.as_str().normal(),
    }
}

fn status_suffix(result: &CheckResult) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(status) = result.status {
        parts.push(format!("{status}"));
    }
    if let Some(final_url) = &result.final_url {
        if *final_url != result.url {
            parts.push(format!("-> {final_url}"));
        }
    }
    if let Some(elapsed) = result.elapsed_ms {
        if result.category == Category::Slow {
            parts.push(format!("{elapsed}ms"));
        }
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!("  [{}]", parts.join(" "))
    }
}
