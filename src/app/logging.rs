//! Progress logging utilities.

use log::info;

/// Logs progress information about the crawl.
///
/// # Arguments
///
/// * `start_time` - The start time of the run
/// * `checked` - Number of URLs with a recorded result so far
/// * `queued` - Number of URLs still waiting in the frontier
pub fn log_progress(start_time: std::time::Instant, checked: usize, queued: usize) {
    let elapsed_secs = start_time.elapsed().as_secs_f64();
    let rate = if elapsed_secs > 0.0 {
        checked as f64 / elapsed_secs
    } else {
        0.0
    };
    info!(
        "Checked {} URLs in {:.2} seconds (~{:.2} URLs/sec, {} queued)",
        checked, elapsed_secs, rate, queued
    );
}
