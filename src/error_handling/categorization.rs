//! Error categorization and retry strategy.
//!
//! This module provides functions to categorize errors and configure retry
//! strategies.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::{ErrorType, FetchError};

/// Creates an exponential backoff retry strategy.
///
/// Returns a retry strategy configured with:
/// - Initial delay: `RETRY_INITIAL_DELAY_MS` milliseconds
/// - Backoff factor: `RETRY_FACTOR` (doubles delay each retry)
/// - Maximum delay: `RETRY_MAX_DELAY_SECS` seconds
/// - Maximum retries: `RETRY_MAX_ATTEMPTS`
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS)
}

/// Categorizes a terminal HTTP status code into an `ErrorType`.
///
/// Only statuses that make a link broken reach this function; 2xx and
/// followed 3xx never do.
pub fn categorize_status(status: u16) -> ErrorType {
    match status {
        403 => ErrorType::Forbidden,
        404 => ErrorType::NotFound,
        429 => ErrorType::TooManyRequests,
        400..=499 => ErrorType::OtherClientError,
        500..=599 => ErrorType::ServerError,
        _ => ErrorType::OtherError,
    }
}

/// Categorizes a `FetchError` into an `ErrorType` for statistics tracking.
pub fn categorize_fetch_error(error: &FetchError) -> ErrorType {
    match error {
        FetchError::TooManyRedirects { .. } => ErrorType::TooManyRedirects,
        FetchError::SchemeDowngrade { .. } => ErrorType::SchemeDowngrade,
        FetchError::InvalidRedirect { .. } => ErrorType::RedirectWithoutLocation,
        FetchError::InvalidUrl(_) => ErrorType::RequestError,
        FetchError::DeadlineExceeded(_) => ErrorType::FetchDeadlineExceeded,
        FetchError::Transport(e) => {
            if e.is_timeout() {
                ErrorType::TimeoutError
            } else if e.is_connect() {
                ErrorType::ConnectError
            } else if e.is_body() {
                ErrorType::BodyError
            } else if e.is_decode() {
                ErrorType::DecodeError
            } else if e.is_request() {
                ErrorType::RequestError
            } else {
                ErrorType::OtherError
            }
        }
    }
}
