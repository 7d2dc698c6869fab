//! Error type definitions.
//!
//! This module defines all error, warning, and info types used throughout
//! the application.

use std::time::Duration;

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors produced by a single fetch attempt.
///
/// Each variant is distinguishable in the recorded error detail so the
/// report can tell a DNS failure from a redirect loop.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The redirect chain exceeded the hop limit.
    #[error("too many redirects (limit {limit})")]
    TooManyRedirects {
        /// The configured hop limit that was exceeded.
        limit: usize,
    },

    /// A redirect attempted to step from https down to http. Never followed.
    #[error("refused cross-scheme downgrade {from} -> {to}")]
    SchemeDowngrade {
        /// URL that issued the redirect.
        from: String,
        /// The http target it pointed at.
        to: String,
    },

    /// A Location header that could not be resolved against the current URL.
    #[error("invalid redirect target '{location}': {reason}")]
    InvalidRedirect {
        /// Raw Location header value.
        location: String,
        /// Parse failure detail.
        reason: String,
    },

    /// The URL itself did not parse.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport-level failure: DNS, connect, TLS, timeout, malformed
    /// response. The wrapped `reqwest` error carries the specifics.
    #[error("request failed: {0}")]
    Transport(#[from] ReqwestError),

    /// The whole fetch (all hops plus body read) exceeded its total timeout.
    #[error("fetch exceeded total timeout of {0:?}")]
    DeadlineExceeded(Duration),
}

impl FetchError {
    /// Whether retrying this error might succeed (connection resets and
    /// timeouts; everything else is deterministic).
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

/// Types of errors that can occur while checking a URL.
///
/// These categorize actual failures for the end-of-run statistics; the
/// per-URL outcome itself is carried in the check result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // Transport errors
    ConnectError,
    TimeoutError,
    RequestError,
    BodyError,
    DecodeError,
    // Protocol errors
    TooManyRedirects,
    SchemeDowngrade,
    RedirectWithoutLocation,
    // HTTP status errors
    NotFound,         // 404
    Forbidden,        // 403
    TooManyRequests,  // 429
    OtherClientError, // remaining 4xx
    ServerError,      // 5xx
    // Orchestration
    FetchDeadlineExceeded,
    OtherError,
}

/// Types of warnings that can occur while checking a URL.
///
/// Warnings indicate conditions that don't make a link broken but are
/// worth tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum WarningType {
    /// Both HEAD and the GET fallback were rejected (405/501); the link
    /// could not be verified either way.
    MethodNotAllowed,
    /// An internal page answered 2xx with a clearly non-HTML Content-Type;
    /// no links were extracted from it.
    NonHtmlPage,
}

/// Types of informational metrics tracked during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    /// Any redirect occurred (single or multiple hops)
    Redirect,
    /// HTTP to HTTPS redirect
    HttpsUpgrade,
    /// More than one redirect hop in a single chain
    MultipleRedirects,
    /// HEAD was rejected and the check fell back to GET
    HeadFallback,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::ConnectError => "Connection error",
            ErrorType::TimeoutError => "Request timeout",
            ErrorType::RequestError => "Request error",
            ErrorType::BodyError => "Response body error",
            ErrorType::DecodeError => "Response decode error",
            ErrorType::TooManyRedirects => "Too many redirects",
            ErrorType::SchemeDowngrade => "Cross-scheme downgrade refused",
            ErrorType::RedirectWithoutLocation => "Redirect without Location header",
            ErrorType::NotFound => "Not Found (404)",
            ErrorType::Forbidden => "Forbidden (403)",
            ErrorType::TooManyRequests => "Too Many Requests (429)",
            ErrorType::OtherClientError => "Client error (4xx)",
            ErrorType::ServerError => "Server error (5xx)",
            ErrorType::FetchDeadlineExceeded => "Fetch deadline exceeded",
            ErrorType::OtherError => "Other error",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::MethodNotAllowed => "Method not allowed (unverifiable)",
            WarningType::NonHtmlPage => "Non-HTML internal page",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::Redirect => "Redirect",
            InfoType::HttpsUpgrade => "HTTP to HTTPS redirect",
            InfoType::MultipleRedirects => "Multiple redirects",
            InfoType::HeadFallback => "HEAD fallback to GET",
        }
    }
}
