//! Error types, categorization, and processing statistics.

mod categorization;
mod stats;
mod types;

pub use categorization::{categorize_fetch_error, categorize_status, get_retry_strategy};
pub use stats::ProcessingStats;
pub use types::{ErrorType, FetchError, InfoType, InitializationError, WarningType};
