//! Application-level helpers: URL validation, progress logging, shutdown,
//! and end-of-run statistics.

pub mod logging;
pub mod shutdown;
pub mod statistics;
pub mod url;

pub use logging::log_progress;
pub use shutdown::shutdown_gracefully;
pub use statistics::print_error_statistics;
pub use url::{host_key, normalize, validate_seed};
