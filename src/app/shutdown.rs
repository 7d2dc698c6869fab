//! Graceful shutdown handling.

use tokio_util::sync::CancellationToken;

/// Shuts down background tasks gracefully.
///
/// Signals the progress-logging task to stop and awaits it. Worker tasks
/// are not touched here: they observe the run's cancellation token
/// themselves and finish their in-flight fetch first.
pub async fn shutdown_gracefully(
    cancel: CancellationToken,
    logging_task: Option<tokio::task::JoinHandle<()>>,
) {
    cancel.cancel();
    if let Some(logging_task) = logging_task {
        let _ = logging_task.await;
    }
}
