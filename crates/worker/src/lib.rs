//! The queue consumer loop.
//!
//! [`run`] claims jobs one at a time and drives each through the
//! [`JobProcessor`], reporting the outcome back to the queue. Retry and
//! backoff live entirely in the queue; a classified error is handed over
//! unchanged. The loop ends when the cancellation token fires or the queue
//! closes.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use mapwatch_pipeline::JobProcessor;
use mapwatch_queue::JobQueue;

pub mod config;

pub use config::Config;

/// Consume jobs until shutdown.
///
/// The job in flight when cancellation fires is finished and reported
/// before the loop exits; nothing is abandoned half-processed.
pub async fn run(
    queue: Arc<dyn JobQueue>,
    processor: Arc<JobProcessor>,
    cancel: CancellationToken,
) {
    loop {
        let job = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Shutdown requested, worker draining");
                break;
            }
            job = queue.dequeue() => match job {
                Some(job) => job,
                None => {
                    tracing::info!("Queue closed and drained");
                    break;
                }
            },
        };

        let job_id = job.id.clone();
        match processor.process(&job).await {
            Ok(result) => {
                tracing::info!(
                    job_id = %job_id,
                    elements = result.data_stats.map(|s| s.elements),
                    "Reporting success to queue"
                );
                queue.complete(job, result).await;
            }
            Err(error) => {
                tracing::warn!(job_id = %job_id, error = %error, "Reporting failure to queue");
                queue.fail(job, &error).await;
            }
        }
    }

    tracing::info!("Worker stopped");
}
