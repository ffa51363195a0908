use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mapwatch_cache::InMemoryCache;
use mapwatch_core::payload::JobPayload;
use mapwatch_overpass::OverpassClient;
use mapwatch_pipeline::{FixedWindowGate, JobProcessor, FETCH_WINDOW};
use mapwatch_queue::{InMemoryQueue, JobQueue, TEST_JOB_NAME};
use mapwatch_worker::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mapwatch_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    tracing::info!(endpoint = %config.overpass_url, "Worker starting");

    let queue = Arc::new(InMemoryQueue::new());
    let processor = Arc::new(JobProcessor::new(
        Arc::new(OverpassClient::new(config.overpass_url.clone())),
        Arc::new(InMemoryCache::new()),
        Arc::new(FixedWindowGate::new(FETCH_WINDOW)),
    ));

    if config.smoke_job {
        let job_id = queue
            .enqueue(TEST_JOB_NAME, JobPayload::with_message("Hello from the smoke job"))
            .await?;
        tracing::info!(job_id = %job_id, "Smoke job enqueued");
    }

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    let signal_queue = Arc::clone(&queue);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, shutting down gracefully");
        signal_queue.close().await;
        signal_cancel.cancel();
    });

    mapwatch_worker::run(queue, processor, cancel).await;
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
    }
}
