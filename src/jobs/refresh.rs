//! Cache refresh worker.
//!
//! A single worker drains the refresh queue and recomputes payloads one job
//! at a time, which serializes recomputation without any locking. The
//! periodic worker just feeds the same queue, so scheduled and on-demand
//! refreshes share one code path.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::services::AnalyticsService;

use super::queue::{RefreshJob, RefreshQueue};

/// Drain the refresh queue until every sender is gone.
pub async fn start_refresh_worker(
    analytics: AnalyticsService,
    mut rx: mpsc::UnboundedReceiver<RefreshJob>,
) {
    tracing::info!("Starting analytics refresh worker");

    while let Some(job) = rx.recv().await {
        let start = Instant::now();
        let result = analytics.refresh(&job.cache_types).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        if result.payloads_failed > 0 {
            tracing::warn!(
                written = result.payloads_written,
                failed = result.payloads_failed,
                duration_ms,
                "Analytics refresh pass finished with failures"
            );
        } else {
            tracing::info!(
                written = result.payloads_written,
                duration_ms,
                "Analytics refresh pass complete"
            );
        }
    }

    tracing::info!("Refresh queue closed, analytics refresh worker exiting");
}

/// Enqueue a full refresh at a fixed interval.
pub async fn start_periodic_refresh_worker(queue: RefreshQueue, interval_secs: u64) {
    tracing::info!(interval_secs, "Starting periodic analytics refresh worker");
    let interval = Duration::from_secs(interval_secs);

    loop {
        queue.enqueue(RefreshJob::all());
        tokio::time::sleep(interval).await;
    }
}
