//! Background review loop.
//!
//! Timer-based, one cycle per tick:
//! 1. `run_cycle()` fetches up to `batch_size` pending requests
//! 2. each is reviewed, persisted and, unless escalated, sent
//!
//! A failed fetch is logged and retried on the next tick.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::error::{Error, ErrorEnvelope};
use crate::pipeline::processor::ReviewPipeline;

/// Spawn a task that runs a pipeline cycle every `interval`.
///
/// The first cycle runs immediately. Returns a `JoinHandle` and a shutdown
/// flag; the loop exits on the first tick after the flag is set.
pub fn spawn_review_loop(
    pipeline: Arc<ReviewPipeline>,
    interval: Duration,
) -> (JoinHandle<()>, Arc<AtomicBool>) {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_flag = Arc::clone(&shutdown);

    let handle = tokio::spawn(async move {
        info!(interval_secs = interval.as_secs(), "Review loop started");

        let mut tick = tokio::time::interval(interval);

        loop {
            tick.tick().await;

            if shutdown.load(Ordering::Relaxed) {
                info!("Review loop shutting down");
                return;
            }

            if let Err(e) = pipeline.run_cycle().await {
                ErrorEnvelope::new(
                    &Error::from(e),
                    serde_json::json!({ "operation": "run_cycle" }),
                );
            }
        }
    });

    (handle, shutdown_flag)
}
