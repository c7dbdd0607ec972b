use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use anyhow::{Context, bail};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use email_review::config::PipelineConfig;
use email_review::error::{Error, ErrorEnvelope};
use email_review::pipeline::ReviewPipeline;
use email_review::pipeline::worker::spawn_review_loop;
use email_review::pipeline::memory::{InMemorySource, InMemoryStore, RecordingTransport};
use email_review::review::{QualityEngine, ReviewRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = PipelineConfig::from_env()?;

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _log_guard = init_tracing(&config);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let watch = args.iter().any(|a| a == "--watch");
    let Some(path) = args.iter().find(|a| !a.starts_with("--")).map(PathBuf::from) else {
        bail!("usage: email-review [--watch] <requests.json>");
    };

    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading {}", path.display()))?;
    let payloads: Vec<serde_json::Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{} must hold a JSON array of review requests", path.display()))?;

    let mut requests = Vec::with_capacity(payloads.len());
    for payload in payloads {
        match ReviewRequest::from_value(payload) {
            Ok(request) => requests.push(request),
            Err(e) => {
                ErrorEnvelope::new(
                    &Error::from(e),
                    serde_json::json!({ "operation": "load_requests", "path": path.display().to_string() }),
                );
            }
        }
    }

    let engine = QualityEngine::new(config.review_config()?);
    let source = Arc::new(InMemorySource::new(requests));
    let store = Arc::new(InMemoryStore::new());
    let transport = Arc::new(RecordingTransport::new());
    let pipeline = Arc::new(
        ReviewPipeline::new(engine, source.clone(), store.clone(), transport.clone())
            .with_batch_size(config.batch_size),
    );

    info!(
        requests = source.remaining().await,
        batch_size = config.batch_size,
        "Starting review run"
    );

    if watch {
        let (handle, shutdown) = spawn_review_loop(pipeline, config.cycle_interval);
        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");
        shutdown.store(true, Ordering::Relaxed);
        handle.await?;
    } else {
        while source.remaining().await > 0 {
            for outcome in pipeline.run_cycle().await? {
                println!("{}", serde_json::to_string(&outcome.report)?);
            }
        }
    }

    let held = store.unsent().await;
    for review in &held {
        warn!(
            email_id = %review.record.email_id,
            quality_score = review.record.quality_score,
            "Awaiting human review"
        );
    }

    info!(
        reviewed = store.len().await,
        sent = transport.sent().await.len(),
        held = held.len(),
        "Review run complete"
    );

    Ok(())
}

/// Log to stderr, or to a daily rolling file when a log directory is set.
fn init_tracing(config: &PipelineConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match &config.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "email-review.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
            None
        }
    }
}
