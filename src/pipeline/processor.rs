//! Review pipeline: reviews drafted replies, persists the result and
//! sends only what needs no human.
//!
//! Flow per request:
//! 1. `QualityEngine::review()`: pure scoring, rewrite, escalation
//! 2. `ReviewStore::save_review()`: write back the record
//! 3. `MailTransport::send_reply()`: only when not escalated
//! 4. `ReviewStore::mark_sent()`
//!
//! A failed review stops the request before anything is persisted or sent.

use std::sync::Arc;

use chrono::Utc;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::error::{Error, ErrorEnvelope, PipelineError};
use crate::pipeline::types::{
    Delivery, MailSource, MailTransport, ReviewOutcome, ReviewRecord, ReviewStore,
};
use crate::review::{QualityEngine, ReviewRequest};

/// Default number of requests fetched per cycle.
const DEFAULT_BATCH_SIZE: usize = 10;

pub struct ReviewPipeline {
    engine: QualityEngine,
    source: Arc<dyn MailSource>,
    store: Arc<dyn ReviewStore>,
    transport: Arc<dyn MailTransport>,
    batch_size: usize,
}

impl ReviewPipeline {
    pub fn new(
        engine: QualityEngine,
        source: Arc<dyn MailSource>,
        store: Arc<dyn ReviewStore>,
        transport: Arc<dyn MailTransport>,
    ) -> Self {
        Self {
            engine,
            source,
            store,
            transport,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set how many requests one cycle fetches. Zero is treated as one.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Review, persist, and deliver a single request.
    pub async fn process(&self, request: ReviewRequest) -> Result<ReviewOutcome, PipelineError> {
        let report = self.engine.review_request(&request)?;

        self.store.save_review(&ReviewRecord::from(&report)).await?;

        if report.escalation_needed {
            info!(
                email_id = %report.email_id,
                reasons = report.escalation_reasons.len(),
                "Escalated, holding reply for human review"
            );
            return Ok(ReviewOutcome {
                report,
                delivery: Delivery::HeldForReview,
            });
        }

        self.transport
            .send_reply(&request.email, &report.improved_response)
            .await?;

        let sent_at = Utc::now();
        self.store.mark_sent(&report.email_id, sent_at).await?;
        debug!(email_id = %report.email_id, "Reply sent");

        Ok(ReviewOutcome {
            report,
            delivery: Delivery::Sent { sent_at },
        })
    }

    /// Process each request independently.
    ///
    /// Failures are logged and skipped; they do not fail the batch.
    pub async fn process_batch(&self, requests: Vec<ReviewRequest>) -> Vec<ReviewOutcome> {
        let count = requests.len();
        info!(count, "Processing review batch");

        let mut outcomes = Vec::with_capacity(count);
        for request in requests {
            let email_id = request.email.id.clone();
            match self.process(request).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    let envelope = ErrorEnvelope::new(
                        &Error::from(e),
                        serde_json::json!({ "operation": "process_batch", "email_id": email_id }),
                    );
                    if envelope.retryable {
                        warn!(email_id = %email_id, "Review will need another attempt");
                    }
                }
            }
        }

        info!(
            processed = outcomes.len(),
            total = count,
            "Batch processing complete"
        );
        outcomes
    }

    /// Fetch one batch from the source and process it.
    pub async fn run_cycle(&self) -> Result<Vec<ReviewOutcome>, PipelineError> {
        let cycle_id = Uuid::new_v4();
        async {
            let requests = self.source.fetch_pending(self.batch_size).await?;
            if requests.is_empty() {
                debug!("No pending requests");
                return Ok(Vec::new());
            }
            Ok(self.process_batch(requests).await)
        }
        .instrument(info_span!("review_cycle", %cycle_id))
        .await
    }
}
