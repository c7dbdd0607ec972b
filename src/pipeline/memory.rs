//! In-memory collaborators for the review pipeline.
//!
//! Used by the CLI binary and by tests. Nothing here outlives the process.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::pipeline::types::{MailSource, MailTransport, ReviewRecord, ReviewStore};
use crate::review::{EmailMessage, ReviewRequest};

/// FIFO queue of review requests.
#[derive(Default)]
pub struct InMemorySource {
    queue: Mutex<VecDeque<ReviewRequest>>,
}

impl InMemorySource {
    pub fn new(requests: impl IntoIterator<Item = ReviewRequest>) -> Self {
        Self {
            queue: Mutex::new(requests.into_iter().collect()),
        }
    }

    /// Requests not yet fetched.
    pub async fn remaining(&self) -> usize {
        self.queue.lock().await.len()
    }
}

#[async_trait]
impl MailSource for InMemorySource {
    async fn fetch_pending(&self, limit: usize) -> Result<Vec<ReviewRequest>, PipelineError> {
        let mut queue = self.queue.lock().await;
        let take = limit.min(queue.len());
        let batch: Vec<ReviewRequest> = queue.drain(..take).collect();
        debug!(fetched = batch.len(), remaining = queue.len(), "Fetched pending requests");
        Ok(batch)
    }
}

/// A persisted review plus its delivery timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredReview {
    pub record: ReviewRecord,
    pub sent_at: Option<DateTime<Utc>>,
}

/// Review store keyed by email id.
#[derive(Default)]
pub struct InMemoryStore {
    reviews: Mutex<HashMap<String, StoredReview>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, email_id: &str) -> Option<StoredReview> {
        self.reviews.lock().await.get(email_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.reviews.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reviews.lock().await.is_empty()
    }

    /// Reviews that were saved but never sent, i.e. escalated ones.
    pub async fn unsent(&self) -> Vec<StoredReview> {
        let reviews = self.reviews.lock().await;
        let mut unsent: Vec<StoredReview> = reviews
            .values()
            .filter(|r| r.sent_at.is_none())
            .cloned()
            .collect();
        unsent.sort_by(|a, b| a.record.email_id.cmp(&b.record.email_id));
        unsent
    }
}

#[async_trait]
impl ReviewStore for InMemoryStore {
    async fn save_review(&self, record: &ReviewRecord) -> Result<(), PipelineError> {
        self.reviews.lock().await.insert(
            record.email_id.clone(),
            StoredReview {
                record: record.clone(),
                sent_at: None,
            },
        );
        Ok(())
    }

    async fn mark_sent(&self, email_id: &str, sent_at: DateTime<Utc>) -> Result<(), PipelineError> {
        let mut reviews = self.reviews.lock().await;
        let stored = reviews
            .get_mut(email_id)
            .ok_or_else(|| PipelineError::Persistence {
                email_id: email_id.to_string(),
                reason: "no review saved for this email".into(),
            })?;
        stored.sent_at = Some(sent_at);
        Ok(())
    }
}

/// A reply handed to [`RecordingTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentReply {
    pub email_id: String,
    pub to: String,
    pub body: String,
}

/// Transport that records replies instead of delivering them.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentReply>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SentReply> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send_reply(&self, email: &EmailMessage, body: &str) -> Result<(), PipelineError> {
        info!(email_id = %email.id, to = %email.from, bytes = body.len(), "Reply recorded");
        self.sent.lock().await.push(SentReply {
            email_id: email.id.clone(),
            to: email.from.clone(),
            body: body.to_string(),
        });
        Ok(())
    }
}
