//! Shared types for the review pipeline.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::review::{EmailMessage, EscalationReason, QualityChecks, QualityReport, ReviewRequest};

// ── Persistence payload ─────────────────────────────────────────────

/// What the store keeps for a reviewed email, keyed by `email_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    pub email_id: String,
    /// The response that will be (or would have been) sent.
    pub final_response: String,
    pub quality_score: f64,
    pub quality_checks: QualityChecks,
    pub escalation_needed: bool,
    pub escalation_reasons: Vec<EscalationReason>,
    pub reviewed_at: DateTime<Utc>,
}

impl From<&QualityReport> for ReviewRecord {
    fn from(report: &QualityReport) -> Self {
        Self {
            email_id: report.email_id.clone(),
            final_response: report.improved_response.clone(),
            quality_score: report.quality_score,
            quality_checks: report.checks.clone(),
            escalation_needed: report.escalation_needed,
            escalation_reasons: report.escalation_reasons.clone(),
            reviewed_at: report.reviewed_at,
        }
    }
}

// ── Outcome ─────────────────────────────────────────────────────────

/// What happened to the reply after review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    /// Reply handed to the transport.
    Sent { sent_at: DateTime<Utc> },
    /// Escalated; a human must approve before anything is sent.
    HeldForReview,
}

impl Delivery {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Sent { .. } => "sent",
            Self::HeldForReview => "held_for_review",
        }
    }
}

/// Result of running one request through the pipeline.
#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub report: QualityReport,
    pub delivery: Delivery,
}

// ── Collaborator traits ─────────────────────────────────────────────

/// Supplies emails paired with drafted replies.
#[async_trait]
pub trait MailSource: Send + Sync {
    /// Fetch up to `limit` requests awaiting review.
    async fn fetch_pending(&self, limit: usize) -> Result<Vec<ReviewRequest>, PipelineError>;
}

/// Persists review results.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Write back a review, replacing any earlier one for the same email.
    async fn save_review(&self, record: &ReviewRecord) -> Result<(), PipelineError>;

    /// Record that the reply for `email_id` went out.
    async fn mark_sent(&self, email_id: &str, sent_at: DateTime<Utc>) -> Result<(), PipelineError>;
}

/// Delivers replies. Only called for reviews that were not escalated.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send_reply(&self, email: &EmailMessage, body: &str) -> Result<(), PipelineError>;
}
