//! Quality review engine: checks, scoring, rewrite and escalation.

use chrono::{DateTime, Utc};
use tracing::{error, info};

use crate::config::ReviewConfig;
use crate::error::{ReviewError, ReviewFault};
use crate::review::checks::run_checks;
use crate::review::escalation::escalation_reasons;
use crate::review::repair::{RepairContext, repair};
use crate::review::types::{
    EmailMessage, QualityReport, ResponseDraft, ReviewRequest,
};

/// Drafts scoring below this are rewritten.
pub const REWRITE_THRESHOLD: f64 = 0.8;

/// Stateless reviewer. Safe to share across threads and call concurrently.
#[derive(Debug, Clone, Default)]
pub struct QualityEngine {
    config: ReviewConfig,
}

impl QualityEngine {
    pub fn new(config: ReviewConfig) -> Self {
        Self { config }
    }

    /// Review `draft` as a reply to `email`, stamped with the current time.
    pub fn review(
        &self,
        email: &EmailMessage,
        draft: &ResponseDraft,
    ) -> Result<QualityReport, ReviewError> {
        self.review_at(email, draft, Utc::now())
    }

    pub fn review_request(&self, request: &ReviewRequest) -> Result<QualityReport, ReviewError> {
        self.review(&request.email, &request.draft)
    }

    /// Review with an explicit `reviewed_at` timestamp.
    pub fn review_at(
        &self,
        email: &EmailMessage,
        draft: &ResponseDraft,
        reviewed_at: DateTime<Utc>,
    ) -> Result<QualityReport, ReviewError> {
        info!(email_id = %email.id, "Reviewing response quality");

        match self.evaluate(email, draft, reviewed_at) {
            Ok(report) => {
                info!(
                    email_id = %report.email_id,
                    quality_score = report.quality_score,
                    rewritten = report.was_rewritten(),
                    escalation_needed = report.escalation_needed,
                    "Quality review completed"
                );
                Ok(report)
            }
            Err(cause) => {
                error!(email_id = %email.id, error = %cause, "Failed to review response quality");
                Err(ReviewError::processing(email.id.clone(), cause))
            }
        }
    }

    fn evaluate(
        &self,
        email: &EmailMessage,
        draft: &ResponseDraft,
        reviewed_at: DateTime<Utc>,
    ) -> Result<QualityReport, ReviewFault> {
        if email.body.len() > self.config.max_body_bytes {
            return Err(ReviewFault::BodyTooLarge {
                size: email.body.len(),
                max: self.config.max_body_bytes,
            });
        }

        let vocab = &self.config.vocabulary;
        let checks = run_checks(vocab, &email.body, &draft.content);

        let quality_score = checks.mean_score();
        if !(0.0..=1.0).contains(&quality_score) {
            return Err(ReviewFault::Internal(format!(
                "quality score {quality_score} outside [0, 1]"
            )));
        }

        let improved_response = if quality_score < REWRITE_THRESHOLD {
            let ctx = RepairContext { vocab, email };
            repair(&ctx, &draft.content, &checks)
        } else {
            draft.content.clone()
        };

        let escalation_reasons = escalation_reasons(vocab, email, quality_score);

        Ok(QualityReport {
            email_id: email.id.clone(),
            original_response: draft.content.clone(),
            improved_response,
            quality_score,
            checks,
            escalation_needed: !escalation_reasons.is_empty(),
            escalation_reasons,
            reviewed_at,
        })
    }
}
