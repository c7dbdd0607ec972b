//! Human-escalation policy.

use tracing::debug;

use crate::config::Vocabulary;
use crate::review::types::{EmailMessage, EscalationReason};

/// Reports scoring below this always go to a human.
pub const ESCALATION_THRESHOLD: f64 = 0.6;

/// Collect every escalation trigger that fires for `email`.
///
/// All rules are evaluated even after one has fired so the report lists
/// every reason. `from` is matched as a raw substring, so a marker such as
/// "ceo" also matches inside an unrelated local part.
pub fn escalation_reasons(
    vocab: &Vocabulary,
    email: &EmailMessage,
    quality_score: f64,
) -> Vec<EscalationReason> {
    let mut reasons = Vec::new();

    if quality_score < ESCALATION_THRESHOLD {
        reasons.push(EscalationReason::LowQuality {
            score: quality_score,
        });
    }

    let body = email.body.to_lowercase();
    reasons.extend(
        vocab
            .sensitive_keywords
            .iter()
            .filter(|keyword| body.contains(keyword.as_str()))
            .map(|keyword| EscalationReason::SensitiveTopic {
                keyword: keyword.clone(),
            }),
    );

    let sender = email.from.to_lowercase();
    reasons.extend(
        vocab
            .executive_markers
            .iter()
            .filter(|marker| sender.contains(marker.as_str()))
            .map(|marker| EscalationReason::ExecutiveSender {
                marker: marker.clone(),
            }),
    );

    for reason in &reasons {
        debug!(
            email_id = %email.id,
            trigger = reason.label(),
            ?reason,
            "Escalation trigger fired"
        );
    }

    reasons
}
