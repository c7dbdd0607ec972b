//! Quality review and escalation.
//!
//! Given an inbound email and a drafted reply, the engine:
//! 1. runs seven independent heuristic checks (`checks`)
//! 2. averages their scores into a quality score
//! 3. rewrites the draft below the rewrite threshold (`repair`)
//! 4. decides whether a human must see it before sending (`escalation`)
//!
//! Pure computation: no I/O, no shared state.

pub mod checks;
pub mod engine;
pub mod escalation;
pub mod repair;
pub mod types;

pub use engine::{QualityEngine, REWRITE_THRESHOLD};
pub use escalation::ESCALATION_THRESHOLD;
pub use types::{
    CheckName, CheckResult, EmailMessage, EscalationReason, QualityChecks, QualityReport,
    ResponseDraft, ReviewRequest, Sentiment,
};
