//! Records consumed and produced by the review engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ReviewError, ReviewFault};

// ── Inputs ──────────────────────────────────────────────────────────

/// Inbound email under review. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    /// Opaque unique identifier.
    pub id: String,
    /// Sender address or display string.
    pub from: String,
    /// Raw plain-text body, untrimmed.
    pub body: String,
}

impl EmailMessage {
    pub fn new(id: impl Into<String>, from: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            body: body.into(),
        }
    }
}

/// Candidate reply text produced upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDraft {
    #[serde(alias = "response_content")]
    pub content: String,
}

impl ResponseDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// An email paired with the draft that answers it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    pub email: EmailMessage,
    #[serde(alias = "response")]
    pub draft: ResponseDraft,
}

impl ReviewRequest {
    pub fn new(email: EmailMessage, draft: ResponseDraft) -> Self {
        Self { email, draft }
    }

    /// Parse a request from JSON text.
    pub fn from_json(raw: &str) -> Result<Self, ReviewError> {
        let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| {
            ReviewError::processing("unknown", ReviewFault::MalformedInput(e.to_string()))
        })?;
        Self::from_value(value)
    }

    /// Convert an untyped JSON payload into a request.
    ///
    /// Missing or mistyped fields are a processing failure. The error carries
    /// the email id whenever the payload has one.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ReviewError> {
        let email_id = value
            .get("email")
            .and_then(|e| e.get("id"))
            .and_then(|id| id.as_str())
            .unwrap_or("unknown")
            .to_string();

        serde_json::from_value(value)
            .map_err(|e| ReviewError::processing(email_id, ReviewFault::MalformedInput(e.to_string())))
    }
}

// ── Check results ───────────────────────────────────────────────────

/// The seven quality dimensions, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckName {
    GrammarSpelling,
    ToneAppropriateness,
    ContentCompleteness,
    BrandVoice,
    Accuracy,
    Professionalism,
    ActionClarity,
}

impl CheckName {
    /// Every check, in the order the engine runs them.
    pub const ALL: [CheckName; 7] = [
        Self::GrammarSpelling,
        Self::ToneAppropriateness,
        Self::ContentCompleteness,
        Self::BrandVoice,
        Self::Accuracy,
        Self::Professionalism,
        Self::ActionClarity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrammarSpelling => "grammar_spelling",
            Self::ToneAppropriateness => "tone_appropriateness",
            Self::ContentCompleteness => "content_completeness",
            Self::BrandVoice => "brand_voice",
            Self::Accuracy => "accuracy",
            Self::Professionalism => "professionalism",
            Self::ActionClarity => "action_clarity",
        }
    }
}

impl std::fmt::Display for CheckName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one quality check.
///
/// `passed` and `score` are derived independently; a failed check may
/// still carry a nonzero score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub passed: bool,
    /// Always within `[0, 1]`.
    pub score: f64,
    pub issues: Vec<String>,
}

impl CheckResult {
    /// Build a result, clamping `score` into `[0, 1]`.
    pub fn new(passed: bool, score: f64, issues: Vec<String>) -> Self {
        Self {
            passed,
            score: score.clamp(0.0, 1.0),
            issues,
        }
    }

    pub fn pass(score: f64) -> Self {
        Self::new(true, score, Vec::new())
    }

    pub fn fail(score: f64, issue: impl Into<String>) -> Self {
        Self::new(false, score, vec![issue.into()])
    }
}

/// Results for all seven checks.
///
/// Serializes as a map keyed by check name, in evaluation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityChecks {
    pub grammar_spelling: CheckResult,
    pub tone_appropriateness: CheckResult,
    pub content_completeness: CheckResult,
    pub brand_voice: CheckResult,
    pub accuracy: CheckResult,
    pub professionalism: CheckResult,
    pub action_clarity: CheckResult,
}

impl QualityChecks {
    pub fn get(&self, name: CheckName) -> &CheckResult {
        match name {
            CheckName::GrammarSpelling => &self.grammar_spelling,
            CheckName::ToneAppropriateness => &self.tone_appropriateness,
            CheckName::ContentCompleteness => &self.content_completeness,
            CheckName::BrandVoice => &self.brand_voice,
            CheckName::Accuracy => &self.accuracy,
            CheckName::Professionalism => &self.professionalism,
            CheckName::ActionClarity => &self.action_clarity,
        }
    }

    /// Iterate in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (CheckName, &CheckResult)> {
        CheckName::ALL.into_iter().map(move |name| (name, self.get(name)))
    }

    /// Unweighted mean of the check scores.
    pub fn mean_score(&self) -> f64 {
        let total: f64 = self.iter().map(|(_, check)| check.score).sum();
        total / CheckName::ALL.len() as f64
    }
}

// ── Sentiment ───────────────────────────────────────────────────────

/// Coarse sentiment of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

// ── Escalation ──────────────────────────────────────────────────────

/// Why a reviewed email must go to a human.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum EscalationReason {
    /// Blended score fell below the escalation threshold.
    LowQuality { score: f64 },
    /// Email body mentions a sensitive topic.
    SensitiveTopic { keyword: String },
    /// Sender looks like an executive.
    ExecutiveSender { marker: String },
}

impl EscalationReason {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::LowQuality { .. } => "low_quality",
            Self::SensitiveTopic { .. } => "sensitive_topic",
            Self::ExecutiveSender { .. } => "executive_sender",
        }
    }
}

// ── Report ──────────────────────────────────────────────────────────

/// The engine's judgment on one (email, draft) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub email_id: String,
    pub original_response: String,
    /// Equal to `original_response` when no rewrite was triggered.
    pub improved_response: String,
    pub quality_score: f64,
    pub checks: QualityChecks,
    pub escalation_needed: bool,
    pub escalation_reasons: Vec<EscalationReason>,
    pub reviewed_at: DateTime<Utc>,
}

impl QualityReport {
    /// Whether the rewrite step changed the draft.
    pub fn was_rewritten(&self) -> bool {
        self.improved_response != self.original_response
    }

    /// Names of checks that did not pass, in evaluation order.
    pub fn failed_checks(&self) -> Vec<CheckName> {
        self.checks
            .iter()
            .filter(|(_, check)| !check.passed)
            .map(|(name, _)| name)
            .collect()
    }

    /// All issues, each prefixed with the check that raised it.
    pub fn issues(&self) -> Vec<String> {
        self.checks
            .iter()
            .flat_map(|(name, check)| check.issues.iter().map(move |issue| format!("{name}: {issue}")))
            .collect()
    }
}
