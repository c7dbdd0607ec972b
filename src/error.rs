//! Error types for the email review service.

use serde::Serialize;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to produce a quality report.
///
/// There is exactly one kind: the review either completes or it does not.
/// The cause says why.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Failed to review response quality for email {email_id}: {cause}")]
    ProcessingFailed {
        email_id: String,
        #[source]
        cause: ReviewFault,
    },
}

impl ReviewError {
    /// Wrap a fault with the id of the email being reviewed.
    pub fn processing(email_id: impl Into<String>, cause: ReviewFault) -> Self {
        Self::ProcessingFailed {
            email_id: email_id.into(),
            cause,
        }
    }

    /// Id of the email whose review failed.
    pub fn email_id(&self) -> &str {
        match self {
            Self::ProcessingFailed { email_id, .. } => email_id,
        }
    }

    /// Underlying cause.
    pub fn cause(&self) -> &ReviewFault {
        match self {
            Self::ProcessingFailed { cause, .. } => cause,
        }
    }
}

/// Underlying cause of a [`ReviewError`].
#[derive(Debug, thiserror::Error)]
pub enum ReviewFault {
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("email body is {size} bytes, limit is {max}")]
    BodyTooLarge { size: usize, max: usize },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Orchestration errors. None of these are raised by the review engine.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Mail source fetch failed: {0}")]
    Source(String),

    #[error("Persisting review for {email_id} failed: {reason}")]
    Persistence { email_id: String, reason: String },

    #[error("Sending reply for {email_id} failed: {reason}")]
    Transport { email_id: String, reason: String },

    #[error(transparent)]
    Review(#[from] ReviewError),
}

/// Serializable description of a failure, for logs and operator tooling.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub success: bool,
    pub error_type: &'static str,
    pub message: String,
    pub context: serde_json::Value,
    /// Whether the orchestration loop may try the same item again.
    pub retryable: bool,
}

impl ErrorEnvelope {
    /// Build an envelope for `error`, attaching caller-supplied context.
    pub fn new(error: &Error, context: serde_json::Value) -> Self {
        let (error_type, retryable) = match error {
            Error::Config(_) => ("ConfigError", false),
            Error::Review(e) => review_kind(e),
            Error::Pipeline(PipelineError::Review(e)) => review_kind(e),
            Error::Pipeline(PipelineError::Source(_)) => ("SourceError", true),
            Error::Pipeline(PipelineError::Persistence { .. }) => ("PersistenceError", true),
            Error::Pipeline(PipelineError::Transport { .. }) => ("TransportError", true),
        };

        tracing::error!(
            error_type,
            retryable,
            context = %context,
            error = %error,
            "Error occurred"
        );

        Self {
            success: false,
            error_type,
            message: error.to_string(),
            context,
            retryable,
        }
    }
}

fn review_kind(error: &ReviewError) -> (&'static str, bool) {
    match error.cause() {
        ReviewFault::MalformedInput(_) | ReviewFault::BodyTooLarge { .. } => {
            ("ProcessingFailure", false)
        }
        ReviewFault::Internal(_) => ("ProcessingFailure", true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_error_carries_email_id_and_cause() {
        let err = ReviewError::processing("email-7", ReviewFault::Internal("boom".into()));
        assert_eq!(err.email_id(), "email-7");
        assert!(matches!(err.cause(), ReviewFault::Internal(_)));
        assert!(err.to_string().contains("email-7"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn envelope_marks_malformed_input_not_retryable() {
        let err: Error = ReviewError::processing(
            "email-1",
            ReviewFault::MalformedInput("missing field `body`".into()),
        )
        .into();
        let envelope = ErrorEnvelope::new(&err, serde_json::json!({"operation": "review"}));
        assert!(!envelope.success);
        assert_eq!(envelope.error_type, "ProcessingFailure");
        assert!(!envelope.retryable);
        assert_eq!(envelope.context["operation"], "review");
    }

    #[test]
    fn envelope_marks_collaborator_failures_retryable() {
        let err: Error = PipelineError::Persistence {
            email_id: "email-2".into(),
            reason: "connection reset".into(),
        }
        .into();
        let envelope = ErrorEnvelope::new(&err, serde_json::Value::Null);
        assert_eq!(envelope.error_type, "PersistenceError");
        assert!(envelope.retryable);

        let err: Error = PipelineError::Transport {
            email_id: "email-2".into(),
            reason: "smtp 421".into(),
        }
        .into();
        assert!(ErrorEnvelope::new(&err, serde_json::Value::Null).retryable);
    }

    #[test]
    fn envelope_config_error_not_retryable() {
        let err: Error = ConfigError::ParseError("bad json".into()).into();
        let envelope = ErrorEnvelope::new(&err, serde_json::Value::Null);
        assert_eq!(envelope.error_type, "ConfigError");
        assert!(!envelope.retryable);
    }

    #[test]
    fn envelope_serializes_flat_shape() {
        let err: Error = PipelineError::Source("imap timeout".into()).into();
        let json = serde_json::to_value(ErrorEnvelope::new(&err, serde_json::json!({}))).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_type"], "SourceError");
        assert_eq!(json["retryable"], true);
        assert!(json["message"].as_str().unwrap().contains("imap timeout"));
    }
}
