//! Composer and generation-service error types.

use akta_core::{AnswerError, ErrorKind};
use akta_rules::RulesError;
use thiserror::Error;

/// Failures of the external generation service.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The service cannot be reached or is overloaded.
    #[error("generation service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The call did not finish within its budget.
    #[error("generation timed out after {secs}s")]
    Timeout { secs: u64 },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service rejected the request.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response carried no completion text.
    #[error("generation service returned no text")]
    EmptyCompletion,
}

impl GenerationError {
    /// `ServiceUnavailable` and `Timeout` are retried against the budget;
    /// a rejected request is not.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            Self::ServiceUnavailable(_) | Self::Http(_) | Self::EmptyCompletion => {
                ErrorKind::ServiceUnavailable
            }
            Self::Api { .. } => ErrorKind::InvalidData,
        }
    }
}

/// Conditions that end a request with a `failed` answer.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A rules-engine failure that cannot be recorded as a note.
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// The overall request deadline passed between two stages.
    #[error("request deadline of {ms}ms exceeded during {stage}")]
    DeadlineExceeded { stage: &'static str, ms: u64 },
}

impl ComposeError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Rules(e) => e.kind(),
            Self::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
        }
    }
}

impl From<&ComposeError> for AnswerError {
    fn from(error: &ComposeError) -> Self {
        Self::new(error.kind(), error.to_string())
    }
}

impl From<&GenerationError> for AnswerError {
    fn from(error: &GenerationError) -> Self {
        Self::new(error.kind(), error.to_string())
    }
}
