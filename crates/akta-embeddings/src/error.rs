//! Embedding error types.

use akta_core::ErrorKind;

/// Errors that can occur during embedding generation.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// Model initialization failed (download, ONNX runtime, cache issues).
    #[error("Model initialization failed: {0}")]
    InitFailed(String),

    /// Embedding generation failed (inference error, invalid input).
    #[error("Embedding generation failed: {0}")]
    EmbedFailed(String),

    /// Model returned zero embeddings for a non-empty input.
    #[error("Empty result from embedding model")]
    EmptyResult,

    /// The embedding backend cannot be reached or is switched off.
    #[error("Embedding service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The call did not finish within its budget.
    #[error("Embedding timed out after {ms}ms")]
    Timeout { ms: u64 },
}

impl EmbeddingError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InitFailed(_) | Self::EmbedFailed(_) | Self::EmptyResult | Self::ServiceUnavailable(_) => {
                ErrorKind::ServiceUnavailable
            }
        }
    }

    /// The backend itself is down or hanging, as opposed to rejecting one
    /// input. Further calls in the same pass will fail the same way.
    #[must_use]
    pub const fn is_outage(&self) -> bool {
        matches!(
            self,
            Self::ServiceUnavailable(_) | Self::Timeout { .. } | Self::InitFailed(_)
        )
    }
}
