//! Cross-cutting error types for Akta.
//!
//! Domain-specific errors (`CorpusError`, `RulesError`, ...) live in their
//! respective crates. Each of them maps onto an [`ErrorKind`] so the API
//! boundary can report a structured failure instead of a raw error.

use thiserror::Error;

use crate::enums::ErrorKind;

/// Errors that can be raised by any Akta crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (format, constraints, unknown enum label).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    /// Position of this error in the API-level taxonomy.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) | Self::Other(_) => ErrorKind::InvalidData,
        }
    }
}
