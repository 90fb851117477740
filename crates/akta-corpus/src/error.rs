//! Corpus store error types.

use akta_core::ErrorKind;

/// Errors that can occur in the corpus storage layer.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// `DuckDB` operation failed.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// No current version exists for the document.
    #[error("Document not found: {document_id}")]
    NotFound { document_id: String },

    /// The document's id does not belong to its `source_url`.
    #[error("Invalid document {document_id}: {reason}")]
    InvalidDocument { document_id: String, reason: String },

    /// A stored column could not be decoded.
    #[error("Corrupt row in {table}: {reason}")]
    CorruptRow { table: &'static str, reason: String },

    /// JSON column (de)serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A writer panicked while holding the connection.
    #[error("Corpus store lock poisoned")]
    LockPoisoned,
}

impl CorpusError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DuckDb(_) | Self::LockPoisoned => ErrorKind::ServiceUnavailable,
            Self::InvalidDocument { .. } | Self::CorruptRow { .. } | Self::Serialization(_) => {
                ErrorKind::InvalidData
            }
        }
    }
}
