//! Search error types for akta-search.

use akta_core::ErrorKind;

/// Errors from indexing and retrieval.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// Error from the corpus store.
    #[error("corpus error: {0}")]
    Corpus(#[from] akta_corpus::CorpusError),

    /// Error from the embedding service that could not be absorbed.
    #[error("embedding error: {0}")]
    Embedding(#[from] akta_embeddings::EmbeddingError),

    /// Document cannot be indexed (e.g. no text).
    #[error("cannot index {document_id}: {reason}")]
    InvalidDocument { document_id: String, reason: String },
}

impl SearchError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Corpus(e) => e.kind(),
            Self::Embedding(e) => e.kind(),
            Self::InvalidDocument { .. } => ErrorKind::InvalidData,
        }
    }
}
