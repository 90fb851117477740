//! Error types for akta-refresh.

use akta_core::{AnswerError, ErrorKind};

/// Errors from fetching one source document.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { status: u16, url: String },

    #[error("fetching {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    /// A `file://` source could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The source fetched fine but carries no text.
    #[error("{url} has no text content")]
    Empty { url: String },

    #[error("unsupported source URL: {url}")]
    UnsupportedScheme { url: String },
}

impl FetchError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Http(e) if e.is_timeout() => ErrorKind::Timeout,
            Self::Http(_) => ErrorKind::ServiceUnavailable,
            Self::Status { status: 404 | 410, .. } => ErrorKind::NotFound,
            Self::Status { status, .. } if *status == 429 || *status >= 500 => {
                ErrorKind::ServiceUnavailable
            }
            Self::Status { .. } | Self::Empty { .. } | Self::UnsupportedScheme { .. } => {
                ErrorKind::InvalidData
            }
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorKind::NotFound
            }
            Self::Io { .. } => ErrorKind::ServiceUnavailable,
        }
    }
}

/// Errors from refreshing or ingesting one source.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("corpus error: {0}")]
    Corpus(#[from] akta_corpus::CorpusError),

    #[error("indexing failed: {0}")]
    Search(#[from] akta_search::SearchError),

    /// The requested URL is not a tracked source.
    #[error("source is not tracked: {url}")]
    UnknownSource { url: String },
}

impl RefreshError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(e) => e.kind(),
            Self::Corpus(e) => e.kind(),
            Self::Search(e) => e.kind(),
            Self::UnknownSource { .. } => ErrorKind::NotFound,
        }
    }
}

impl From<&RefreshError> for AnswerError {
    fn from(error: &RefreshError) -> Self {
        Self::new(error.kind(), error.to_string())
    }
}
