use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids;

/// One fetched version of a statutory source.
///
/// Immutable once fetched. A change in `content_hash` produces a new version
/// with the same `id`; the previous version is superseded, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CorpusDocument {
    pub id: String,
    pub source_url: String,
    pub title: String,
    /// Heading labels of the document in reading order.
    pub section_path: Vec<String>,
    pub raw_text: String,
    pub fetched_at: DateTime<Utc>,
    pub content_hash: String,
}

impl CorpusDocument {
    /// Build a document from fetched text. The text is normalized before
    /// hashing so whitespace churn does not create a new version.
    #[must_use]
    pub fn new(
        source_url: impl Into<String>,
        title: impl Into<String>,
        raw_text: &str,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let source_url = source_url.into();
        let raw_text = normalize_text(raw_text);
        Self {
            id: ids::document_id(&source_url),
            content_hash: ids::content_hash(&raw_text),
            source_url,
            title: title.into(),
            section_path: Vec::new(),
            raw_text,
            fetched_at,
        }
    }

    #[must_use]
    pub fn with_section_path(mut self, section_path: Vec<String>) -> Self {
        self.section_path = section_path;
        self
    }
}

/// Normalize line endings and whitespace: CRLF becomes LF, trailing spaces
/// are stripped, runs of blank lines collapse to one, and the text is trimmed.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;
    for line in text.replace("\r\n", "\n").replace('\r', "\n").lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
            out.push('\n');
            continue;
        }
        blank_run = 0;
        out.push_str(line);
        out.push('\n');
    }
    out.trim().to_string()
}

/// Half-open `[start, end)` range over a document's whitespace tokens.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    #[must_use]
    pub const fn len(self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

/// Retrieval unit cut from one document version.
///
/// A chunk without an embedding is `degraded` and is only reachable through
/// lexical overlap.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CorpusChunk {
    pub id: String,
    pub document_id: String,
    /// Hash of the document version the chunk was cut from.
    pub content_hash: String,
    pub chunk_index: u32,
    pub text: String,
    pub token_span: TokenSpan,
    pub section_path: Vec<String>,
    pub embedding: Option<Vec<f32>>,
    pub degraded: bool,
}
