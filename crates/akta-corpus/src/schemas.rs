//! `DuckDB` table DDL for the corpus store.
//!
//! Every document version is content-addressed by `(id, content_hash)`. The
//! current version of a document is the row with `superseded_at IS NULL`.
//! Timestamps are stored as RFC 3339 text and `section_path` as a JSON array
//! in a `TEXT` column.

// ── Table DDL ──────────────────────────────────────────────────────────────

/// Document versions.
pub const CREATE_CORPUS_DOCUMENTS: &str = "
CREATE TABLE IF NOT EXISTS corpus_documents (
    id TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    source_url TEXT NOT NULL,
    title TEXT NOT NULL,
    section_path TEXT NOT NULL,
    raw_text TEXT NOT NULL,
    fetched_at TEXT NOT NULL,
    superseded_at TEXT,
    PRIMARY KEY (id, content_hash)
);
";

/// Chunk sets. One set per document, replaced as a whole.
///
/// Embeddings are stored as variable-length `FLOAT[]`; `NULL` marks a chunk
/// whose embedding could not be generated.
pub const CREATE_CORPUS_CHUNKS: &str = "
CREATE TABLE IF NOT EXISTS corpus_chunks (
    id TEXT NOT NULL,
    document_id TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    chunk_index INTEGER NOT NULL,
    text TEXT NOT NULL,
    token_start BIGINT NOT NULL,
    token_end BIGINT NOT NULL,
    section_path TEXT NOT NULL,
    embedding FLOAT[],
    degraded BOOLEAN NOT NULL DEFAULT FALSE,
    PRIMARY KEY (id)
);
";

pub const CREATE_INDEXES: &str = "
CREATE INDEX IF NOT EXISTS idx_documents_source ON corpus_documents(source_url);
CREATE INDEX IF NOT EXISTS idx_chunks_document ON corpus_chunks(document_id);
";

/// Column list shared by every document query, in `row_to_document` order.
pub const DOCUMENT_COLUMNS: &str =
    "id, content_hash, source_url, title, section_path, raw_text, fetched_at";

/// Column list shared by every chunk query, in `row_to_chunk` order.
pub const CHUNK_COLUMNS: &str = "id, document_id, content_hash, chunk_index, text, token_start, \
     token_end, section_path, CAST(embedding AS VARCHAR), degraded";
