//! Typed read/write methods for the corpus store.
//!
//! Embeddings are written with parameterized `INSERT` and a `::FLOAT[]` cast
//! from a string-serialized array, and read back through `CAST(... AS VARCHAR)`.

use akta_core::{CorpusChunk, CorpusDocument, RefreshStatus, entities::TokenSpan, ids};
use chrono::{DateTime, SecondsFormat, Utc};
use duckdb::{Connection, params};

use crate::schemas::{CHUNK_COLUMNS, DOCUMENT_COLUMNS};
use crate::{CorpusError, CorpusStore};

/// Result of [`CorpusStore::put`], carrying the current version afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    /// First version for this `source_url`.
    Created(CorpusDocument),
    /// New content; the previous version is now superseded.
    Updated {
        current: CorpusDocument,
        previous_hash: String,
    },
    /// Same `content_hash` as the current version; nothing was written.
    Unchanged(CorpusDocument),
}

impl PutOutcome {
    /// The current version of the document.
    #[must_use]
    pub const fn document(&self) -> &CorpusDocument {
        match self {
            Self::Created(doc) | Self::Unchanged(doc) | Self::Updated { current: doc, .. } => doc,
        }
    }

    #[must_use]
    pub fn into_document(self) -> CorpusDocument {
        match self {
            Self::Created(doc) | Self::Unchanged(doc) | Self::Updated { current: doc, .. } => doc,
        }
    }

    /// Whether the document needs re-indexing.
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        !matches!(self, Self::Unchanged(_))
    }

    #[must_use]
    pub const fn status(&self) -> RefreshStatus {
        match self {
            Self::Created(_) => RefreshStatus::Created,
            Self::Updated { .. } => RefreshStatus::Updated,
            Self::Unchanged(_) => RefreshStatus::Unchanged,
        }
    }
}

/// Format a `Vec<f32>` as a `DuckDB` array literal string: `[0.1, 0.2, ...]`.
fn vec_to_sql(v: &[f32]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(v.len() * 10 + 2);
    s.push('[');
    for (i, x) in v.iter().enumerate() {
        if i > 0 {
            s.push_str(", ");
        }
        let _ = write!(s, "{x}");
    }
    s.push(']');
    s
}

fn timestamp_to_sql(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn parse_timestamp(table: &'static str, raw: &str) -> Result<DateTime<Utc>, CorpusError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| CorpusError::CorruptRow {
            table,
            reason: format!("timestamp '{raw}': {e}"),
        })
}

fn to_sql_int(table: &'static str, value: usize) -> Result<i64, CorpusError> {
    i64::try_from(value).map_err(|_| CorpusError::CorruptRow {
        table,
        reason: format!("{value} does not fit BIGINT"),
    })
}

fn from_sql_int<T: TryFrom<i64>>(table: &'static str, value: i64) -> Result<T, CorpusError> {
    T::try_from(value).map_err(|_| CorpusError::CorruptRow {
        table,
        reason: format!("integer {value} out of range"),
    })
}

/// Document row exactly as read from `DuckDB`, before decoding.
struct DocumentRow {
    id: String,
    content_hash: String,
    source_url: String,
    title: String,
    section_path: String,
    raw_text: String,
    fetched_at: String,
}

impl DocumentRow {
    fn from_row(row: &duckdb::Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            content_hash: row.get(1)?,
            source_url: row.get(2)?,
            title: row.get(3)?,
            section_path: row.get(4)?,
            raw_text: row.get(5)?,
            fetched_at: row.get(6)?,
        })
    }

    fn decode(self) -> Result<CorpusDocument, CorpusError> {
        Ok(CorpusDocument {
            id: self.id,
            source_url: self.source_url,
            title: self.title,
            section_path: serde_json::from_str(&self.section_path)?,
            raw_text: self.raw_text,
            fetched_at: parse_timestamp("corpus_documents", &self.fetched_at)?,
            content_hash: self.content_hash,
        })
    }
}

/// Chunk row exactly as read from `DuckDB`, before decoding.
struct ChunkRow {
    id: String,
    document_id: String,
    content_hash: String,
    chunk_index: i64,
    text: String,
    token_start: i64,
    token_end: i64,
    section_path: String,
    embedding: Option<String>,
    degraded: bool,
}

impl ChunkRow {
    fn from_row(row: &duckdb::Row<'_>) -> duckdb::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            document_id: row.get(1)?,
            content_hash: row.get(2)?,
            chunk_index: row.get(3)?,
            text: row.get(4)?,
            token_start: row.get(5)?,
            token_end: row.get(6)?,
            section_path: row.get(7)?,
            embedding: row.get(8)?,
            degraded: row.get(9)?,
        })
    }

    fn decode(self) -> Result<CorpusChunk, CorpusError> {
        const TABLE: &str = "corpus_chunks";
        let embedding = match self.embedding {
            Some(raw) => Some(serde_json::from_str::<Vec<f32>>(&raw)?),
            None => None,
        };
        Ok(CorpusChunk {
            id: self.id,
            document_id: self.document_id,
            content_hash: self.content_hash,
            chunk_index: from_sql_int(TABLE, self.chunk_index)?,
            text: self.text,
            token_span: TokenSpan {
                start: from_sql_int(TABLE, self.token_start)?,
                end: from_sql_int(TABLE, self.token_end)?,
            },
            section_path: serde_json::from_str(&self.section_path)?,
            embedding,
            degraded: self.degraded,
        })
    }
}

fn current_version(conn: &Connection, document_id: &str) -> Result<Option<CorpusDocument>, CorpusError> {
    let sql = format!(
        "SELECT {DOCUMENT_COLUMNS} FROM corpus_documents
         WHERE id = ? AND superseded_at IS NULL"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query_map(params![document_id], DocumentRow::from_row)?;
    rows.next().transpose()?.map(DocumentRow::decode).transpose()
}

impl CorpusStore {
    /// Upsert a document version by `source_url`, comparing `content_hash`.
    ///
    /// An update supersedes the prior version but leaves its chunks in place;
    /// they are replaced by the next [`Self::store_chunks`] call.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::InvalidDocument`] if the document's id is not the
    /// id derived from its `source_url`, or [`CorpusError::DuckDb`] on write failure.
    pub fn put(&self, document: &CorpusDocument) -> Result<PutOutcome, CorpusError> {
        let expected_id = ids::document_id(&document.source_url);
        if document.id != expected_id {
            return Err(CorpusError::InvalidDocument {
                document_id: document.id.clone(),
                reason: format!(
                    "id does not match source {} (expected {expected_id})",
                    document.source_url
                ),
            });
        }

        let mut conn = self.conn()?;
        let existing = current_version(&conn, &document.id)?;
        if let Some(current) = &existing {
            if current.content_hash == document.content_hash {
                tracing::debug!(document_id = %document.id, "corpus: content unchanged");
                return Ok(PutOutcome::Unchanged(current.clone()));
            }
        }

        let tx = conn.transaction()?;
        if existing.is_some() {
            tx.execute(
                "UPDATE corpus_documents SET superseded_at = ?
                 WHERE id = ? AND superseded_at IS NULL",
                params![timestamp_to_sql(Utc::now()), document.id],
            )?;
        }
        // A source may revert to content it had before; that version row is revived.
        tx.execute(
            "INSERT INTO corpus_documents
             (id, content_hash, source_url, title, section_path, raw_text, fetched_at, superseded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, NULL)
             ON CONFLICT (id, content_hash) DO UPDATE SET
                title = excluded.title,
                section_path = excluded.section_path,
                fetched_at = excluded.fetched_at,
                superseded_at = NULL",
            params![
                document.id,
                document.content_hash,
                document.source_url,
                document.title,
                serde_json::to_string(&document.section_path)?,
                document.raw_text,
                timestamp_to_sql(document.fetched_at),
            ],
        )?;
        tx.commit()?;

        Ok(match existing {
            None => {
                tracing::info!(document_id = %document.id, source_url = %document.source_url, "corpus: document created");
                PutOutcome::Created(document.clone())
            }
            Some(previous) => {
                tracing::info!(
                    document_id = %document.id,
                    previous_hash = %previous.content_hash,
                    content_hash = %document.content_hash,
                    "corpus: document updated"
                );
                PutOutcome::Updated {
                    current: document.clone(),
                    previous_hash: previous.content_hash,
                }
            }
        })
    }

    /// Current version of a document.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::NotFound`] if no current version exists.
    pub fn get(&self, document_id: &str) -> Result<CorpusDocument, CorpusError> {
        let conn = self.conn()?;
        current_version(&conn, document_id)?.ok_or_else(|| CorpusError::NotFound {
            document_id: document_id.to_string(),
        })
    }

    /// Current version of the document tracked for `source_url`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::DuckDb`] if the query fails.
    pub fn get_by_source(&self, source_url: &str) -> Result<Option<CorpusDocument>, CorpusError> {
        let conn = self.conn()?;
        current_version(&conn, &ids::document_id(source_url))
    }

    /// Latest version of every tracked document, ordered by `source_url`.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::DuckDb`] if the query fails.
    pub fn list_current(&self) -> Result<Vec<CorpusDocument>, CorpusError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM corpus_documents
             WHERE superseded_at IS NULL
             ORDER BY source_url"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], DocumentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(DocumentRow::decode).collect()
    }

    /// Every stored version of a document, newest fetch first.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::DuckDb`] if the query fails.
    pub fn versions(&self, document_id: &str) -> Result<Vec<CorpusDocument>, CorpusError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {DOCUMENT_COLUMNS} FROM corpus_documents
             WHERE id = ?
             ORDER BY fetched_at DESC"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![document_id], DocumentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(DocumentRow::decode).collect()
    }

    /// Number of tracked documents (current versions only).
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::DuckDb`] if the query fails.
    pub fn document_count(&self) -> Result<usize, CorpusError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM corpus_documents WHERE superseded_at IS NULL",
            [],
            |row| row.get(0),
        )?;
        from_sql_int("corpus_documents", count)
    }

    /// Replace the chunk set of `document_id` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::InvalidDocument`] if a chunk belongs to another
    /// document, or [`CorpusError::DuckDb`] if the write fails (the old set is kept).
    pub fn store_chunks(&self, document_id: &str, chunks: &[CorpusChunk]) -> Result<(), CorpusError> {
        const TABLE: &str = "corpus_chunks";
        if let Some(stray) = chunks.iter().find(|c| c.document_id != document_id) {
            return Err(CorpusError::InvalidDocument {
                document_id: document_id.to_string(),
                reason: format!("chunk {} belongs to {}", stray.id, stray.document_id),
            });
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM corpus_chunks WHERE document_id = ?",
            params![document_id],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO corpus_chunks (
                    id, document_id, content_hash, chunk_index, text,
                    token_start, token_end, section_path, embedding, degraded
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?::FLOAT[], ?)",
            )?;
            for chunk in chunks {
                let embedding_sql = chunk.embedding.as_deref().map(vec_to_sql);
                stmt.execute(params![
                    chunk.id,
                    chunk.document_id,
                    chunk.content_hash,
                    i64::from(chunk.chunk_index),
                    chunk.text,
                    to_sql_int(TABLE, chunk.token_span.start)?,
                    to_sql_int(TABLE, chunk.token_span.end)?,
                    serde_json::to_string(&chunk.section_path)?,
                    embedding_sql,
                    chunk.degraded,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!(document_id, chunks = chunks.len(), "corpus: chunk set replaced");
        Ok(())
    }

    /// Stored chunk set of a document, ordered by `chunk_index`.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::DuckDb`] if the query fails.
    pub fn chunks_for(&self, document_id: &str) -> Result<Vec<CorpusChunk>, CorpusError> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {CHUNK_COLUMNS} FROM corpus_chunks
             WHERE document_id = ?
             ORDER BY chunk_index"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![document_id], ChunkRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(ChunkRow::decode).collect()
    }

    /// Drop a document's chunk set.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::DuckDb`] if the delete fails.
    pub fn delete_chunks(&self, document_id: &str) -> Result<usize, CorpusError> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM corpus_chunks WHERE document_id = ?",
            params![document_id],
        )?;
        Ok(deleted)
    }
}
