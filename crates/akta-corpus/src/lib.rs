//! # akta-corpus
//!
//! `DuckDB` storage for normalized statutory text.
//!
//! The store holds every fetched version of every tracked source, keyed by
//! `(document id, content_hash)`, plus one chunk set per document. It is the
//! source of truth; the search index is rebuilt from it.
//!
//! Reads and writes go through one connection guarded by a mutex, so a single
//! [`CorpusStore`] can be shared between query paths and the refresh task.

pub mod error;
pub mod schemas;
pub mod store;

pub use error::CorpusError;
pub use store::PutOutcome;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use duckdb::Connection;

/// Local `DuckDB` corpus store.
pub struct CorpusStore {
    conn: Mutex<Connection>,
}

impl CorpusStore {
    /// Open or create a corpus file. Creates the schema if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::DuckDb`] if the file cannot be opened or schema creation fails.
    pub fn open_local(path: impl AsRef<Path>) -> Result<Self, CorpusError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory store (for testing).
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::DuckDb`] if schema creation fails.
    pub fn open_in_memory() -> Result<Self, CorpusError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, CorpusError> {
        conn.execute_batch(schemas::CREATE_CORPUS_DOCUMENTS)?;
        conn.execute_batch(schemas::CREATE_CORPUS_CHUNKS)?;
        conn.execute_batch(schemas::CREATE_INDEXES)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>, CorpusError> {
        self.conn.lock().map_err(|_| CorpusError::LockPoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creation() {
        let store = CorpusStore::open_in_memory().expect("open in-memory store");
        let conn = store.conn().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT table_name FROM information_schema.tables
                 WHERE table_schema = 'main'
                 ORDER BY table_name",
            )
            .unwrap();
        let tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(tables, vec!["corpus_chunks", "corpus_documents"]);
    }

    #[test]
    fn reopening_a_file_keeps_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.duckdb");
        drop(CorpusStore::open_local(&path).unwrap());
        let store = CorpusStore::open_local(&path).unwrap();
        assert_eq!(store.document_count().unwrap(), 0);
    }
}
