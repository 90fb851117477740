//! Versioned, atomically swapped live index.
//!
//! The live index is a derived cache over the corpus store. Readers clone an
//! `Arc<IndexSnapshot>` once per query; writers build a new snapshot off to
//! the side and publish it with a single pointer swap, bumping `generation`.
//! A reader therefore sees either the whole old chunk set of a document or the
//! whole new one.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use akta_core::entities::CorpusChunk;
use chrono::{DateTime, Utc};

use crate::lexical;

/// A chunk with its precomputed lexical features.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk: CorpusChunk,
    /// Terms of the section path and text, for overlap scoring.
    pub terms: HashSet<String>,
    /// Phrase-normalized section path and text, for statutory-term matching.
    pub phrase: String,
}

impl IndexedChunk {
    #[must_use]
    pub fn new(chunk: CorpusChunk) -> Self {
        let searchable = format!("{}\n{}", chunk.section_path.join(" "), chunk.text);
        Self {
            terms: lexical::terms(&searchable),
            phrase: lexical::phrase_text(&searchable),
            chunk,
        }
    }
}

/// The chunk set of one document version.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub document_id: String,
    pub content_hash: String,
    pub fetched_at: DateTime<Utc>,
    pub chunks: Vec<IndexedChunk>,
}

impl IndexedDocument {
    #[must_use]
    pub fn new(
        document_id: impl Into<String>,
        content_hash: impl Into<String>,
        fetched_at: DateTime<Utc>,
        chunks: Vec<CorpusChunk>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            content_hash: content_hash.into(),
            fetched_at,
            chunks: chunks.into_iter().map(IndexedChunk::new).collect(),
        }
    }

    #[must_use]
    pub fn degraded_count(&self) -> usize {
        self.chunks.iter().filter(|c| c.chunk.degraded).count()
    }
}

/// Immutable view of the whole live index.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    pub generation: u64,
    pub documents: BTreeMap<String, Arc<IndexedDocument>>,
}

impl IndexSnapshot {
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.documents.values().map(|d| d.chunks.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.values().all(|d| d.chunks.is_empty())
    }

    #[must_use]
    pub fn document(&self, document_id: &str) -> Option<&Arc<IndexedDocument>> {
        self.documents.get(document_id)
    }
}

/// Shared handle to the current [`IndexSnapshot`].
#[derive(Debug, Default)]
pub struct IndexHandle {
    current: RwLock<Arc<IndexSnapshot>>,
    /// Serializes writers so no update is lost between read and publish.
    writer: Mutex<()>,
}

impl IndexHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot readers should use for one query.
    #[must_use]
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.snapshot().generation
    }

    /// Apply `change` to a copy of the current document map and publish the
    /// result as the next generation. Returns the new generation.
    pub fn update<F>(&self, change: F) -> u64
    where
        F: FnOnce(&mut BTreeMap<String, Arc<IndexedDocument>>),
    {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let base = self.snapshot();
        let mut documents = base.documents.clone();
        change(&mut documents);
        let next = Arc::new(IndexSnapshot {
            generation: base.generation + 1,
            documents,
        });
        let generation = next.generation;
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = next;
        generation
    }

    /// Publish `document`, replacing any chunk set it had.
    pub fn publish(&self, document: IndexedDocument) -> u64 {
        let document = Arc::new(document);
        self.update(|docs| {
            docs.insert(document.document_id.clone(), document);
        })
    }

    /// Drop a document's chunk set.
    pub fn remove(&self, document_id: &str) -> u64 {
        self.update(|docs| {
            docs.remove(document_id);
        })
    }

    /// Replace the whole index at once.
    pub fn replace_all(&self, documents: Vec<IndexedDocument>) -> u64 {
        self.update(|docs| {
            *docs = documents
                .into_iter()
                .map(|d| (d.document_id.clone(), Arc::new(d)))
                .collect();
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akta_core::entities::TokenSpan;

    fn chunk(document_id: &str, index: u32, text: &str) -> CorpusChunk {
        CorpusChunk {
            id: format!("chk-{document_id}-{index}"),
            document_id: document_id.into(),
            content_hash: "h".into(),
            chunk_index: index,
            text: text.into(),
            token_span: TokenSpan { start: 0, end: 1 },
            section_path: vec!["12. Notice of termination of contract".into()],
            embedding: None,
            degraded: true,
        }
    }

    fn document(id: &str, texts: &[&str]) -> IndexedDocument {
        let chunks = texts
            .iter()
            .zip(0u32..)
            .map(|(t, i)| chunk(id, i, t))
            .collect();
        IndexedDocument::new(id, "h", Utc::now(), chunks)
    }

    #[test]
    fn section_path_feeds_lexical_features() {
        let indexed = IndexedChunk::new(chunk("doc-a", 0, "Four weeks."));
        assert!(indexed.terms.contains("notice"));
        assert!(indexed.terms.contains("weeks"));
        assert!(indexed.phrase.contains(" notice of termination "));
    }

    #[test]
    fn publish_bumps_generation() {
        let handle = IndexHandle::new();
        assert_eq!(handle.generation(), 0);
        assert!(handle.snapshot().is_empty());
        assert_eq!(handle.publish(document("doc-a", &["a", "b"])), 1);
        assert_eq!(handle.publish(document("doc-b", &["c"])), 2);
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.chunk_count(), 3);
        assert_eq!(snapshot.document("doc-a").map(|d| d.degraded_count()), Some(2));
    }

    #[test]
    fn readers_keep_their_snapshot_across_swaps() {
        let handle = IndexHandle::new();
        handle.publish(document("doc-a", &["old one", "old two"]));
        let before = handle.snapshot();

        handle.publish(document("doc-a", &["new"]));
        assert_eq!(before.chunk_count(), 2);
        assert_eq!(handle.snapshot().chunk_count(), 1);
        assert!(handle.snapshot().generation > before.generation);
    }

    #[test]
    fn remove_and_replace_all() {
        let handle = IndexHandle::new();
        handle.publish(document("doc-a", &["a"]));
        handle.publish(document("doc-b", &["b"]));
        handle.remove("doc-a");
        assert!(handle.snapshot().document("doc-a").is_none());

        let generation = handle.replace_all(vec![document("doc-c", &["c"])]);
        let snapshot = handle.snapshot();
        assert_eq!(snapshot.generation, generation);
        assert_eq!(snapshot.documents.keys().collect::<Vec<_>>(), vec!["doc-c"]);
    }
}
