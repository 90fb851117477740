//! Indexer: chunk, embed, persist and publish one document version.

use std::sync::Arc;

use akta_core::{CorpusChunk, CorpusDocument, ids};
use akta_corpus::CorpusStore;
use akta_embeddings::EmbeddingService;
use serde::Serialize;

use crate::chunker::{StatuteChunk, chunk_statute};
use crate::error::SearchError;
use crate::index::{IndexHandle, IndexedDocument};

/// Result of [`Indexer::reindex`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReindexReport {
    pub document_id: String,
    pub chunk_count: usize,
    pub degraded_count: usize,
    /// Index generation serving the chunk set afterwards.
    pub generation: u64,
    /// The existing chunk set was kept as is.
    pub reused: bool,
}

/// Result of [`Indexer::rebuild_from_store`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    pub documents: usize,
    pub chunks: usize,
    pub degraded: usize,
    /// Documents whose stored chunk set was missing or stale and was rebuilt.
    pub reindexed: usize,
    pub generation: u64,
}

pub struct Indexer {
    store: Arc<CorpusStore>,
    embedder: Arc<dyn EmbeddingService>,
    handle: Arc<IndexHandle>,
    max_chunk_tokens: usize,
}

impl Indexer {
    pub fn new(
        store: Arc<CorpusStore>,
        embedder: Arc<dyn EmbeddingService>,
        handle: Arc<IndexHandle>,
        max_chunk_tokens: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            handle,
            max_chunk_tokens: max_chunk_tokens.max(1),
        }
    }

    #[must_use]
    pub fn handle(&self) -> &Arc<IndexHandle> {
        &self.handle
    }

    /// Bring the live chunk set of `document` up to date.
    ///
    /// A chunk set already built from the same `content_hash` without
    /// degraded chunks is reused. Otherwise the text is chunked and embedded;
    /// chunks whose embedding fails are kept as degraded. The new set is
    /// stored, then swapped into the live index in one step, so queries keep
    /// seeing the previous set until then.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidDocument`] for a document without text,
    /// or [`SearchError::Corpus`] if the chunk set cannot be stored.
    pub async fn reindex(&self, document: &CorpusDocument) -> Result<ReindexReport, SearchError> {
        if document.raw_text.trim().is_empty() {
            return Err(SearchError::InvalidDocument {
                document_id: document.id.clone(),
                reason: "document has no text".into(),
            });
        }

        if let Some(live) = self.handle.snapshot().document(&document.id) {
            if live.content_hash == document.content_hash && live.degraded_count() == 0 {
                tracing::debug!(document_id = %document.id, "indexer: live chunk set is current");
                return Ok(ReindexReport {
                    document_id: document.id.clone(),
                    chunk_count: live.chunks.len(),
                    degraded_count: 0,
                    generation: self.handle.generation(),
                    reused: true,
                });
            }
        }

        let stored = self.store.chunks_for(&document.id)?;
        if is_complete(&stored, document) {
            let chunk_count = stored.len();
            let generation = self.handle.publish(IndexedDocument::new(
                &document.id,
                &document.content_hash,
                document.fetched_at,
                stored,
            ));
            tracing::debug!(document_id = %document.id, generation, "indexer: stored chunk set reused");
            return Ok(ReindexReport {
                document_id: document.id.clone(),
                chunk_count,
                degraded_count: 0,
                generation,
                reused: true,
            });
        }

        let chunks = self.build_chunks(document).await;
        self.store.store_chunks(&document.id, &chunks)?;

        let indexed = IndexedDocument::new(
            &document.id,
            &document.content_hash,
            document.fetched_at,
            chunks,
        );
        let chunk_count = indexed.chunks.len();
        let degraded_count = indexed.degraded_count();
        let generation = self.handle.publish(indexed);

        tracing::info!(
            document_id = %document.id,
            chunks = chunk_count,
            degraded = degraded_count,
            generation,
            "indexer: chunk set swapped in"
        );
        Ok(ReindexReport {
            document_id: document.id.clone(),
            chunk_count,
            degraded_count,
            generation,
            reused: false,
        })
    }

    /// Reconstruct the live index from the corpus store alone. Documents
    /// whose stored chunk set is missing or stale are re-chunked.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Corpus`] if the store cannot be read or written.
    pub async fn rebuild_from_store(&self) -> Result<RebuildReport, SearchError> {
        let documents = self.store.list_current()?;
        let mut indexed = Vec::with_capacity(documents.len());
        let mut reindexed = 0usize;

        for document in &documents {
            let stored = self.store.chunks_for(&document.id)?;
            let chunks = if stored.first().is_some_and(|c| c.content_hash == document.content_hash) {
                stored
            } else {
                reindexed += 1;
                let chunks = self.build_chunks(document).await;
                self.store.store_chunks(&document.id, &chunks)?;
                chunks
            };
            indexed.push(IndexedDocument::new(
                &document.id,
                &document.content_hash,
                document.fetched_at,
                chunks,
            ));
        }

        let chunks = indexed.iter().map(|d| d.chunks.len()).sum();
        let degraded = indexed.iter().map(IndexedDocument::degraded_count).sum();
        let generation = self.handle.replace_all(indexed);
        tracing::info!(
            documents = documents.len(),
            chunks,
            degraded,
            reindexed,
            generation,
            "indexer: index rebuilt from corpus store"
        );
        Ok(RebuildReport {
            documents: documents.len(),
            chunks,
            degraded,
            reindexed,
            generation,
        })
    }

    /// Drop a document from the live index and the store.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Corpus`] if the stored chunks cannot be deleted.
    pub fn remove(&self, document_id: &str) -> Result<u64, SearchError> {
        self.store.delete_chunks(document_id)?;
        Ok(self.handle.remove(document_id))
    }

    async fn build_chunks(&self, document: &CorpusDocument) -> Vec<CorpusChunk> {
        let pieces = chunk_statute(&document.raw_text, self.max_chunk_tokens);
        let inputs: Vec<String> = pieces.iter().map(embedding_input).collect();
        let embeddings = self.embed_all(&document.id, &inputs).await;

        pieces
            .into_iter()
            .zip(embeddings)
            .zip(0u32..)
            .map(|((piece, embedding), chunk_index)| CorpusChunk {
                id: ids::chunk_id(&document.id, &document.content_hash, chunk_index as usize),
                document_id: document.id.clone(),
                content_hash: document.content_hash.clone(),
                chunk_index,
                text: piece.text,
                token_span: piece.token_span,
                section_path: piece.section_path,
                degraded: embedding.is_none(),
                embedding,
            })
            .collect()
    }

    /// One embedding per input; `None` where the service failed.
    async fn embed_all(&self, document_id: &str, inputs: &[String]) -> Vec<Option<Vec<f32>>> {
        match self.embedder.embed_batch(inputs).await {
            Ok(vectors) if vectors.len() == inputs.len() => {
                return vectors.into_iter().map(Some).collect();
            }
            Ok(vectors) => tracing::warn!(
                document_id,
                expected = inputs.len(),
                got = vectors.len(),
                "indexer: batch embedding returned wrong count, embedding one by one"
            ),
            Err(error) => tracing::warn!(
                document_id,
                %error,
                "indexer: batch embedding failed, embedding one by one"
            ),
        }

        let mut out = Vec::with_capacity(inputs.len());
        for (chunk_index, input) in inputs.iter().enumerate() {
            match self.embedder.embed(input).await {
                Ok(vector) => out.push(Some(vector)),
                Err(error) if error.is_outage() => {
                    tracing::warn!(
                        document_id,
                        chunk_index,
                        remaining = inputs.len() - chunk_index,
                        %error,
                        "indexer: embedding service down, remaining chunks marked degraded"
                    );
                    out.resize(inputs.len(), None);
                    break;
                }
                Err(error) => {
                    tracing::warn!(
                        document_id,
                        chunk_index,
                        %error,
                        "indexer: embedding failed, chunk marked degraded"
                    );
                    out.push(None);
                }
            }
        }
        out
    }
}

/// Text sent to the embedding service: breadcrumb, then passage.
fn embedding_input(chunk: &StatuteChunk) -> String {
    if chunk.section_path.is_empty() {
        chunk.text.clone()
    } else {
        format!("{}\n{}", chunk.section_path.join(" > "), chunk.text)
    }
}

/// Stored chunks were cut from this version and every one has an embedding.
fn is_complete(stored: &[CorpusChunk], document: &CorpusDocument) -> bool {
    !stored.is_empty()
        && stored
            .iter()
            .all(|c| c.content_hash == document.content_hash && !c.degraded)
}
