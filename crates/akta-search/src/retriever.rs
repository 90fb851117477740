//! Retriever: top-k chunks for a query over the live index snapshot.
//!
//! Score = semantic component + `lexical_boost` x statutory-term fraction.
//! The semantic component is `(cos + 1) / 2` of query and chunk embeddings,
//! or the lexical-overlap ratio when either side has no usable embedding.

use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use akta_config::RetrievalConfig;
use akta_core::RetrievalResult;
use akta_embeddings::{EmbeddingService, cosine_similarity};
use serde::Serialize;

use crate::index::{IndexHandle, IndexedChunk, IndexedDocument};
use crate::lexical::{self, StatutoryTerms};

/// Chunks scored between deadline checks.
const DEADLINE_CHECK_EVERY: usize = 64;

/// Results of one [`Retriever::search`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrievalOutcome {
    /// Ordered by descending score.
    pub results: Vec<RetrievalResult>,
    /// The query timeout hit before every chunk was scored.
    pub partial: bool,
    /// The query could not be embedded; every score is lexical.
    pub lexical_only: bool,
}

pub struct Retriever {
    handle: Arc<IndexHandle>,
    embedder: Arc<dyn EmbeddingService>,
    terms: StatutoryTerms,
    default_k: usize,
    max_k: usize,
    lexical_boost: f64,
    timeout: Duration,
}

impl Retriever {
    pub fn new(
        handle: Arc<IndexHandle>,
        embedder: Arc<dyn EmbeddingService>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            handle,
            embedder,
            terms: StatutoryTerms::new(&config.statutory_terms),
            default_k: config.top_k,
            max_k: config.max_top_k,
            lexical_boost: config.lexical_boost,
            timeout: Duration::from_millis(config.query_timeout_ms),
        }
    }

    /// Configured `k` for callers that do not choose one.
    #[must_use]
    pub const fn default_k(&self) -> usize {
        self.default_k
    }

    /// Up to `k` results ordered by descending score.
    pub async fn query(&self, text: &str, k: usize) -> Vec<RetrievalResult> {
        self.search(text, k).await.results
    }

    /// Score the live index against `text` within the query timeout.
    ///
    /// Never fails: an unavailable embedding service falls back to lexical
    /// scoring, and a timeout returns whatever was scored so far.
    pub async fn search(&self, text: &str, k: usize) -> RetrievalOutcome {
        let k = k.min(self.max_k);
        let snapshot = self.handle.snapshot();
        if k == 0 || snapshot.is_empty() {
            return RetrievalOutcome::default();
        }

        let started = Instant::now();
        let deadline = started + self.timeout;

        let query_vector = match tokio::time::timeout(self.timeout, self.embedder.embed(text)).await
        {
            Ok(Ok(vector)) => Some(vector),
            Ok(Err(error)) => {
                tracing::warn!(%error, "retriever: query embedding failed, scoring lexically");
                None
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    "retriever: query embedding timed out, scoring lexically"
                );
                None
            }
        };

        let query = Query {
            terms: lexical::terms(text),
            phrase: lexical::phrase_text(text),
            vector: query_vector.as_deref(),
        };

        let mut scored: Vec<(f64, &IndexedDocument, &IndexedChunk)> = Vec::new();
        let mut partial = false;
        let mut seen = 0usize;
        'documents: for document in snapshot.documents.values() {
            for chunk in &document.chunks {
                if seen % DEADLINE_CHECK_EVERY == 0 && seen > 0 && Instant::now() >= deadline {
                    partial = true;
                    break 'documents;
                }
                seen += 1;
                let score = self.score(&query, chunk);
                if score > 0.0 {
                    scored.push((score, document, chunk));
                }
            }
        }
        if partial {
            tracing::warn!(
                scored = seen,
                total = snapshot.chunk_count(),
                "retriever: query timeout, returning partial results"
            );
        }

        scored.sort_by(|a, b| rank(a, b));
        scored.truncate(k);

        let results: Vec<RetrievalResult> = scored
            .into_iter()
            .map(|(score, document, indexed)| RetrievalResult {
                chunk_id: indexed.chunk.id.clone(),
                score,
                document_id: document.document_id.clone(),
                section_path: indexed.chunk.section_path.clone(),
                text: indexed.chunk.text.clone(),
                fetched_at: document.fetched_at,
            })
            .collect();

        tracing::debug!(
            results = results.len(),
            generation = snapshot.generation,
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "retriever: query scored"
        );
        RetrievalOutcome {
            results,
            partial,
            lexical_only: query_vector.is_none(),
        }
    }

    fn score(&self, query: &Query<'_>, indexed: &IndexedChunk) -> f64 {
        let semantic = match (query.vector, indexed.chunk.embedding.as_deref()) {
            (Some(q), Some(c)) if !indexed.chunk.degraded && q.len() == c.len() => {
                f64::midpoint(cosine_similarity(q, c), 1.0)
            }
            _ => lexical::overlap_ratio(&query.terms, &indexed.terms),
        };
        let boost = self.terms.boost_fraction(&query.phrase, &indexed.phrase);
        self.lexical_boost.mul_add(boost, semantic)
    }
}

struct Query<'a> {
    terms: std::collections::HashSet<String>,
    phrase: String,
    vector: Option<&'a [f32]>,
}

/// Descending score, then newer `fetched_at`, then `document_id`, then chunk id.
fn rank(
    a: &(f64, &IndexedDocument, &IndexedChunk),
    b: &(f64, &IndexedDocument, &IndexedChunk),
) -> Ordering {
    b.0.total_cmp(&a.0)
        .then_with(|| b.1.fetched_at.cmp(&a.1.fetched_at))
        .then_with(|| a.1.document_id.cmp(&b.1.document_id))
        .then_with(|| a.2.chunk.id.cmp(&b.2.chunk.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use akta_core::CorpusChunk;
    use akta_core::entities::TokenSpan;
    use chrono::{TimeZone, Utc};

    fn indexed(document_id: &str, day: u32, chunk_id: &str) -> IndexedDocument {
        let chunk = CorpusChunk {
            id: chunk_id.into(),
            document_id: document_id.into(),
            content_hash: "h".into(),
            chunk_index: 0,
            text: "EPF".into(),
            token_span: TokenSpan { start: 0, end: 1 },
            section_path: Vec::new(),
            embedding: None,
            degraded: true,
        };
        IndexedDocument::new(
            document_id,
            "h",
            Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap(),
            vec![chunk],
        )
    }

    #[test]
    fn ties_prefer_recent_then_document_id() {
        let old = indexed("doc-a", 1, "chk-1");
        let new = indexed("doc-b", 2, "chk-2");
        let same_day = indexed("doc-c", 2, "chk-3");
        let mut rows = vec![
            (0.5, &old, &old.chunks[0]),
            (0.5, &same_day, &same_day.chunks[0]),
            (0.5, &new, &new.chunks[0]),
            (0.9, &old, &old.chunks[0]),
        ];
        rows.sort_by(|a, b| rank(a, b));
        let order: Vec<(f64, &str)> = rows
            .iter()
            .map(|(s, d, _)| (*s, d.document_id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![(0.9, "doc-a"), (0.5, "doc-b"), (0.5, "doc-c"), (0.5, "doc-a")]
        );
    }
}
