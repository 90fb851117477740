//! Indexer behaviour against an in-memory corpus store.

mod common;

use std::sync::Arc;

use akta_embeddings::testing::{FailingEmbedder, HashEmbedder, RecordingEmbedder, SelectiveEmbedder};
use akta_search::SearchError;
use common::{act, fixture, with_store};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn reindex_is_idempotent_for_unchanged_content() {
    let fx = fixture(Arc::new(HashEmbedder::default()));
    let doc = fx.store.put(&act(1)).unwrap().into_document();

    let first = fx.indexer.reindex(&doc).await.unwrap();
    assert!(!first.reused);
    assert_eq!(first.chunk_count, 3);
    assert_eq!(first.degraded_count, 0);
    let stored_first = fx.store.chunks_for(&doc.id).unwrap();

    let second = fx.indexer.reindex(&doc).await.unwrap();
    assert!(second.reused);
    assert_eq!(second.generation, first.generation);
    assert_eq!(fx.store.chunks_for(&doc.id).unwrap(), stored_first);
}

#[tokio::test]
async fn fresh_index_reuses_stored_chunks() {
    let fx = fixture(Arc::new(HashEmbedder::default()));
    let doc = fx.store.put(&act(1)).unwrap().into_document();
    fx.indexer.reindex(&doc).await.unwrap();
    let stored = fx.store.chunks_for(&doc.id).unwrap();

    let recording = Arc::new(RecordingEmbedder::default());
    let restarted = with_store(Arc::clone(&fx.store), recording.clone());
    let report = restarted.indexer.reindex(&doc).await.unwrap();

    assert!(report.reused);
    assert!(recording.seen().is_empty());
    assert_eq!(fx.store.chunks_for(&doc.id).unwrap(), stored);
    assert_eq!(restarted.handle.snapshot().chunk_count(), stored.len());
}

#[tokio::test]
async fn rechunking_reproduces_identical_chunks() {
    let a = fixture(Arc::new(HashEmbedder::default()));
    let b = fixture(Arc::new(HashEmbedder::default()));
    let doc = act(1);
    a.indexer.reindex(&doc).await.unwrap();
    b.indexer.reindex(&doc).await.unwrap();
    assert_eq!(
        a.store.chunks_for(&doc.id).unwrap(),
        b.store.chunks_for(&doc.id).unwrap()
    );
}

#[tokio::test]
async fn embedding_input_carries_section_path() {
    let recording = Arc::new(RecordingEmbedder::default());
    let fx = fixture(recording.clone());
    fx.indexer.reindex(&act(1)).await.unwrap();
    assert!(
        recording
            .seen()
            .iter()
            .any(|t| t.starts_with("PART XII - REST DAYS") && t.contains("> 60A. Hours of work\n"))
    );
}

#[tokio::test]
async fn unavailable_embedder_degrades_every_chunk() {
    let fx = fixture(Arc::new(FailingEmbedder));
    let doc = act(1);
    let report = fx.indexer.reindex(&doc).await.unwrap();

    assert_eq!(report.chunk_count, 3);
    assert_eq!(report.degraded_count, 3);
    let stored = fx.store.chunks_for(&doc.id).unwrap();
    assert!(stored.iter().all(|c| c.degraded && c.embedding.is_none()));
}

#[tokio::test]
async fn only_failing_chunks_are_degraded() {
    let fx = fixture(Arc::new(SelectiveEmbedder::new(["Hours of work"])));
    let doc = act(1);
    let report = fx.indexer.reindex(&doc).await.unwrap();
    assert_eq!(report.degraded_count, 1);

    let stored = fx.store.chunks_for(&doc.id).unwrap();
    let degraded: Vec<&str> = stored
        .iter()
        .filter(|c| c.degraded)
        .filter_map(|c| c.section_path.last().map(String::as_str))
        .collect();
    assert_eq!(degraded, vec!["60A. Hours of work"]);
}

#[tokio::test]
async fn outage_stops_per_chunk_embedding() {
    let embedder = Arc::new(SelectiveEmbedder::unavailable_for(["Notice of termination"]));
    let fx = fixture(embedder.clone());
    let doc = act(1);
    let report = fx.indexer.reindex(&doc).await.unwrap();

    assert_eq!(report.chunk_count, 3);
    assert_eq!(report.degraded_count, 2);
    // Batch pass reaches the second chunk, the one-by-one pass stops there too.
    assert_eq!(embedder.calls(), 4);

    let stored = fx.store.chunks_for(&doc.id).unwrap();
    let degraded: Vec<bool> = stored.iter().map(|c| c.degraded).collect();
    assert_eq!(degraded, vec![false, true, true]);
}

#[tokio::test]
async fn degraded_chunk_sets_are_rebuilt_when_embeddings_return() {
    let degraded = fixture(Arc::new(FailingEmbedder));
    let doc = act(1);
    degraded.indexer.reindex(&doc).await.unwrap();

    let healthy = with_store(Arc::clone(&degraded.store), Arc::new(HashEmbedder::default()));
    let report = healthy.indexer.reindex(&doc).await.unwrap();
    assert!(!report.reused);
    assert_eq!(report.degraded_count, 0);
}

#[tokio::test]
async fn update_swaps_chunk_set_atomically() {
    let fx = fixture(Arc::new(HashEmbedder::default()));
    let v1 = fx.store.put(&act(1)).unwrap().into_document();
    fx.indexer.reindex(&v1).await.unwrap();
    let before = fx.handle.snapshot();

    let amended = format!("{}\n\n(2) Overtime is paid at one and a half times the hourly rate.", common::ACT);
    let v2 = akta_core::CorpusDocument::new(common::SOURCE, "Employment Act 1955", &amended, v1.fetched_at);
    let v2 = fx.store.put(&v2).unwrap().into_document();
    let report = fx.indexer.reindex(&v2).await.unwrap();

    let old = before.document(&v1.id).unwrap();
    assert_eq!(old.content_hash, v1.content_hash);
    assert!(old.chunks.iter().all(|c| c.chunk.content_hash == v1.content_hash));

    let after = fx.handle.snapshot();
    assert_eq!(after.generation, report.generation);
    assert!(after.generation > before.generation);
    let new = after.document(&v2.id).unwrap();
    assert_eq!(new.content_hash, v2.content_hash);
    assert!(new.chunks.iter().all(|c| c.chunk.content_hash == v2.content_hash));
}

#[tokio::test]
async fn rebuild_from_store_restores_the_index() {
    let fx = fixture(Arc::new(HashEmbedder::default()));
    let doc = fx.store.put(&act(1)).unwrap().into_document();
    fx.indexer.reindex(&doc).await.unwrap();

    let other = akta_core::CorpusDocument::new(
        "https://example.org/minimum-wages-order-2024",
        "Minimum Wages Order 2024",
        "1. Minimum wage\n\nThe minimum wage is RM1,700 per month.",
        doc.fetched_at,
    );
    fx.store.put(&other).unwrap();

    let restarted = with_store(Arc::clone(&fx.store), Arc::new(HashEmbedder::default()));
    let report = restarted.indexer.rebuild_from_store().await.unwrap();

    assert_eq!(report.documents, 2);
    assert_eq!(report.reindexed, 1);
    assert_eq!(report.degraded, 0);
    assert_eq!(report.chunks, 4);
    assert_eq!(restarted.handle.snapshot().generation, report.generation);
    assert_eq!(restarted.handle.snapshot().chunk_count(), 4);
}

#[tokio::test]
async fn remove_drops_document_everywhere() {
    let fx = fixture(Arc::new(HashEmbedder::default()));
    let doc = act(1);
    fx.indexer.reindex(&doc).await.unwrap();
    fx.indexer.remove(&doc.id).unwrap();
    assert!(fx.handle.snapshot().document(&doc.id).is_none());
    assert!(fx.store.chunks_for(&doc.id).unwrap().is_empty());
}

#[tokio::test]
async fn empty_document_is_rejected() {
    let fx = fixture(Arc::new(HashEmbedder::default()));
    let doc = akta_core::CorpusDocument::new(common::SOURCE, "Empty", "   \n\n", common::act(1).fetched_at);
    let err = fx.indexer.reindex(&doc).await.unwrap_err();
    assert!(matches!(err, SearchError::InvalidDocument { .. }));
}
