//! Retriever behaviour over indexes built with test embedders.

mod common;

use std::sync::Arc;
use std::time::Duration;

use akta_config::RetrievalConfig;
use akta_core::CorpusDocument;
use akta_embeddings::testing::{FailingEmbedder, HashEmbedder, SlowEmbedder};
use akta_search::{IndexHandle, Retriever};
use common::{act, fixture, retriever};

const NOTICE_QUERY: &str = "What is the notice period for resignation after 2 years of service?";

fn is_sorted_desc(scores: &[f64]) -> bool {
    scores.windows(2).all(|w| w[0] >= w[1])
}

#[tokio::test]
async fn notice_period_query_finds_the_notice_clause() {
    let embedder = Arc::new(HashEmbedder::default());
    let fx = fixture(embedder.clone());
    fx.indexer.reindex(&act(1)).await.unwrap();

    let results = retriever(&fx.handle, embedder).query(NOTICE_QUERY, 5).await;
    assert!(!results.is_empty());
    assert_eq!(
        results[0].section_path.last().map(String::as_str),
        Some("12. Notice of termination of contract")
    );
    assert!(results[0].text.contains("notice period"));
}

#[tokio::test]
async fn results_are_bounded_and_sorted() {
    let embedder = Arc::new(HashEmbedder::default());
    let fx = fixture(embedder.clone());
    fx.indexer.reindex(&act(1)).await.unwrap();
    let other = CorpusDocument::new(
        "https://example.org/epf-act-1991",
        "Employees Provident Fund Act 1991",
        "43. Rate of contribution\n\nEvery employee and employer shall contribute to the EPF at the rates in the Third Schedule.",
        act(2).fetched_at,
    );
    fx.indexer.reindex(&other).await.unwrap();
    let retriever = retriever(&fx.handle, embedder);

    for k in [1, 2, 3, 10] {
        let results = retriever.query("EPF contribution for an employee", k).await;
        assert!(results.len() <= k);
        let scores: Vec<f64> = results.iter().map(|r| r.score).collect();
        assert!(is_sorted_desc(&scores), "{scores:?}");
    }
    assert!(retriever.query("EPF", 0).await.is_empty());
}

#[tokio::test]
async fn k_is_capped_by_max_top_k() {
    let embedder = Arc::new(HashEmbedder::default());
    let fx = fixture(embedder.clone());
    fx.indexer.reindex(&act(1)).await.unwrap();
    let config = RetrievalConfig {
        max_top_k: 2,
        ..RetrievalConfig::default()
    };
    let retriever = Retriever::new(Arc::clone(&fx.handle), embedder, &config);
    assert_eq!(retriever.query("employee work hours notice", 50).await.len(), 2);
}

#[tokio::test]
async fn empty_corpus_returns_nothing() {
    let retriever = Retriever::new(
        Arc::new(IndexHandle::new()),
        Arc::new(HashEmbedder::default()),
        &RetrievalConfig::default(),
    );
    let outcome = retriever.search(NOTICE_QUERY, 5).await;
    assert!(outcome.results.is_empty());
    assert!(!outcome.partial);
}

#[tokio::test]
async fn degraded_index_still_answers_lexically() {
    let fx = fixture(Arc::new(FailingEmbedder));
    fx.indexer.reindex(&act(1)).await.unwrap();

    let outcome = retriever(&fx.handle, Arc::new(FailingEmbedder))
        .search(NOTICE_QUERY, 5)
        .await;
    assert!(outcome.lexical_only);
    assert!(!outcome.results.is_empty());
    assert_eq!(
        outcome.results[0].section_path.last().map(String::as_str),
        Some("12. Notice of termination of contract")
    );
    let scores: Vec<f64> = outcome.results.iter().map(|r| r.score).collect();
    assert!(is_sorted_desc(&scores));
    assert!(scores.iter().all(|s| *s > 0.0));
}

#[tokio::test]
async fn slow_query_embedding_falls_back_to_lexical() {
    let fx = fixture(Arc::new(HashEmbedder::default()));
    fx.indexer.reindex(&act(1)).await.unwrap();
    let config = RetrievalConfig {
        query_timeout_ms: 20,
        ..RetrievalConfig::default()
    };
    let retriever = Retriever::new(
        Arc::clone(&fx.handle),
        Arc::new(SlowEmbedder::new(Duration::from_secs(5))),
        &config,
    );

    let outcome = retriever.search(NOTICE_QUERY, 5).await;
    assert!(outcome.lexical_only);
    assert!(!outcome.results.is_empty());
}

#[tokio::test]
async fn newer_documents_win_ties() {
    let fx = fixture(Arc::new(FailingEmbedder));
    let text = "1. Overtime\n\nOvertime is paid at one and a half times the hourly rate.";
    let older = CorpusDocument::new("https://example.org/a", "A", text, act(1).fetched_at);
    let newer = CorpusDocument::new("https://example.org/b", "B", text, act(5).fetched_at);
    fx.indexer.reindex(&older).await.unwrap();
    fx.indexer.reindex(&newer).await.unwrap();

    let results = retriever(&fx.handle, Arc::new(FailingEmbedder))
        .query("overtime rate", 2)
        .await;
    assert_eq!(results.len(), 2);
    assert!((results[0].score - results[1].score).abs() < f64::EPSILON);
    assert_eq!(results[0].document_id, newer.id);
}
