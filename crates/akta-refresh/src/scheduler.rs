//! Corpus refresh scheduler.
//!
//! Each pass fetches every tracked source concurrently, normalizes it, puts
//! it in the corpus store and re-indexes only the documents whose content
//! changed. A failing source is reported and skipped; its previous version
//! stays in the live index.

use std::sync::Arc;
use std::time::Duration;

use akta_core::{AnswerError, CorpusDocument, RefreshReport, RefreshStatus, SourceOutcome};
use akta_corpus::CorpusStore;
use akta_search::Indexer;
use chrono::Utc;
use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::RefreshError;
use crate::fetch::DocumentFetcher;
use crate::normalize::{statute_document, to_text};
use crate::registry::{SourceRegistry, TrackedSource};

pub struct RefreshScheduler {
    store: Arc<CorpusStore>,
    indexer: Arc<Indexer>,
    fetcher: Arc<dyn DocumentFetcher>,
    sources: SourceRegistry,
}

impl RefreshScheduler {
    pub fn new(
        store: Arc<CorpusStore>,
        indexer: Arc<Indexer>,
        fetcher: Arc<dyn DocumentFetcher>,
        sources: SourceRegistry,
    ) -> Self {
        Self {
            store,
            indexer,
            fetcher,
            sources,
        }
    }

    #[must_use]
    pub const fn sources(&self) -> &SourceRegistry {
        &self.sources
    }

    /// Refresh one tracked source, or all of them.
    ///
    /// Never fails as a whole: every source gets an outcome, and an unknown
    /// `source_url` yields a single `failed` outcome with kind `not_found`.
    pub async fn trigger_refresh(&self, source_url: Option<&str>) -> RefreshReport {
        let started_at = Utc::now();
        let targets: Vec<&TrackedSource> = match source_url {
            Some(url) => match self.sources.get(url) {
                Some(source) => vec![source],
                None => {
                    let error = RefreshError::UnknownSource {
                        url: url.to_string(),
                    };
                    tracing::warn!(%error, "refresh: unknown source requested");
                    return RefreshReport {
                        started_at,
                        finished_at: Utc::now(),
                        outcomes: vec![SourceOutcome::failed(url, AnswerError::from(&error))],
                    };
                }
            },
            None => self.sources.iter().collect(),
        };

        let outcomes = join_all(targets.into_iter().map(|s| self.refresh_source(s))).await;
        let report = RefreshReport {
            started_at,
            finished_at: Utc::now(),
            outcomes,
        };
        tracing::info!(
            sources = report.outcomes.len(),
            created = report.count(RefreshStatus::Created),
            updated = report.count(RefreshStatus::Updated),
            unchanged = report.count(RefreshStatus::Unchanged),
            failed = report.count(RefreshStatus::Failed),
            "refresh: pass complete"
        );
        report
    }

    async fn refresh_source(&self, source: &TrackedSource) -> SourceOutcome {
        match self.try_refresh(source).await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::warn!(
                    source_url = %source.url,
                    %error,
                    "refresh: source failed, previous version stays servable"
                );
                SourceOutcome::failed(&source.url, AnswerError::from(&error))
            }
        }
    }

    async fn try_refresh(&self, source: &TrackedSource) -> Result<SourceOutcome, RefreshError> {
        let fetched = self.fetcher.fetch(&source.url).await?;
        let text = to_text(&fetched)?;
        let document = statute_document(&source.url, source.title.as_str(), &text, Utc::now());
        ingest(&self.store, &self.indexer, &document).await
    }

    /// Run a refresh pass every `interval` until `shutdown` turns `true` or
    /// its sender is dropped. The first pass starts immediately.
    pub fn spawn(self: Arc<Self>, interval: Duration, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let interval = interval.max(Duration::from_secs(1));
        tokio::spawn(async move {
            tracing::info!(
                interval_secs = interval.as_secs(),
                sources = self.sources.len(),
                "refresh: scheduler started"
            );
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        let report = self.trigger_refresh(None).await;
                        if report.has_failures() {
                            tracing::warn!(
                                failed = report.count(RefreshStatus::Failed),
                                "refresh: pass finished with failures"
                            );
                        }
                    }
                }
            }
            tracing::info!("refresh: scheduler stopped");
        })
    }
}

/// Put `document` in the store and bring its live chunk set up to date.
///
/// Created and updated documents are re-indexed. An unchanged document is
/// re-indexed only if its live chunk set is missing or degraded, which the
/// indexer decides.
///
/// # Errors
///
/// Returns [`RefreshError::Corpus`] if the store write fails, or
/// [`RefreshError::Search`] if indexing fails. After an indexing failure the
/// previous chunk set is still live.
pub async fn ingest(
    store: &CorpusStore,
    indexer: &Indexer,
    document: &CorpusDocument,
) -> Result<SourceOutcome, RefreshError> {
    let outcome = store.put(document)?;
    let status = outcome.status();
    let current = outcome.into_document();
    let report = indexer.reindex(&current).await?;

    tracing::debug!(
        source_url = %current.source_url,
        document_id = %current.id,
        %status,
        chunks = report.chunk_count,
        reused = report.reused,
        "refresh: document ingested"
    );
    Ok(SourceOutcome {
        source_url: current.source_url,
        status,
        document_id: Some(current.id),
        chunk_count: Some(report.chunk_count),
        error: None,
    })
}
