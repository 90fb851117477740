use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use akta_compose::{Composer, OpenAiCompatible};
use akta_config::{AktaConfig, EmbeddingConfig};
use akta_corpus::CorpusStore;
use akta_embeddings::{DisabledEmbedder, EmbeddingService, LocalEmbedder, TimeoutEmbedder};
use akta_refresh::{HttpFetcher, RefreshScheduler, SourceRegistry};
use akta_rules::RulesEngine;
use akta_search::{IndexHandle, Indexer, Retriever};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub config: AktaConfig,
    pub store: Arc<CorpusStore>,
    pub indexer: Arc<Indexer>,
    pub composer: Composer,
    pub scheduler: Arc<RefreshScheduler>,
}

impl AppContext {
    /// Open the corpus, rebuild the live index from it, and wire the
    /// composer and the refresh scheduler.
    pub async fn init(config: AktaConfig) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.general.data_dir)
            .with_context(|| format!("failed to create data dir {}", config.general.data_dir))?;

        let corpus_path = config.general.corpus_path();
        let store = Arc::new(
            CorpusStore::open_local(&corpus_path)
                .with_context(|| format!("failed to open corpus {}", corpus_path.display()))?,
        );

        let embedder = build_embedder(&config.embedding, &config.general.model_cache_dir());
        let handle = Arc::new(IndexHandle::new());
        let indexer = Arc::new(Indexer::new(
            Arc::clone(&store),
            Arc::clone(&embedder),
            Arc::clone(&handle),
            config.indexer.max_chunk_tokens,
        ));
        let rebuilt = indexer
            .rebuild_from_store()
            .await
            .context("failed to rebuild index from corpus")?;
        tracing::debug!(
            documents = rebuilt.documents,
            chunks = rebuilt.chunks,
            "cli: index ready"
        );

        let retriever = Arc::new(Retriever::new(handle, embedder, &config.retrieval));
        let rules = Arc::new(
            RulesEngine::from_config(&config.rules).context("failed to load rule table")?,
        );
        if !config.generation.is_configured() {
            tracing::warn!("cli: generation endpoint or model unset, answers will be rules-only");
        }
        let generator = Arc::new(OpenAiCompatible::new(&config.generation));
        let composer = Composer::new(
            retriever,
            rules,
            generator,
            &config.composer,
            config.generation.max_tokens,
        );

        let scheduler = Arc::new(RefreshScheduler::new(
            Arc::clone(&store),
            Arc::clone(&indexer),
            Arc::new(HttpFetcher::from_config(&config.refresh)),
            SourceRegistry::from_config(&config.refresh),
        ));

        Ok(Self {
            config,
            store,
            indexer,
            composer,
            scheduler,
        })
    }
}

/// The configured embedder behind a timeout. A model that fails to load
/// leaves retrieval lexical-only instead of failing startup.
fn build_embedder(config: &EmbeddingConfig, cache_dir: &std::path::Path) -> Arc<dyn EmbeddingService> {
    let inner: Arc<dyn EmbeddingService> = if config.is_enabled() {
        match LocalEmbedder::new(cache_dir) {
            Ok(embedder) => Arc::new(embedder),
            Err(error) => {
                tracing::warn!(%error, "cli: embedding model unavailable, retrieval is lexical only");
                Arc::new(DisabledEmbedder)
            }
        }
    } else {
        Arc::new(DisabledEmbedder)
    };
    Arc::new(TimeoutEmbedder::new(
        inner,
        Duration::from_millis(config.timeout_ms),
    ))
}
