//! Embedding service configuration.

use serde::{Deserialize, Serialize};

/// Which embedding backend the indexer and retriever use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingProvider {
    /// Local fastembed model (`AllMiniLML6V2`, 384 dimensions).
    #[default]
    Fastembed,
    /// No embeddings: every chunk is degraded and retrieval is lexical only.
    Disabled,
}

const fn default_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub provider: EmbeddingProvider,

    /// Per-call timeout for embedding a chunk batch or a query.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl EmbeddingConfig {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.provider != EmbeddingProvider::Disabled
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::default(),
            timeout_ms: default_timeout_ms(),
        }
    }
}
