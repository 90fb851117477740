//! # akta-embeddings
//!
//! Embedding service seam for Akta, plus a local implementation backed by
//! fastembed (ONNX runtime, `AllMiniLML6V2`, 384 dimensions).
//!
//! Callers hold an `Arc<dyn EmbeddingService>`. A failing service never fails
//! indexing or retrieval: chunks without embeddings are marked degraded and
//! scored lexically instead.
//!
//! ## Async usage
//!
//! The fastembed runtime is synchronous. [`LocalEmbedder`] runs it on the
//! blocking pool via [`tokio::task::spawn_blocking`].

pub mod engine;
pub mod error;
pub mod testing;

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

pub use engine::EmbeddingEngine;
pub use error::EmbeddingError;

/// External embedding service: `embed(text) -> vector`.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Embed one text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed several texts, one vector per input in input order.
    ///
    /// The default calls [`Self::embed`] once per text and stops at the first error.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

// ---------------------------------------------------------------------------
// LocalEmbedder
// ---------------------------------------------------------------------------

/// [`EmbeddingService`] over a local [`EmbeddingEngine`].
pub struct LocalEmbedder {
    engine: Arc<Mutex<EmbeddingEngine>>,
}

impl LocalEmbedder {
    /// Load the model, downloading it into `cache_dir` on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::InitFailed`] if the model cannot be loaded.
    pub fn new(cache_dir: &Path) -> Result<Self, EmbeddingError> {
        let engine = EmbeddingEngine::new(cache_dir)?;
        tracing::debug!(cache_dir = %cache_dir.display(), "embeddings: fastembed model loaded");
        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
        })
    }
}

#[async_trait]
impl EmbeddingService for LocalEmbedder {
    fn name(&self) -> &'static str {
        "fastembed"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or(EmbeddingError::EmptyResult)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let engine = Arc::clone(&self.engine);
        let texts = texts.to_vec();
        let expected = texts.len();
        let vectors = tokio::task::spawn_blocking(move || {
            let mut engine = engine
                .lock()
                .map_err(|_| EmbeddingError::EmbedFailed("engine lock poisoned".into()))?;
            engine.embed_batch(texts)
        })
        .await
        .map_err(|e| EmbeddingError::EmbedFailed(e.to_string()))??;

        if vectors.len() != expected {
            return Err(EmbeddingError::EmbedFailed(format!(
                "expected {expected} vectors, model returned {}",
                vectors.len()
            )));
        }
        Ok(vectors)
    }
}

// ---------------------------------------------------------------------------
// DisabledEmbedder
// ---------------------------------------------------------------------------

/// Service used when embeddings are switched off. Every call is
/// `ServiceUnavailable`, so every chunk is degraded and retrieval is lexical.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledEmbedder;

#[async_trait]
impl EmbeddingService for DisabledEmbedder {
    fn name(&self) -> &'static str {
        "disabled"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::ServiceUnavailable(
            "embeddings are disabled".into(),
        ))
    }
}

// ---------------------------------------------------------------------------
// TimeoutEmbedder
// ---------------------------------------------------------------------------

/// Bounds every call of an inner service by a fixed timeout.
pub struct TimeoutEmbedder {
    inner: Arc<dyn EmbeddingService>,
    timeout: Duration,
}

impl TimeoutEmbedder {
    #[must_use]
    pub fn new(inner: Arc<dyn EmbeddingService>, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    fn timeout_error(&self) -> EmbeddingError {
        EmbeddingError::Timeout {
            ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[async_trait]
impl EmbeddingService for TimeoutEmbedder {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        tokio::time::timeout(self.timeout, self.inner.embed(text))
            .await
            .map_err(|_| self.timeout_error())?
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        tokio::time::timeout(self.timeout, self.inner.embed_batch(texts))
            .await
            .map_err(|_| self.timeout_error())?
    }
}

/// Cosine similarity of two vectors; `0.0` for mismatched or zero vectors.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
