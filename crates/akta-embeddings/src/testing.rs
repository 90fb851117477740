//! Deterministic [`EmbeddingService`] doubles for tests across the workspace.
//!
//! None of these touch the network or a model.

use std::collections::HashSet;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::{EmbeddingError, EmbeddingService};

/// Bag-of-words embedder: each lowercase word is hashed into one of
/// `dimension` buckets. Texts sharing words get positive cosine similarity.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimension];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = usize::try_from(hasher.finish() % self.dimension as u64).unwrap_or(0);
            v[bucket] += 1.0;
        }
        v
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EmbeddingService for HashEmbedder {
    fn name(&self) -> &'static str {
        "hash"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.vector(text))
    }
}

/// Always unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingService for FailingEmbedder {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::ServiceUnavailable("connection refused".into()))
    }
}

/// Fails for any text containing one of the given markers, hashes the rest.
/// Batches containing a marked text fail as a whole.
///
/// By default a marked text is rejected as bad input; built with
/// [`SelectiveEmbedder::unavailable_for`] the service reports an outage
/// instead.
#[derive(Debug)]
pub struct SelectiveEmbedder {
    inner: HashEmbedder,
    poison: HashSet<String>,
    outage: bool,
    calls: AtomicUsize,
}

impl SelectiveEmbedder {
    #[must_use]
    pub fn new<I, S>(poison: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: HashEmbedder::default(),
            poison: poison.into_iter().map(Into::into).collect(),
            outage: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Marked texts make the service look unreachable.
    #[must_use]
    pub fn unavailable_for<I, S>(poison: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            outage: true,
            ..Self::new(poison)
        }
    }

    /// Number of `embed` calls made so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingService for SelectiveEmbedder {
    fn name(&self) -> &'static str {
        "selective"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.poison.iter().any(|p| text.contains(p.as_str())) {
            return Err(if self.outage {
                EmbeddingError::ServiceUnavailable("connection reset".into())
            } else {
                EmbeddingError::EmbedFailed("input rejected".into())
            });
        }
        self.inner.embed(text).await
    }
}

/// Sleeps before answering, for timeout tests.
#[derive(Debug)]
pub struct SlowEmbedder {
    delay: Duration,
    inner: HashEmbedder,
}

impl SlowEmbedder {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: HashEmbedder::default(),
        }
    }
}

#[async_trait]
impl EmbeddingService for SlowEmbedder {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        tokio::time::sleep(self.delay).await;
        self.inner.embed(text).await
    }
}

/// Records every text it is asked to embed.
#[derive(Debug, Default)]
pub struct RecordingEmbedder {
    inner: HashEmbedder,
    seen: Mutex<Vec<String>>,
}

impl RecordingEmbedder {
    #[must_use]
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl EmbeddingService for RecordingEmbedder {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(text.to_string());
        }
        self.inner.embed(text).await
    }
}
