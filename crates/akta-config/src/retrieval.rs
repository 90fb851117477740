//! Retrieval and indexing configuration.

use serde::{Deserialize, Serialize};

const fn default_top_k() -> usize {
    5
}

const fn default_max_top_k() -> usize {
    20
}

const fn default_lexical_boost() -> f64 {
    0.25
}

const fn default_query_timeout_ms() -> u64 {
    2000
}

const fn default_max_chunk_tokens() -> usize {
    256
}

/// Terms whose exact presence in both query and passage boosts relevance.
pub const DEFAULT_STATUTORY_TERMS: &[&str] = &[
    "EPF",
    "KWSP",
    "SOCSO",
    "PERKESO",
    "EIS",
    "notice period",
    "annual leave",
    "sick leave",
    "maternity leave",
    "minimum wage",
    "overtime",
    "termination",
    "retrenchment",
    "rest day",
    "public holiday",
    "working hours",
];

fn default_statutory_terms() -> Vec<String> {
    DEFAULT_STATUTORY_TERMS
        .iter()
        .map(|t| (*t).to_string())
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Results returned when the caller does not ask for a specific `k`.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Upper bound applied to any requested `k`.
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,

    /// Weight of the statutory-term overlap boost. Fixed, not learned.
    #[serde(default = "default_lexical_boost")]
    pub lexical_boost: f64,

    /// Budget for embedding the query and scoring, in milliseconds.
    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,

    #[serde(default = "default_statutory_terms")]
    pub statutory_terms: Vec<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_top_k: default_max_top_k(),
            lexical_boost: default_lexical_boost(),
            query_timeout_ms: default_query_timeout_ms(),
            statutory_terms: default_statutory_terms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexerConfig {
    /// Maximum whitespace tokens per chunk.
    #[serde(default = "default_max_chunk_tokens")]
    pub max_chunk_tokens: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            max_chunk_tokens: default_max_chunk_tokens(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = RetrievalConfig::default();
        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_top_k, 20);
        assert!((config.lexical_boost - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.query_timeout_ms, 2000);
        assert!(config.statutory_terms.iter().any(|t| t == "notice period"));
        assert_eq!(IndexerConfig::default().max_chunk_tokens, 256);
    }
}
