//! Corpus refresh configuration.

use serde::{Deserialize, Serialize};

const fn default_interval_secs() -> u64 {
    86_400
}

const fn default_fetch_timeout_secs() -> u64 {
    30
}

/// One tracked statutory source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceConfig {
    pub url: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RefreshConfig {
    /// Seconds between scheduled refresh passes. Defaults to daily.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl RefreshConfig {
    /// Returns `true` if at least one source is tracked.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.sources.is_empty()
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            sources: Vec::new(),
        }
    }
}
