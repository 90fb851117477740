//! General application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_data_dir() -> String {
    ".akta".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Directory holding the corpus database and model cache.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl GeneralConfig {
    /// Path of the DuckDB corpus store.
    #[must_use]
    pub fn corpus_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("corpus.duckdb")
    }

    /// Directory for downloaded embedding models.
    #[must_use]
    pub fn model_cache_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("models")
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}
