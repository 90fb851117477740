//! # akta-config
//!
//! Layered configuration loading for Akta using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`AKTA_*` prefix, `__` as separator)
//! 2. An explicit file passed with `--config`
//! 3. Project-level `.akta/config.toml`
//! 4. User-level `~/.config/akta/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `AKTA_RETRIEVAL__TOP_K` -> `retrieval.top_k`,
//! `AKTA_GENERATION__ENDPOINT` -> `generation.endpoint`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use akta_config::AktaConfig;
//!
//! let config = AktaConfig::load_with_dotenv().expect("config");
//! config.validate().expect("valid config");
//! println!("top_k = {}", config.retrieval.top_k);
//! ```

mod composer;
mod embedding;
mod error;
mod general;
mod generation;
mod refresh;
mod retrieval;
mod rules;

pub use composer::ComposerConfig;
pub use embedding::{EmbeddingConfig, EmbeddingProvider};
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use generation::GenerationConfig;
pub use refresh::{RefreshConfig, SourceConfig};
pub use retrieval::{DEFAULT_STATUTORY_TERMS, IndexerConfig, RetrievalConfig};
pub use rules::RulesConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AktaConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub indexer: IndexerConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub composer: ComposerConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
}

impl AktaConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration, layering `path` above the project and user files.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::invalid(
                "config",
                format!("file {} does not exist", path.display()),
            ));
        }
        Self::figment_with_file(Some(path))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    pub fn figment() -> Figment {
        Self::figment_with_file(None)
    }

    fn figment_with_file(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".akta/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Explicit file
        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        // Layer 4: Environment variables (highest priority)
        figment.merge(Env::prefixed("AKTA_").split("__"))
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let retrieval = &self.retrieval;
        if retrieval.top_k == 0 {
            return Err(ConfigError::invalid("retrieval.top_k", "must be at least 1"));
        }
        if retrieval.top_k > retrieval.max_top_k {
            return Err(ConfigError::invalid(
                "retrieval.top_k",
                format!("{} exceeds max_top_k {}", retrieval.top_k, retrieval.max_top_k),
            ));
        }
        if !(0.0..=1.0).contains(&retrieval.lexical_boost) {
            return Err(ConfigError::invalid(
                "retrieval.lexical_boost",
                "must be within [0, 1]",
            ));
        }
        if retrieval.query_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "retrieval.query_timeout_ms",
                "must be positive",
            ));
        }
        if self.indexer.max_chunk_tokens == 0 {
            return Err(ConfigError::invalid(
                "indexer.max_chunk_tokens",
                "must be at least 1",
            ));
        }
        if self.rules.tolerance_absolute < 0.0 || self.rules.tolerance_relative < 0.0 {
            return Err(ConfigError::invalid("rules.tolerance", "must not be negative"));
        }
        if self.composer.max_context_chunks == 0 {
            return Err(ConfigError::invalid(
                "composer.max_context_chunks",
                "must be at least 1",
            ));
        }
        if self.composer.request_deadline_secs == 0 {
            return Err(ConfigError::invalid(
                "composer.request_deadline_secs",
                "must be positive",
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::invalid(
                "generation.temperature",
                "must be within [0, 2]",
            ));
        }
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::invalid(
                "refresh.interval_secs",
                "must be positive",
            ));
        }
        if let Some(source) = self.refresh.sources.iter().find(|s| s.url.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "refresh.sources",
                format!("source '{}' has an empty url", source.title),
            ));
        }
        Ok(())
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("akta").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir looking
    /// for a `.env` file. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AktaConfig::default();
        config.validate().expect("defaults validate");
        assert!(!config.rules.is_configured());
        assert!(!config.refresh.is_configured());
        assert!(config.generation.is_configured());
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: AktaConfig = AktaConfig::figment().extract()?;
            assert_eq!(config.retrieval.top_k, 5);
            assert_eq!(config.composer.retry_budget, 1);
            Ok(())
        });
    }

    #[test]
    fn zero_top_k_rejected() {
        let mut config = AktaConfig::default();
        config.retrieval.top_k = 0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "retrieval.top_k"));
    }

    #[test]
    fn top_k_above_cap_rejected() {
        let mut config = AktaConfig::default();
        config.retrieval.top_k = 50;
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_tolerance_rejected() {
        let mut config = AktaConfig::default();
        config.rules.tolerance_relative = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_interval_rejected() {
        let mut config = AktaConfig::default();
        config.refresh.interval_secs = 0;
        assert!(config.validate().is_err());
    }
}
