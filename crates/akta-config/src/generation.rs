//! Generation service configuration.
//!
//! The generation service is any OpenAI-compatible chat completions endpoint,
//! typically a local llama.cpp or Ollama server.

use serde::{Deserialize, Serialize};

fn default_endpoint() -> String {
    "http://127.0.0.1:8080/v1".to_string()
}

fn default_model() -> String {
    "phi-3-mini-4k-instruct".to_string()
}

const fn default_max_tokens() -> u32 {
    512
}

const fn default_temperature() -> f32 {
    0.7
}

const fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Base URL; `/chat/completions` is appended.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token. Empty for local servers that do not check it.
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl GenerationConfig {
    /// Returns `true` if an endpoint and model are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.model.trim().is_empty()
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: String::new(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
