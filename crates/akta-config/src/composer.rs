//! Answer composer configuration.

use akta_core::{Citizenship, MismatchPolicy};
use serde::{Deserialize, Serialize};

const fn default_max_context_chunks() -> usize {
    5
}

const fn default_max_prompt_tokens() -> usize {
    3000
}

const fn default_retry_budget() -> u32 {
    1
}

const fn default_request_deadline_secs() -> u64 {
    90
}

const fn default_age() -> u32 {
    30
}

const fn default_citizenship() -> Citizenship {
    Citizenship::Citizen
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ComposerConfig {
    /// Passages placed in the prompt, before the token budget is applied.
    #[serde(default = "default_max_context_chunks")]
    pub max_context_chunks: usize,

    /// Estimated token budget for the whole prompt.
    #[serde(default = "default_max_prompt_tokens")]
    pub max_prompt_tokens: usize,

    /// Regenerations allowed after an outright generation failure.
    #[serde(default = "default_retry_budget")]
    pub retry_budget: u32,

    #[serde(default)]
    pub mismatch_policy: MismatchPolicy,

    /// Overall per-request deadline.
    #[serde(default = "default_request_deadline_secs")]
    pub request_deadline_secs: u64,

    /// Age assumed when the caller gives none.
    #[serde(default = "default_age")]
    pub default_age: u32,

    /// Citizenship assumed when the caller gives none.
    #[serde(default = "default_citizenship")]
    pub default_citizenship: Citizenship,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            max_context_chunks: default_max_context_chunks(),
            max_prompt_tokens: default_max_prompt_tokens(),
            retry_budget: default_retry_budget(),
            mismatch_policy: MismatchPolicy::default(),
            request_deadline_secs: default_request_deadline_secs(),
            default_age: default_age(),
            default_citizenship: default_citizenship(),
        }
    }
}
