//! Bounded prompt assembly.
//!
//! Token counts are estimated as `ceil(chars / 4)`. Passages arrive ordered
//! by descending score; the lowest-scored ones are dropped first until the
//! whole prompt fits the budget. The query and computed facts are never
//! dropped.

use std::fmt::Write as _;

use akta_config::ComposerConfig;
use akta_core::{ComputedFact, RetrievalResult};
use chrono::NaiveDate;

use crate::render::fact_line;

/// Estimated token count of `text`.
#[must_use]
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

/// A prompt ready for the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    /// Passages included, best first.
    pub passages: usize,
    /// Passages dropped by the chunk cap or the token budget.
    pub dropped: usize,
    pub estimated_tokens: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    max_context_chunks: usize,
    max_prompt_tokens: usize,
}

impl PromptBuilder {
    #[must_use]
    pub const fn new(max_context_chunks: usize, max_prompt_tokens: usize) -> Self {
        Self {
            max_context_chunks,
            max_prompt_tokens,
        }
    }

    #[must_use]
    pub const fn from_config(config: &ComposerConfig) -> Self {
        Self::new(config.max_context_chunks, config.max_prompt_tokens)
    }

    /// Assemble the prompt for `query` from `passages` (best first) and `facts`.
    #[must_use]
    pub fn build(
        &self,
        query: &str,
        as_of: NaiveDate,
        passages: &[RetrievalResult],
        facts: &[ComputedFact],
    ) -> Prompt {
        let mut keep = passages.len().min(self.max_context_chunks);
        let mut text = render(query, as_of, &passages[..keep], facts);
        while keep > 0 && estimate_tokens(&text) > self.max_prompt_tokens {
            keep -= 1;
            text = render(query, as_of, &passages[..keep], facts);
        }
        if keep < passages.len() {
            tracing::debug!(
                kept = keep,
                dropped = passages.len() - keep,
                "compose: passages trimmed to fit prompt budget"
            );
        }
        Prompt {
            estimated_tokens: estimate_tokens(&text),
            text,
            passages: keep,
            dropped: passages.len() - keep,
        }
    }
}

fn render(query: &str, as_of: NaiveDate, passages: &[RetrievalResult], facts: &[ComputedFact]) -> String {
    let mut out = String::new();
    if !facts.is_empty() {
        let _ = writeln!(out, "Computed statutory figures as of {as_of}:");
        for fact in facts {
            let _ = writeln!(out, "- {}", fact_line(fact));
        }
        out.push('\n');
    }
    if !passages.is_empty() {
        out.push_str("Passages:\n");
        for (i, passage) in passages.iter().enumerate() {
            let _ = writeln!(out, "[{}] {}", i + 1, passage.section_label());
            let _ = writeln!(out, "{}\n", passage.text.trim());
        }
    }
    let _ = write!(out, "Question: {}\nAnswer:", query.trim());
    out
}
