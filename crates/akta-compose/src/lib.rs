//! # akta-compose
//!
//! Grounded answer composition for Akta.
//!
//! [`Composer::answer_query`] retrieves passages, computes the statutory
//! facts the query asks about, builds a bounded prompt, calls the generation
//! service and cross-checks every generated figure against the facts. A
//! mismatch either replaces the prose with a rules-only answer or appends a
//! correction, depending on [`akta_core::MismatchPolicy`].
//!
//! The language model sits behind [`GenerationService`]; [`OpenAiCompatible`]
//! talks to llama.cpp, Ollama or any server with the OpenAI chat API.

pub mod claims;
pub mod composer;
pub mod error;
pub mod extract;
pub mod generation;
mod numbers;
pub mod prompt;
pub mod render;
pub mod testing;
pub mod validate;

pub use claims::{Claim, Role, extract_claims};
pub use composer::Composer;
pub use error::{ComposeError, GenerationError};
pub use extract::extract_inputs;
pub use generation::{GenerationService, OpenAiCompatible};
pub use prompt::{Prompt, PromptBuilder, estimate_tokens};
pub use validate::{Validator, Verdict};
