//! Entity structs for Akta domain objects.
//!
//! Corpus entities map to the DuckDB tables in `akta-corpus`; answer and
//! refresh entities are the shapes returned at the API boundary. All structs
//! derive `Serialize`, `Deserialize`, and `JsonSchema`.

mod answer;
mod document;
mod inputs;
mod refresh;
mod retrieval;

pub use answer::{AnswerError, ClaimMismatch, ComplianceAnswer, ComputedFact, FactValue};
pub use document::{CorpusChunk, CorpusDocument, TokenSpan, normalize_text};
pub use inputs::NumericInputs;
pub use refresh::{RefreshReport, SourceOutcome};
pub use retrieval::RetrievalResult;
