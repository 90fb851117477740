//! # akta-core
//!
//! Core types, id helpers, and error types for Akta.
//!
//! This crate provides the foundational types shared across all Akta crates:
//! - Corpus entities (documents, chunks) and the per-query retrieval result
//! - The `ComplianceAnswer` and `RefreshReport` shapes exchanged at the API boundary
//! - Closed enums for rule categories, validation status, and refresh outcomes
//! - Content hashing and deterministic id derivation
//! - Cross-cutting error types and the serializable `ErrorKind` taxonomy

pub mod entities;
pub mod enums;
pub mod errors;
pub mod ids;

pub use entities::{
    AnswerError, ClaimMismatch, ComplianceAnswer, ComputedFact, CorpusChunk, CorpusDocument,
    FactValue, NumericInputs, RefreshReport, RetrievalResult, SourceOutcome,
};
pub use enums::{
    Citizenship, DayKind, ErrorKind, FactUnit, MismatchPolicy, RefreshStatus, RuleCategory,
    ValidationStatus,
};
pub use errors::CoreError;
