use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::inputs::NumericInputs;
use super::retrieval::RetrievalResult;
use crate::enums::{ErrorKind, FactUnit, RuleCategory, ValidationStatus};

/// One named output of a rule formula, e.g. `employee = 550.00 currency`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct FactValue {
    pub name: String,
    pub value: f64,
    pub unit: FactUnit,
}

impl FactValue {
    #[must_use]
    pub fn new(name: impl Into<String>, value: f64, unit: FactUnit) -> Self {
        Self {
            name: name.into(),
            value,
            unit,
        }
    }
}

/// Output of one statutory rule evaluated for one request.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ComputedFact {
    pub category: RuleCategory,
    pub rule_id: String,
    pub values: Vec<FactValue>,
}

impl ComputedFact {
    /// Look up an output by name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.iter().find(|v| v.name == name).map(|v| v.value)
    }
}

/// A numeric claim in generated text that disagreed with a computed fact.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ClaimMismatch {
    pub category: RuleCategory,
    pub rule_id: String,
    /// Name of the fact output the claim was compared to.
    pub fact: String,
    pub unit: FactUnit,
    pub claimed: f64,
    pub expected: f64,
    /// Sentence the claim was taken from.
    pub sentence: String,
}

/// Structured failure carried to the API boundary in place of a raw error.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AnswerError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AnswerError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Grounded answer to one query. Created per request, not persisted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ComplianceAnswer {
    pub query: String,
    pub as_of: NaiveDate,
    /// Inputs the rules engine was evaluated with, after extraction and defaults.
    pub inputs: NumericInputs,
    /// Ordered by descending score.
    pub retrieved_chunks: Vec<RetrievalResult>,
    pub computed_facts: Vec<ComputedFact>,
    pub generated_text: String,
    pub validation_status: ValidationStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mismatches: Vec<ClaimMismatch>,
    /// Non-fatal conditions, e.g. a detected category with no applicable rule.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<AnswerError>,
}

impl ComplianceAnswer {
    /// An answer that carries only a failure: no passages, facts, or prose.
    #[must_use]
    pub fn failed(
        query: impl Into<String>,
        as_of: NaiveDate,
        inputs: NumericInputs,
        error: AnswerError,
    ) -> Self {
        Self {
            query: query.into(),
            as_of,
            inputs,
            retrieved_chunks: Vec::new(),
            computed_facts: Vec::new(),
            generated_text: String::new(),
            validation_status: ValidationStatus::Failed,
            mismatches: Vec::new(),
            notes: Vec::new(),
            error: Some(error),
        }
    }

    /// Facts computed for `category`.
    pub fn facts_for(&self, category: RuleCategory) -> impl Iterator<Item = &ComputedFact> {
        self.computed_facts
            .iter()
            .filter(move |f| f.category == category)
    }
}
