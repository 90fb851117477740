//! Rules engine error types.

use akta_core::{ErrorKind, RuleCategory};
use chrono::NaiveDate;

/// Errors from rule tables and rule evaluation.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// No active rule of the category matches the inputs.
    #[error("no applicable {category} rule on {as_of}")]
    NoApplicableRule {
        category: RuleCategory,
        as_of: NaiveDate,
    },

    /// More than one active rule matches: the rule table is inconsistent.
    #[error("ambiguous {category} rules on {as_of}: {}", rule_ids.join(", "))]
    AmbiguousRule {
        category: RuleCategory,
        as_of: NaiveDate,
        rule_ids: Vec<String>,
    },

    /// The inputs lack a value the category needs.
    #[error("{category} needs input '{field}'")]
    MissingInput {
        category: RuleCategory,
        field: &'static str,
    },

    /// An input value is out of range (e.g. a negative salary).
    #[error("invalid input '{field}': {reason}")]
    InvalidInput { field: &'static str, reason: String },

    /// A rule definition is malformed.
    #[error("invalid rule {rule_id}: {reason}")]
    InvalidRule { rule_id: String, reason: String },

    /// Two rules of one category overlap in date range and applicability.
    #[error("rule table integrity: {}", violations.join("; "))]
    Integrity { violations: Vec<String> },

    /// The living-cost table is malformed.
    #[error("invalid living-cost table: {0}")]
    InvalidCostTable(String),

    /// The rule table file cannot be parsed.
    #[error("rule table parse error: {0}")]
    Table(#[from] toml::de::Error),

    /// The rule table file cannot be read.
    #[error("cannot read rule table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl RulesError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NoApplicableRule { .. } => ErrorKind::NoApplicableRule,
            Self::AmbiguousRule { .. } | Self::Integrity { .. } => ErrorKind::AmbiguousRule,
            Self::MissingInput { .. } => ErrorKind::MissingInput,
            Self::InvalidInput { .. }
            | Self::InvalidRule { .. }
            | Self::InvalidCostTable(_)
            | Self::Table(_)
            | Self::Io { .. } => ErrorKind::InvalidData,
        }
    }

    /// Data-integrity failures that must halt the affected computation.
    #[must_use]
    pub const fn is_integrity(&self) -> bool {
        matches!(self, Self::AmbiguousRule { .. } | Self::Integrity { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_rule_lists_ids() {
        let err = RulesError::AmbiguousRule {
            category: RuleCategory::Epf,
            as_of: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            rule_ids: vec!["epf-a".into(), "epf-b".into()],
        };
        assert_eq!(
            err.to_string(),
            "ambiguous epf rules on 2026-01-01: epf-a, epf-b"
        );
        assert_eq!(err.kind(), ErrorKind::AmbiguousRule);
        assert!(err.is_integrity());
    }

    #[test]
    fn missing_input_is_not_integrity() {
        let err = RulesError::MissingInput {
            category: RuleCategory::NoticePeriod,
            field: "years_of_service",
        };
        assert_eq!(err.kind(), ErrorKind::MissingInput);
        assert!(!err.is_integrity());
    }
}
