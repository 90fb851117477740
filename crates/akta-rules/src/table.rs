//! Statutory rules and rule tables.
//!
//! A rule table is a TOML file of `[[rule]]` entries:
//!
//! ```toml
//! [[rule]]
//! id = "minimum-wage-2025"
//! category = "minimum_wage"
//! effective_from = "2025-02-01"
//! citation = "Minimum Wages Order 2024"
//!
//! [rule.formula]
//! kind = "threshold"
//! minimum = 1700
//! ```
//!
//! Loading validates every rule and then the table as a whole: two rules of
//! one category whose effective ranges and applicability predicates overlap
//! make the table unusable.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use akta_core::{NumericInputs, RuleCategory};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::applicability::{Applicability, EffectiveRange};
use crate::error::RulesError;
use crate::formula::Formula;

/// Built-in rule table shipped with the crate.
pub const DEFAULT_RULES: &str = include_str!("../rules/default_rules.toml");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatutoryRule {
    pub id: String,
    pub category: RuleCategory,
    pub effective_from: NaiveDate,
    /// Exclusive end date. Unset while the rule is in force.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_until: Option<NaiveDate>,
    /// Statute or schedule the figures come from.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub citation: String,
    #[serde(default)]
    pub applies: Applicability,
    pub formula: Formula,
}

impl StatutoryRule {
    #[must_use]
    pub const fn effective(&self) -> EffectiveRange {
        EffectiveRange {
            from: self.effective_from,
            until: self.effective_until,
        }
    }

    #[must_use]
    pub fn is_active(&self, as_of: NaiveDate) -> bool {
        self.effective().contains(as_of)
    }

    #[must_use]
    pub fn applies_to(&self, inputs: &NumericInputs) -> bool {
        self.applies.matches(inputs)
    }

    fn validate(&self) -> Result<(), RulesError> {
        let invalid = |reason: String| RulesError::InvalidRule {
            rule_id: self.id.clone(),
            reason,
        };
        if self.id.trim().is_empty() {
            return Err(invalid("rule id is empty".into()));
        }
        if let Some(until) = self.effective_until {
            if until <= self.effective_from {
                return Err(invalid(format!(
                    "effective range {} .. {until} is empty",
                    self.effective_from
                )));
            }
        }
        if !self.formula.fits(self.category) {
            return Err(invalid(format!(
                "{} formula cannot compute {}",
                self.formula.kind(),
                self.category
            )));
        }
        if self.applies.age.is_some_and(|b| !b.is_valid())
            || self.applies.salary.is_some_and(|b| !b.is_valid())
        {
            return Err(invalid("applicability range is empty".into()));
        }
        self.formula.check().map_err(invalid)
    }

    /// Whether some date and some inputs select both rules.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.category == other.category
            && self.effective().overlaps(&other.effective())
            && self.applies.overlaps(&other.applies)
    }
}

/// Two same-category rules that can be active for the same request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityViolation {
    pub category: RuleCategory,
    pub first: String,
    pub second: String,
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rules {} and {} overlap",
            self.category, self.first, self.second
        )
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default, rename = "rule")]
    rules: Vec<StatutoryRule>,
}

/// A validated collection of statutory rules.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<StatutoryRule>,
}

impl RuleSet {
    /// Validate `rules` and reject any integrity violation.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidRule`] for a malformed rule or duplicate
    /// id, and [`RulesError::Integrity`] for overlapping rules.
    pub fn new(rules: Vec<StatutoryRule>) -> Result<Self, RulesError> {
        let set = Self::unchecked(rules)?;
        let violations = set.check_integrity();
        if violations.is_empty() {
            Ok(set)
        } else {
            Err(RulesError::Integrity {
                violations: violations.iter().map(ToString::to_string).collect(),
            })
        }
    }

    /// Validate each rule but accept overlaps, so they can be reported
    /// (`akta rules check`) or surface as `AmbiguousRule` at compute time.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidRule`] for a malformed rule or duplicate id.
    pub fn unchecked(rules: Vec<StatutoryRule>) -> Result<Self, RulesError> {
        let mut seen = HashSet::new();
        for rule in &rules {
            rule.validate()?;
            if !seen.insert(rule.id.as_str()) {
                return Err(RulesError::InvalidRule {
                    rule_id: rule.id.clone(),
                    reason: "duplicate rule id".into(),
                });
            }
        }
        Ok(Self { rules })
    }

    /// The built-in table.
    ///
    /// # Errors
    ///
    /// Fails only if the shipped table is itself invalid.
    pub fn builtin() -> Result<Self, RulesError> {
        Self::from_toml_str(DEFAULT_RULES)
    }

    /// Parse and fully check a TOML rule table.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Table`] for malformed TOML, otherwise as [`Self::new`].
    pub fn from_toml_str(raw: &str) -> Result<Self, RulesError> {
        Self::new(parse(raw)?)
    }

    /// Parse a TOML rule table without the integrity check.
    ///
    /// # Errors
    ///
    /// As [`Self::unchecked`], plus [`RulesError::Table`] for malformed TOML.
    pub fn from_toml_str_unchecked(raw: &str) -> Result<Self, RulesError> {
        Self::unchecked(parse(raw)?)
    }

    /// Read and fully check a rule table file.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        Self::from_toml_str(&read(path)?)
    }

    /// Read a rule table file without the integrity check.
    ///
    /// # Errors
    ///
    /// As [`Self::load`], minus the integrity check.
    pub fn load_unchecked(path: &Path) -> Result<Self, RulesError> {
        Self::from_toml_str_unchecked(&read(path)?)
    }

    #[must_use]
    pub fn rules(&self) -> &[StatutoryRule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    #[must_use]
    pub fn get(&self, rule_id: &str) -> Option<&StatutoryRule> {
        self.rules.iter().find(|r| r.id == rule_id)
    }

    /// Every pair of rules that could both be active for one request.
    #[must_use]
    pub fn check_integrity(&self) -> Vec<IntegrityViolation> {
        let mut violations = Vec::new();
        for (i, first) in self.rules.iter().enumerate() {
            for second in &self.rules[i + 1..] {
                if first.overlaps(second) {
                    violations.push(IntegrityViolation {
                        category: first.category,
                        first: first.id.clone(),
                        second: second.id.clone(),
                    });
                }
            }
        }
        violations
    }

    /// Rules of `category` in force on `as_of`, in table order.
    pub fn active(
        &self,
        category: RuleCategory,
        as_of: NaiveDate,
    ) -> impl Iterator<Item = &StatutoryRule> {
        self.rules
            .iter()
            .filter(move |r| r.category == category && r.is_active(as_of))
    }
}

fn parse(raw: &str) -> Result<Vec<StatutoryRule>, RulesError> {
    let file: RuleFile = toml::from_str(raw)?;
    Ok(file.rules)
}

pub(crate) fn read(path: &Path) -> Result<String, RulesError> {
    std::fs::read_to_string(path).map_err(|source| RulesError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TWO_WAGES: &str = r#"
[[rule]]
id = "minimum-wage-2022"
category = "minimum_wage"
effective_from = "2022-05-01"
effective_until = "2025-02-01"

[rule.formula]
kind = "threshold"
minimum = 1500

[[rule]]
id = "minimum-wage-2025"
category = "minimum_wage"
effective_from = "2025-02-01"

[rule.formula]
kind = "threshold"
minimum = 1700
"#;

    #[test]
    fn builtin_table_is_consistent() {
        let set = RuleSet::builtin().expect("built-in table loads");
        assert!(set.check_integrity().is_empty());
        for category in RuleCategory::ALL {
            assert!(
                set.rules().iter().any(|r| r.category == *category),
                "no built-in rule for {category}"
            );
        }
    }

    #[test]
    fn parses_rule_table() {
        let set = RuleSet::from_toml_str(TWO_WAGES).unwrap();
        assert_eq!(set.len(), 2);
        let as_of = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let active: Vec<&str> = set
            .active(RuleCategory::MinimumWage, as_of)
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(active, vec!["minimum-wage-2022"]);
    }

    #[test]
    fn overlapping_ranges_fail_to_load() {
        let raw = TWO_WAGES.replace("effective_until = \"2025-02-01\"", "effective_until = \"2025-03-01\"");
        let err = RuleSet::from_toml_str(&raw).unwrap_err();
        assert!(matches!(err, RulesError::Integrity { .. }));
        assert!(err.to_string().contains("minimum-wage-2022 and minimum-wage-2025"));

        let unchecked = RuleSet::from_toml_str_unchecked(&raw).unwrap();
        assert_eq!(unchecked.check_integrity().len(), 1);
    }

    #[test]
    fn formula_must_fit_category() {
        let raw = TWO_WAGES.replacen("category = \"minimum_wage\"", "category = \"epf\"", 1);
        let err = RuleSet::from_toml_str(&raw).unwrap_err();
        assert!(matches!(err, RulesError::InvalidRule { ref rule_id, .. } if rule_id == "minimum-wage-2022"));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let raw = TWO_WAGES.replace("minimum-wage-2025", "minimum-wage-2022");
        let err = RuleSet::unchecked(parse(&raw).unwrap()).unwrap_err();
        assert!(err.to_string().contains("duplicate rule id"));
    }

    #[test]
    fn unknown_category_is_a_parse_error() {
        let raw = TWO_WAGES.replacen("minimum_wage", "pension", 1);
        assert!(matches!(
            RuleSet::from_toml_str(&raw).unwrap_err(),
            RulesError::Table(_)
        ));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, TWO_WAGES).unwrap();
        assert_eq!(RuleSet::load(&path).unwrap().len(), 2);
        assert!(matches!(
            RuleSet::load(&dir.path().join("missing.toml")).unwrap_err(),
            RulesError::Io { .. }
        ));
    }
}
