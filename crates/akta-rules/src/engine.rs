//! The rules engine: select the unique applicable rule and evaluate it.

use akta_config::RulesConfig;
use akta_core::{ComputedFact, NumericInputs, RuleCategory};
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::RulesError;
use crate::formula::round_cents;
use crate::table::{RuleSet, StatutoryRule};
use crate::tolerance::Tolerance;

#[derive(Debug, Clone)]
pub struct RulesEngine {
    rules: RuleSet,
    tolerance: Tolerance,
}

impl RulesEngine {
    #[must_use]
    pub const fn new(rules: RuleSet, tolerance: Tolerance) -> Self {
        Self { rules, tolerance }
    }

    /// Engine over the configured table file, or the built-in table.
    ///
    /// # Errors
    ///
    /// Returns the table's load error, including integrity violations.
    pub fn from_config(config: &RulesConfig) -> Result<Self, RulesError> {
        let rules = if config.is_configured() {
            RuleSet::load(std::path::Path::new(config.table_path.trim()))?
        } else {
            RuleSet::builtin()?
        };
        tracing::debug!(rules = rules.len(), "rules: table loaded");
        Ok(Self::new(rules, Tolerance::from_config(config)))
    }

    #[must_use]
    pub const fn rules(&self) -> &RuleSet {
        &self.rules
    }

    #[must_use]
    pub const fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// The unique rule of `category` active on `as_of` whose predicate
    /// matches `inputs`.
    ///
    /// # Errors
    ///
    /// - [`RulesError::MissingInput`] when nothing matches and an active
    ///   rule constrains a field the inputs leave unset
    /// - [`RulesError::NoApplicableRule`] when nothing matches otherwise
    /// - [`RulesError::AmbiguousRule`] when several rules match
    pub fn select(
        &self,
        category: RuleCategory,
        inputs: &NumericInputs,
        as_of: NaiveDate,
    ) -> Result<&StatutoryRule, RulesError> {
        let active: Vec<&StatutoryRule> = self.rules.active(category, as_of).collect();
        let matching: Vec<&StatutoryRule> =
            active.iter().copied().filter(|r| r.applies_to(inputs)).collect();

        match matching.as_slice() {
            [rule] => Ok(*rule),
            [] => {
                if let Some(field) = active.iter().find_map(|r| r.applies.missing_field(inputs)) {
                    return Err(RulesError::MissingInput { category, field });
                }
                Err(RulesError::NoApplicableRule { category, as_of })
            }
            many => {
                let rule_ids: Vec<String> = many.iter().map(|r| r.id.clone()).collect();
                tracing::error!(
                    %category,
                    %as_of,
                    rules = ?rule_ids,
                    "rules: more than one rule applies, rule table is inconsistent"
                );
                Err(RulesError::AmbiguousRule {
                    category,
                    as_of,
                    rule_ids,
                })
            }
        }
    }

    /// Evaluate `category` for `inputs` as of `as_of`.
    ///
    /// # Errors
    ///
    /// As [`Self::select`], plus [`RulesError::MissingInput`] /
    /// [`RulesError::InvalidInput`] from the formula.
    pub fn compute(
        &self,
        category: RuleCategory,
        inputs: &NumericInputs,
        as_of: NaiveDate,
    ) -> Result<ComputedFact, RulesError> {
        let rule = self.select(category, inputs, as_of)?;
        let values = rule.formula.evaluate(category, inputs)?;
        Ok(ComputedFact {
            category,
            rule_id: rule.id.clone(),
            values,
        })
    }

    /// Combined payroll contributions for one monthly salary.
    ///
    /// A contribution with no applicable rule (e.g. EIS past 60) counts as
    /// zero and is listed in `notes`.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::MissingInput`] without a salary, and propagates
    /// integrity and input errors.
    pub fn salary_breakdown(
        &self,
        inputs: &NumericInputs,
        as_of: NaiveDate,
    ) -> Result<SalaryBreakdown, RulesError> {
        let salary = inputs.salary.ok_or(RulesError::MissingInput {
            category: RuleCategory::Epf,
            field: "salary",
        })?;

        let mut contributions = Vec::new();
        let mut notes = Vec::new();
        for category in [RuleCategory::Epf, RuleCategory::Socso, RuleCategory::Eis] {
            match self.compute(category, inputs, as_of) {
                Ok(fact) => contributions.push(fact),
                Err(error @ RulesError::NoApplicableRule { .. }) => notes.push(error.to_string()),
                Err(error) => return Err(error),
            }
        }

        let share = |name: &str| -> f64 { contributions.iter().filter_map(|f| f.value(name)).sum() };
        let employee_deductions = round_cents(share("employee"));
        let employer_contributions = round_cents(share("employer"));

        let minimum_wage = match self.compute(RuleCategory::MinimumWage, inputs, as_of) {
            Ok(fact) => fact.value("minimum_wage"),
            Err(error @ RulesError::NoApplicableRule { .. }) => {
                notes.push(error.to_string());
                None
            }
            Err(error) => return Err(error),
        };

        Ok(SalaryBreakdown {
            as_of,
            salary,
            contributions,
            employee_deductions,
            net_pay: round_cents(salary - employee_deductions),
            employer_contributions,
            employer_cost: round_cents(salary + employer_contributions),
            minimum_wage,
            meets_minimum_wage: minimum_wage.map(|minimum| salary >= minimum),
            notes,
        })
    }
}

/// Monthly payroll view of one salary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryBreakdown {
    pub as_of: NaiveDate,
    pub salary: f64,
    /// EPF, SOCSO and EIS facts that applied.
    pub contributions: Vec<ComputedFact>,
    pub employee_deductions: f64,
    pub net_pay: f64,
    pub employer_contributions: f64,
    pub employer_cost: f64,
    pub minimum_wage: Option<f64>,
    pub meets_minimum_wage: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}
