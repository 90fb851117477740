//! Cross-check of generated figures against computed facts.

use std::collections::HashMap;

use akta_core::{ClaimMismatch, ComputedFact, FactUnit, FactValue, NumericInputs, RuleCategory, ValidationStatus};
use akta_rules::Tolerance;

use crate::claims::{Claim, Role, extract_claims};

/// Outcome of checking one generated text.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    /// `Validated`, `Unverified` or `Rejected`.
    pub status: ValidationStatus,
    /// Claims that overlapped a computed fact.
    pub checked: usize,
    pub mismatches: Vec<ClaimMismatch>,
}

/// A fact output a claim can be compared to.
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    fact: &'a ComputedFact,
    name: &'a str,
    value: f64,
    /// First output of its unit in the fact.
    primary: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Validator {
    tolerance: Tolerance,
}

impl Validator {
    #[must_use]
    pub const fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    /// Check every claim in `text` that overlaps a fact in `facts`.
    ///
    /// A claim matches when a fact output of its category, unit and side is
    /// within tolerance. On a fact split between employee and employer, a
    /// claim naming a side meets that side only, a claim speaking of a total
    /// meets the unsided outputs, and any other claim meets the primary
    /// output. Entitlement alternatives stated together (same sentence and
    /// unit, e.g. "four weeks under two years, six weeks after") pass when
    /// one of them matches. Figures equal to the caller's salary or weekly
    /// hours restate inputs and are skipped.
    #[must_use]
    pub fn check(&self, text: &str, facts: &[ComputedFact], inputs: &NumericInputs) -> Verdict {
        type Group = (usize, FactUnit, Option<Role>, Vec<RuleCategory>);

        let mut checked = Vec::new();
        for claim in extract_claims(text) {
            if restates_input(&claim, inputs) {
                continue;
            }
            let candidates = candidates(&claim, facts);
            if candidates.is_empty() {
                continue;
            }
            let matched = candidates
                .iter()
                .any(|c| self.tolerance.accepts(claim.value, c.value));
            let lenient = candidates.iter().all(|c| c.fact.category.is_entitlement());
            checked.push((claim, candidates, matched, lenient));
        }

        let group = |claim: &Claim| -> Group {
            (claim.sentence_index, claim.unit, claim.role, claim.categories.clone())
        };
        let mut group_ok: HashMap<Group, bool> = HashMap::new();
        for (claim, _, matched, lenient) in &checked {
            if *lenient {
                *group_ok.entry(group(claim)).or_default() |= *matched;
            }
        }

        let mismatches: Vec<ClaimMismatch> = checked
            .iter()
            .filter(|(claim, _, matched, lenient)| {
                !matched && !(*lenient && group_ok.get(&group(claim)).copied().unwrap_or(false))
            })
            .map(|(claim, candidates, _, _)| mismatch(claim, candidates))
            .collect();

        let status = if checked.is_empty() {
            ValidationStatus::Unverified
        } else if mismatches.is_empty() {
            ValidationStatus::Validated
        } else {
            ValidationStatus::Rejected
        };
        if !mismatches.is_empty() {
            tracing::warn!(
                checked = checked.len(),
                mismatches = mismatches.len(),
                "compose: generated figures disagree with computed facts"
            );
        }
        Verdict {
            status,
            checked: checked.len(),
            mismatches,
        }
    }
}

fn restates_input(claim: &Claim, inputs: &NumericInputs) -> bool {
    let input = match claim.unit {
        FactUnit::Currency => inputs.salary,
        FactUnit::Hours => inputs.hours_per_week,
        _ => None,
    };
    input.is_some_and(|value| (value - claim.value).abs() < 1e-9)
}

fn candidates<'a>(claim: &Claim, facts: &'a [ComputedFact]) -> Vec<Candidate<'a>> {
    facts
        .iter()
        .filter(|fact| claim.categories.contains(&fact.category))
        .flat_map(|fact| fact_candidates(claim, fact))
        .collect()
}

/// Outputs of one fact the claim may be compared to.
fn fact_candidates<'a>(claim: &Claim, fact: &'a ComputedFact) -> Vec<Candidate<'a>> {
    let same_unit: Vec<(usize, &FactValue)> = fact
        .values
        .iter()
        .filter(|v| v.unit == claim.unit)
        .enumerate()
        .collect();
    let candidate = |&(index, value): &(usize, &'a FactValue)| Candidate {
        fact,
        name: value.name.as_str(),
        value: value.value,
        primary: index == 0,
    };
    let side = |(_, value): &&(usize, &FactValue)| Role::of_fact(&value.name);

    let split = same_unit.iter().any(|v| side(&v).is_some());
    if !split {
        return same_unit.iter().map(candidate).collect();
    }
    let own: Vec<Candidate<'a>> = match claim.role {
        Some(role) => same_unit
            .iter()
            .filter(|v| side(v) == Some(role))
            .map(candidate)
            .collect(),
        None if claim.total => same_unit
            .iter()
            .filter(|v| side(v).is_none())
            .map(candidate)
            .collect(),
        None => Vec::new(),
    };
    if own.is_empty() {
        same_unit.iter().take(1).map(candidate).collect()
    } else {
        own
    }
}

/// The figure the claim should have stated: the nearest of its candidates,
/// the primary output on a tie.
fn mismatch(claim: &Claim, candidates: &[Candidate<'_>]) -> ClaimMismatch {
    let expected = candidates
        .iter()
        .min_by(|a, b| {
            (a.value - claim.value)
                .abs()
                .total_cmp(&(b.value - claim.value).abs())
                .then(b.primary.cmp(&a.primary))
        })
        .copied()
        .unwrap_or(candidates[0]);
    ClaimMismatch {
        category: expected.fact.category,
        rule_id: expected.fact.rule_id.clone(),
        fact: expected.name.to_string(),
        unit: claim.unit,
        claimed: claim.value,
        expected: expected.value,
        sentence: claim.sentence.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn epf() -> ComputedFact {
        ComputedFact {
            category: RuleCategory::Epf,
            rule_id: "epf-citizen-below-60".into(),
            values: vec![
                FactValue::new("employee", 550.0, FactUnit::Currency),
                FactValue::new("employer", 600.0, FactUnit::Currency),
                FactValue::new("total", 1150.0, FactUnit::Currency),
                FactValue::new("employee_rate", 11.0, FactUnit::Percent),
                FactValue::new("employer_rate", 12.0, FactUnit::Percent),
            ],
        }
    }

    fn notice() -> ComputedFact {
        ComputedFact {
            category: RuleCategory::NoticePeriod,
            rule_id: "notice-period".into(),
            values: vec![FactValue::new("entitlement", 6.0, FactUnit::Weeks)],
        }
    }

    fn check(text: &str) -> Verdict {
        let inputs = NumericInputs::default().with_salary(5000.0);
        Validator::new(Tolerance::default()).check(text, &[epf(), notice()], &inputs)
    }

    #[test]
    fn matching_figures_validate() {
        let verdict = check(
            "On a salary of RM5,000, your EPF share is RM550.00 (11%) and your employer adds RM600.00 (12%).",
        );
        assert_eq!(verdict.status, ValidationStatus::Validated);
        assert_eq!(verdict.checked, 4);
        assert!(verdict.mismatches.is_empty());
    }

    #[test]
    fn rounding_within_tolerance_validates() {
        assert_eq!(check("Your EPF deduction is about RM552.").status, ValidationStatus::Validated);
    }

    #[test]
    fn conflicting_salary_figure_rejects() {
        let verdict = check("As an employee you pay RM650.00 to EPF every month.");
        assert_eq!(verdict.status, ValidationStatus::Rejected);
        assert_eq!(
            verdict.mismatches,
            vec![ClaimMismatch {
                category: RuleCategory::Epf,
                rule_id: "epf-citizen-below-60".into(),
                fact: "employee".into(),
                unit: FactUnit::Currency,
                claimed: 650.0,
                expected: 550.0,
                sentence: "As an employee you pay RM650.00 to EPF every month.".into(),
            }]
        );
    }

    #[test]
    fn role_decides_the_comparison() {
        let verdict = check("For EPF the employee pays RM600.00.");
        assert_eq!(verdict.status, ValidationStatus::Rejected);
        assert_eq!(verdict.mismatches[0].expected, 550.0);
    }

    #[test]
    fn stated_alternatives_pass_when_one_matches() {
        let verdict = check(
            "The notice period is four weeks below two years of service and six weeks from two to five years.",
        );
        assert_eq!(verdict.status, ValidationStatus::Validated);
    }

    #[test]
    fn reader_wording_is_the_employee_side() {
        let verdict = check("Your EPF deduction is RM600.00.");
        assert_eq!(verdict.status, ValidationStatus::Rejected);
        assert_eq!(verdict.mismatches[0].fact, "employee");
        assert_eq!(verdict.mismatches[0].expected, 550.0);
    }

    #[test]
    fn sideless_figure_meets_only_the_primary_output() {
        let verdict = check("EPF for this salary is RM600.00.");
        assert_eq!(verdict.status, ValidationStatus::Rejected);
        assert_eq!(verdict.mismatches[0].fact, "employee");
    }

    #[test]
    fn wrong_share_is_reported_against_the_employee_not_the_total() {
        let verdict = check("EPF takes 11% of your salary, which comes to RM999.00.");
        assert_eq!(verdict.status, ValidationStatus::Rejected);
        assert_eq!(verdict.checked, 2);
        assert_eq!(verdict.mismatches.len(), 1);
        assert_eq!(verdict.mismatches[0].fact, "employee");
        assert_eq!(verdict.mismatches[0].claimed, 999.0);
    }

    #[test]
    fn total_wording_meets_the_total() {
        let verdict = check("EPF contributions come to RM1,150.00 in total.");
        assert_eq!(verdict.status, ValidationStatus::Validated);
    }

    #[test]
    fn a_correct_figure_does_not_cover_a_wrong_one() {
        let verdict = check("Your EPF deduction is RM999.00, leaving RM550.00 as noted.");
        assert_eq!(verdict.status, ValidationStatus::Rejected);
        assert_eq!(verdict.checked, 2);
        assert_eq!(verdict.mismatches.len(), 1);
        assert_eq!(verdict.mismatches[0].claimed, 999.0);
    }

    #[test]
    fn contribution_alternatives_must_each_match() {
        let verdict = check("For EPF the employee pays RM550.00 or RM700.00.");
        assert_eq!(verdict.status, ValidationStatus::Rejected);
        assert_eq!(verdict.mismatches.len(), 1);
        assert_eq!(verdict.mismatches[0].claimed, 700.0);
    }

    #[test]
    fn no_overlap_is_unverified() {
        let verdict = check("Annual leave depends on your contract. SOCSO covers injuries.");
        assert_eq!(verdict.status, ValidationStatus::Unverified);
        assert_eq!(verdict.checked, 0);
    }

    #[test]
    fn restated_salary_is_not_a_claim() {
        let verdict = check("EPF is computed on your RM5,000 salary.");
        assert_eq!(verdict.status, ValidationStatus::Unverified);
    }
}
