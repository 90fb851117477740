//! Rules engine behaviour over the built-in table.

use akta_config::RulesConfig;
use akta_core::{Citizenship, DayKind, NumericInputs, RuleCategory};
use akta_rules::{RuleSet, RulesEngine, RulesError, Tolerance};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn engine() -> RulesEngine {
    RulesEngine::new(RuleSet::builtin().expect("built-in table"), Tolerance::default())
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2026, 3, 15)
}

fn citizen(salary: f64) -> NumericInputs {
    NumericInputs::default()
        .with_salary(salary)
        .with_age(30)
        .with_citizenship(Citizenship::Citizen)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn epf_on_5000_is_reproducible() {
    let engine = engine();
    let first = engine.compute(RuleCategory::Epf, &citizen(5000.0), today()).unwrap();
    assert_eq!(first.rule_id, "epf-citizen-below-60");
    assert!(close(first.value("employee").unwrap(), 550.0));
    assert!(close(first.value("employer").unwrap(), 600.0));
    assert!(close(first.value("employee_rate").unwrap(), 11.0));
    assert!(close(first.value("employer_rate").unwrap(), 12.0));

    for _ in 0..3 {
        let again = engine.compute(RuleCategory::Epf, &citizen(5000.0), today()).unwrap();
        assert_eq!(again, first);
    }
}

#[rstest]
#[case(3000.0, 330.0, 390.0)]
#[case(4999.0, 549.89, 649.87)]
#[case(5000.0, 550.0, 600.0)]
#[case(19999.0, 2199.89, 2399.88)]
#[case(20000.0, 2200.0, 2400.0)]
#[case(50000.0, 5500.0, 6000.0)]
fn epf_brackets_and_ceiling(#[case] salary: f64, #[case] employee: f64, #[case] employer: f64) {
    let fact = engine()
        .compute(RuleCategory::Epf, &citizen(salary), today())
        .unwrap();
    assert!(close(fact.value("employee").unwrap(), employee), "{salary}: {fact:?}");
    assert!(close(fact.value("employer").unwrap(), employer), "{salary}: {fact:?}");
}

#[rstest]
#[case(date(2026, 3, 15), 4000.0, 20.0, 70.0)]
#[case(date(2026, 3, 15), 8000.0, 29.75, 104.15)]
#[case(date(2024, 6, 1), 8000.0, 24.75, 86.65)]
fn socso_caps_follow_effective_date(
    #[case] as_of: NaiveDate,
    #[case] salary: f64,
    #[case] employee: f64,
    #[case] employer: f64,
) {
    let fact = engine()
        .compute(RuleCategory::Socso, &citizen(salary), as_of)
        .unwrap();
    assert!(close(fact.value("employee").unwrap(), employee), "{fact:?}");
    assert!(close(fact.value("employer").unwrap(), employer), "{fact:?}");
}

#[test]
fn eis_requires_working_age() {
    let engine = engine();
    let fact = engine.compute(RuleCategory::Eis, &citizen(4000.0), today()).unwrap();
    assert!(close(fact.value("employee").unwrap(), 8.0));

    let minor = citizen(4000.0).with_age(17);
    let err = engine.compute(RuleCategory::Eis, &minor, today()).unwrap_err();
    assert!(matches!(err, RulesError::NoApplicableRule { category: RuleCategory::Eis, .. }));
}

#[test]
fn age_decides_epf_rule() {
    let senior = citizen(5000.0).with_age(60);
    let fact = engine().compute(RuleCategory::Epf, &senior, today()).unwrap();
    assert_eq!(fact.rule_id, "epf-citizen-60-and-above");
    assert!(close(fact.value("employee").unwrap(), 0.0));
    assert!(close(fact.value("employer").unwrap(), 200.0));
}

#[test]
fn missing_age_is_reported_as_missing_input() {
    let inputs = NumericInputs::default()
        .with_salary(5000.0)
        .with_citizenship(Citizenship::Citizen);
    let err = engine().compute(RuleCategory::Epf, &inputs, today()).unwrap_err();
    assert!(matches!(err, RulesError::MissingInput { field: "age", .. }));
}

#[test]
fn foreign_worker_epf_starts_october_2025() {
    let inputs = NumericInputs::default()
        .with_salary(3000.0)
        .with_citizenship(Citizenship::ForeignWorker);
    let engine = engine();
    let before = engine
        .compute(RuleCategory::Epf, &inputs, date(2025, 9, 30))
        .unwrap_err();
    assert!(matches!(before, RulesError::NoApplicableRule { .. }));

    let after = engine
        .compute(RuleCategory::Epf, &inputs, date(2025, 10, 1))
        .unwrap();
    assert!(close(after.value("employee").unwrap(), 60.0));
    assert!(close(after.value("employer").unwrap(), 60.0));
}

#[rstest]
#[case(date(2025, 1, 31), 1500.0, "minimum-wage-2022")]
#[case(date(2025, 2, 1), 1700.0, "minimum-wage-2025")]
fn minimum_wage_by_date(#[case] as_of: NaiveDate, #[case] minimum: f64, #[case] rule_id: &str) {
    let fact = engine()
        .compute(RuleCategory::MinimumWage, &NumericInputs::default(), as_of)
        .unwrap();
    assert_eq!(fact.rule_id, rule_id);
    assert!(close(fact.value("minimum_wage").unwrap(), minimum));
}

#[test]
fn minimum_wage_before_any_order_has_no_rule() {
    let err = engine()
        .compute(RuleCategory::MinimumWage, &NumericInputs::default(), date(2020, 1, 1))
        .unwrap_err();
    assert!(matches!(err, RulesError::NoApplicableRule { .. }));
}

#[rstest]
#[case(RuleCategory::NoticePeriod, 1.0, 4.0)]
#[case(RuleCategory::NoticePeriod, 2.0, 6.0)]
#[case(RuleCategory::NoticePeriod, 7.0, 8.0)]
#[case(RuleCategory::AnnualLeave, 3.0, 12.0)]
#[case(RuleCategory::SickLeave, 0.5, 14.0)]
#[case(RuleCategory::SickLeave, 5.0, 22.0)]
fn service_entitlements(#[case] category: RuleCategory, #[case] years: f64, #[case] expected: f64) {
    let inputs = NumericInputs::default().with_years_of_service(years);
    let fact = engine().compute(category, &inputs, today()).unwrap();
    assert!(close(fact.value("entitlement").unwrap(), expected), "{fact:?}");
}

#[test]
fn sick_leave_reports_hospitalisation() {
    let inputs = NumericInputs::default().with_years_of_service(1.0);
    let fact = engine().compute(RuleCategory::SickLeave, &inputs, today()).unwrap();
    assert!(close(fact.value("hospitalisation_days").unwrap(), 60.0));
}

#[rstest]
#[case(date(2022, 12, 31), 60.0, "maternity-leave-s37-60")]
#[case(date(2023, 1, 1), 98.0, "maternity-leave-s37-98")]
fn maternity_leave_by_date(#[case] as_of: NaiveDate, #[case] days: f64, #[case] rule_id: &str) {
    let fact = engine()
        .compute(RuleCategory::MaternityLeave, &NumericInputs::default(), as_of)
        .unwrap();
    assert_eq!(fact.rule_id, rule_id);
    assert!(close(fact.value("entitlement").unwrap(), days));
}

#[test]
fn public_holidays_need_no_inputs() {
    let fact = engine()
        .compute(RuleCategory::PublicHolidays, &NumericInputs::default(), today())
        .unwrap();
    assert!(close(fact.value("entitlement").unwrap(), 11.0));
    assert!(close(fact.value("compulsory_holidays").unwrap(), 5.0));
}

#[test]
fn service_entitlement_needs_years() {
    let err = engine()
        .compute(RuleCategory::NoticePeriod, &NumericInputs::default(), today())
        .unwrap_err();
    assert!(matches!(
        err,
        RulesError::MissingInput {
            category: RuleCategory::NoticePeriod,
            field: "years_of_service"
        }
    ));
}

#[test]
fn weekly_limit_changed_in_2023() {
    let inputs = NumericInputs::default()
        .with_hours_per_week(50.0)
        .with_day_kind(DayKind::PublicHoliday);
    let engine = engine();

    let old = engine
        .compute(RuleCategory::WorkingHours, &inputs, date(2022, 6, 1))
        .unwrap();
    assert!(close(old.value("weekly_limit").unwrap(), 48.0));
    assert!(close(old.value("overtime_hours").unwrap(), 2.0));

    let new = engine.compute(RuleCategory::WorkingHours, &inputs, today()).unwrap();
    assert!(close(new.value("weekly_limit").unwrap(), 45.0));
    assert!(close(new.value("overtime_hours").unwrap(), 5.0));
    assert!(close(new.value("overtime_multiplier").unwrap(), 3.0));
    assert!(close(new.value("within_limit").unwrap(), 0.0));
    assert!(close(new.value("monthly_overtime_cap").unwrap(), 104.0));
}

#[test]
fn overtime_beyond_the_monthly_cap_is_flagged() {
    let inputs = NumericInputs::default().with_hours_per_week(72.0);
    let fact = engine().compute(RuleCategory::WorkingHours, &inputs, today()).unwrap();
    assert!(close(fact.value("monthly_overtime").unwrap(), 117.0));
    assert!(close(fact.value("within_overtime_cap").unwrap(), 0.0));
}

#[test]
fn overlapping_rules_surface_as_ambiguous() {
    let raw = r#"
[[rule]]
id = "eis-a"
category = "eis"
effective_from = "2024-01-01"

[rule.formula]
kind = "contribution"
brackets = [{ low = 0, high = 6000, employee_rate = 0.2, employer_rate = 0.2 }]

[[rule]]
id = "eis-b"
category = "eis"
effective_from = "2025-01-01"

[rule.formula]
kind = "contribution"
brackets = [{ low = 0, high = 6000, employee_rate = 0.3, employer_rate = 0.3 }]
"#;
    assert!(matches!(
        RuleSet::from_toml_str(raw).unwrap_err(),
        RulesError::Integrity { .. }
    ));

    let engine = RulesEngine::new(RuleSet::from_toml_str_unchecked(raw).unwrap(), Tolerance::default());
    let err = engine
        .compute(RuleCategory::Eis, &citizen(3000.0), today())
        .unwrap_err();
    match err {
        RulesError::AmbiguousRule { rule_ids, .. } => assert_eq!(rule_ids, vec!["eis-a", "eis-b"]),
        other => panic!("expected AmbiguousRule, got {other:?}"),
    }
    // Before the second rule starts only one applies.
    assert!(engine.compute(RuleCategory::Eis, &citizen(3000.0), date(2024, 6, 1)).is_ok());
}

#[test]
fn salary_breakdown_for_citizen() {
    let breakdown = engine().salary_breakdown(&citizen(5000.0), today()).unwrap();
    assert_eq!(breakdown.contributions.len(), 3);
    assert!(close(breakdown.employee_deductions, 585.0));
    assert!(close(breakdown.net_pay, 4415.0));
    assert!(close(breakdown.employer_contributions, 697.5));
    assert!(close(breakdown.employer_cost, 5697.5));
    assert_eq!(breakdown.minimum_wage, Some(1700.0));
    assert_eq!(breakdown.meets_minimum_wage, Some(true));
    assert!(breakdown.notes.is_empty());
}

#[test]
fn salary_breakdown_notes_missing_schemes() {
    let inputs = NumericInputs::default()
        .with_salary(1600.0)
        .with_citizenship(Citizenship::ForeignWorker);
    let breakdown = engine().salary_breakdown(&inputs, today()).unwrap();
    assert!(close(breakdown.employee_deductions, 32.0));
    assert!(close(breakdown.employer_contributions, 52.0));
    assert_eq!(breakdown.meets_minimum_wage, Some(false));
    assert_eq!(breakdown.notes.len(), 1);
    assert!(breakdown.notes[0].contains("eis"));
}

#[test]
fn salary_breakdown_needs_salary() {
    let err = engine()
        .salary_breakdown(&NumericInputs::default(), today())
        .unwrap_err();
    assert!(matches!(err, RulesError::MissingInput { field: "salary", .. }));
}

#[test]
fn from_config_loads_table_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rules.toml");
    std::fs::write(
        &path,
        r#"
[[rule]]
id = "minimum-wage-test"
category = "minimum_wage"
effective_from = "2020-01-01"

[rule.formula]
kind = "threshold"
minimum = 2000
"#,
    )
    .unwrap();

    let config = RulesConfig {
        table_path: path.display().to_string(),
        ..RulesConfig::default()
    };
    let engine = RulesEngine::from_config(&config).unwrap();
    assert_eq!(engine.rules().len(), 1);
    let fact = engine
        .compute(RuleCategory::MinimumWage, &NumericInputs::default(), today())
        .unwrap();
    assert!(close(fact.value("minimum_wage").unwrap(), 2000.0));
}
