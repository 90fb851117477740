//! Rule formulas: pure functions from [`NumericInputs`] to named figures.
//!
//! Each rule carries exactly one formula variant, tagged by `kind` in the
//! rule table:
//!
//! ```toml
//! [rule.formula]
//! kind = "contribution"
//! employee_cap = 29.75
//! brackets = [
//!     { low = 0, high = 5950, employee_rate = 0.5, employer_rate = 1.75 },
//! ]
//! ```
//!
//! Currency amounts are rounded to the cent, half away from zero.

use akta_core::{DayKind, FactUnit, FactValue, NumericInputs, RuleCategory};
use serde::{Deserialize, Serialize};

use crate::error::RulesError;

/// Round to the cent, half away from zero.
///
/// The scaled value is first settled to six decimals of a cent, so a half
/// that binary cannot represent exactly (`1.005` is stored as
/// `1.00499999...`) still rounds up.
#[must_use]
pub fn round_cents(value: f64) -> f64 {
    let cents = (value * 100.0 * 1e6).round() / 1e6;
    cents.round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Formula {
    /// Salary-bracket contribution rates (EPF, SOCSO, EIS).
    Contribution(ContributionTable),
    /// Statutory minimum (minimum wage).
    Threshold(Threshold),
    /// Entitlement by length of service (leave, notice).
    ServiceTable(ServiceTable),
    /// Entitlement that does not depend on the employee (maternity leave,
    /// gazetted holidays).
    Entitlement(FixedEntitlement),
    /// Weekly hours limit and overtime multipliers.
    HoursLimit(HoursLimit),
}

impl Formula {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Contribution(_) => "contribution",
            Self::Threshold(_) => "threshold",
            Self::ServiceTable(_) => "service_table",
            Self::Entitlement(_) => "entitlement",
            Self::HoursLimit(_) => "hours_limit",
        }
    }

    /// Whether this formula kind computes `category`.
    #[must_use]
    pub const fn fits(&self, category: RuleCategory) -> bool {
        match self {
            Self::Contribution(_) => category.is_contribution(),
            Self::Threshold(_) => matches!(category, RuleCategory::MinimumWage),
            Self::ServiceTable(_) | Self::Entitlement(_) => category.is_entitlement(),
            Self::HoursLimit(_) => matches!(category, RuleCategory::WorkingHours),
        }
    }

    /// Structural checks, returning the reason the formula is unusable.
    pub(crate) fn check(&self) -> Result<(), String> {
        match self {
            Self::Contribution(table) => table.check(),
            Self::Threshold(threshold) => {
                if threshold.minimum > 0.0 {
                    Ok(())
                } else {
                    Err("minimum must be positive".into())
                }
            }
            Self::ServiceTable(table) => table.check(),
            Self::Entitlement(entitlement) => entitlement.check(),
            Self::HoursLimit(limit) => limit.check(),
        }
    }

    /// Evaluate the formula. Pure: identical inputs yield identical outputs.
    pub(crate) fn evaluate(
        &self,
        category: RuleCategory,
        inputs: &NumericInputs,
    ) -> Result<Vec<FactValue>, RulesError> {
        match self {
            Self::Contribution(table) => {
                let salary = required_salary(category, inputs)?;
                Ok(table.evaluate(salary))
            }
            Self::Threshold(threshold) => Ok(threshold.evaluate(inputs.salary)),
            Self::ServiceTable(table) => {
                let years = inputs.years_of_service.ok_or(RulesError::MissingInput {
                    category,
                    field: "years_of_service",
                })?;
                if years < 0.0 || !years.is_finite() {
                    return Err(RulesError::InvalidInput {
                        field: "years_of_service",
                        reason: format!("{years} is not a length of service"),
                    });
                }
                Ok(table.evaluate(years))
            }
            Self::Entitlement(entitlement) => Ok(entitlement.evaluate()),
            Self::HoursLimit(limit) => limit.evaluate(inputs),
        }
    }
}

fn required_salary(category: RuleCategory, inputs: &NumericInputs) -> Result<f64, RulesError> {
    let salary = inputs.salary.ok_or(RulesError::MissingInput {
        category,
        field: "salary",
    })?;
    if salary < 0.0 || !salary.is_finite() {
        return Err(RulesError::InvalidInput {
            field: "salary",
            reason: format!("{salary} is not a monthly wage"),
        });
    }
    Ok(salary)
}

// ---------------------------------------------------------------------------
// Contribution
// ---------------------------------------------------------------------------

/// One half-open `[low, high)` salary bracket. Rates are percentages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bracket {
    pub low: f64,
    pub high: f64,
    pub employee_rate: f64,
    pub employer_rate: f64,
}

impl Bracket {
    #[must_use]
    pub fn contains(&self, salary: f64) -> bool {
        salary >= self.low && salary < self.high
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContributionTable {
    /// Contiguous, ascending brackets.
    pub brackets: Vec<Bracket>,
    /// Monthly ceiling on the employee share, in RM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_cap: Option<f64>,
    /// Monthly ceiling on the employer share, in RM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer_cap: Option<f64>,
}

impl ContributionTable {
    /// Bracket governing `salary`.
    ///
    /// Below the first bracket the salary clamps to the first bracket; at or
    /// above the top bracket's `high` the top bracket applies, so a lookup
    /// never fails for a non-empty table.
    #[must_use]
    pub fn bracket_for(&self, salary: f64) -> Option<&Bracket> {
        let first = self.brackets.first()?;
        if salary < first.low {
            return Some(first);
        }
        self.brackets
            .iter()
            .find(|b| b.contains(salary))
            .or_else(|| self.brackets.last())
    }

    fn evaluate(&self, salary: f64) -> Vec<FactValue> {
        let Some(bracket) = self.bracket_for(salary) else {
            return Vec::new();
        };
        let share = |rate: f64, cap: Option<f64>| {
            let amount = round_cents(salary * rate / 100.0);
            cap.map_or(amount, |cap| amount.min(cap))
        };
        let employee = share(bracket.employee_rate, self.employee_cap);
        let employer = share(bracket.employer_rate, self.employer_cap);
        vec![
            FactValue::new("employee", employee, FactUnit::Currency),
            FactValue::new("employer", employer, FactUnit::Currency),
            FactValue::new("total", round_cents(employee + employer), FactUnit::Currency),
            FactValue::new("employee_rate", bracket.employee_rate, FactUnit::Percent),
            FactValue::new("employer_rate", bracket.employer_rate, FactUnit::Percent),
        ]
    }

    fn check(&self) -> Result<(), String> {
        let Some(first) = self.brackets.first() else {
            return Err("contribution table has no brackets".into());
        };
        if first.low < 0.0 {
            return Err(format!("first bracket starts below zero ({})", first.low));
        }
        for bracket in &self.brackets {
            if bracket.low >= bracket.high {
                return Err(format!("bracket [{}, {}) is empty", bracket.low, bracket.high));
            }
            for rate in [bracket.employee_rate, bracket.employer_rate] {
                if !(0.0..=100.0).contains(&rate) {
                    return Err(format!("rate {rate} is not a percentage"));
                }
            }
        }
        for pair in self.brackets.windows(2) {
            if (pair[0].high - pair[1].low).abs() > f64::EPSILON {
                return Err(format!(
                    "brackets are not contiguous at {} / {}",
                    pair[0].high, pair[1].low
                ));
            }
        }
        for cap in [self.employee_cap, self.employer_cap].into_iter().flatten() {
            if cap < 0.0 {
                return Err(format!("negative cap {cap}"));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Threshold
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Threshold {
    /// Monthly minimum in RM.
    pub minimum: f64,
}

impl Threshold {
    fn evaluate(self, salary: Option<f64>) -> Vec<FactValue> {
        let mut values = vec![FactValue::new("minimum_wage", self.minimum, FactUnit::Currency)];
        if let Some(salary) = salary {
            let shortfall = round_cents((self.minimum - salary).max(0.0));
            values.push(FactValue::new(
                "meets_minimum",
                flag(salary >= self.minimum),
                FactUnit::Flag,
            ));
            values.push(FactValue::new("shortfall", shortfall, FactUnit::Currency));
        }
        values
    }
}

// ---------------------------------------------------------------------------
// Service table
// ---------------------------------------------------------------------------

/// Entitlement for `[min_years, max_years)` of service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceStep {
    pub min_years: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_years: Option<f64>,
    pub value: f64,
}

/// A constant figure reported next to the entitlement, e.g. hospitalisation days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixedValue {
    pub name: String,
    pub value: f64,
    pub unit: FactUnit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceTable {
    /// `days` or `weeks`.
    pub unit: FactUnit,
    /// Contiguous steps from zero years; the last is open-ended.
    pub steps: Vec<ServiceStep>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<FixedValue>,
}

impl ServiceTable {
    fn step_for(&self, years: f64) -> Option<&ServiceStep> {
        self.steps
            .iter()
            .find(|s| years >= s.min_years && s.max_years.is_none_or(|max| years < max))
    }

    fn evaluate(&self, years: f64) -> Vec<FactValue> {
        let mut values = Vec::with_capacity(1 + self.extra.len());
        if let Some(step) = self.step_for(years) {
            values.push(FactValue::new("entitlement", step.value, self.unit));
        }
        values.extend(
            self.extra
                .iter()
                .map(|e| FactValue::new(e.name.clone(), e.value, e.unit)),
        );
        values
    }

    fn check(&self) -> Result<(), String> {
        if !matches!(self.unit, FactUnit::Days | FactUnit::Weeks) {
            return Err(format!("service table unit must be days or weeks, not {}", self.unit));
        }
        for step in &self.steps {
            if step.value < 0.0 {
                return Err(format!("negative entitlement {}", step.value));
            }
        }
        let (Some(first), Some(last)) = (self.steps.first(), self.steps.last()) else {
            return Err("service table has no steps".into());
        };
        if first.min_years.abs() > f64::EPSILON {
            return Err(format!("first step starts at {} years, not 0", first.min_years));
        }
        if last.max_years.is_some() {
            return Err("last step must be open-ended".into());
        }
        for pair in self.steps.windows(2) {
            match pair[0].max_years {
                Some(max) if (max - pair[1].min_years).abs() < f64::EPSILON && max > pair[0].min_years => {}
                _ => {
                    return Err(format!(
                        "steps are not contiguous after {} years",
                        pair[0].min_years
                    ));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Fixed entitlement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixedEntitlement {
    /// `days` or `weeks`.
    pub unit: FactUnit,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Vec<FixedValue>,
}

impl FixedEntitlement {
    fn evaluate(&self) -> Vec<FactValue> {
        std::iter::once(FactValue::new("entitlement", self.value, self.unit))
            .chain(
                self.extra
                    .iter()
                    .map(|e| FactValue::new(e.name.clone(), e.value, e.unit)),
            )
            .collect()
    }

    fn check(&self) -> Result<(), String> {
        if !matches!(self.unit, FactUnit::Days | FactUnit::Weeks) {
            return Err(format!("entitlement unit must be days or weeks, not {}", self.unit));
        }
        if self.value <= 0.0 {
            return Err("entitlement must be positive".into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Hours limit
// ---------------------------------------------------------------------------

/// Weeks in a month, for spreading weekly overtime over a month.
const WEEKS_PER_MONTH: f64 = 52.0 / 12.0;

/// Overtime pay multipliers by kind of day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OvertimeMultipliers {
    pub normal: f64,
    pub rest_day: f64,
    pub public_holiday: f64,
}

impl OvertimeMultipliers {
    #[must_use]
    pub const fn for_day(&self, day: DayKind) -> f64 {
        match day {
            DayKind::Normal => self.normal,
            DayKind::RestDay => self.rest_day,
            DayKind::PublicHoliday => self.public_holiday,
        }
    }
}

const fn default_normal_day_hours() -> f64 {
    8.0
}

const fn default_working_days_per_month() -> f64 {
    26.0
}

const fn default_max_overtime_per_month() -> f64 {
    104.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HoursLimit {
    pub weekly_limit: f64,
    /// Normal hours in a day, for the hourly rate of pay.
    #[serde(default = "default_normal_day_hours")]
    pub normal_day_hours: f64,
    /// Divisor from monthly wages to the ordinary rate of pay.
    #[serde(default = "default_working_days_per_month")]
    pub working_days_per_month: f64,
    /// Overtime hours an employee may be asked to work in a month.
    #[serde(default = "default_max_overtime_per_month")]
    pub max_overtime_per_month: f64,
    pub overtime: OvertimeMultipliers,
}

impl HoursLimit {
    fn evaluate(&self, inputs: &NumericInputs) -> Result<Vec<FactValue>, RulesError> {
        let day = inputs.day_kind.unwrap_or_default();
        let multiplier = self.overtime.for_day(day);
        let mut values = vec![
            FactValue::new("weekly_limit", self.weekly_limit, FactUnit::Hours),
            FactValue::new("daily_limit", self.normal_day_hours, FactUnit::Hours),
            FactValue::new("overtime_multiplier", multiplier, FactUnit::Multiplier),
            FactValue::new(
                "monthly_overtime_cap",
                self.max_overtime_per_month,
                FactUnit::Hours,
            ),
        ];

        let hourly_rate = inputs
            .salary
            .map(|_| required_salary(RuleCategory::WorkingHours, inputs))
            .transpose()?
            .map(|salary| round_cents(salary / self.working_days_per_month / self.normal_day_hours));
        if let Some(rate) = hourly_rate {
            values.push(FactValue::new("hourly_rate", rate, FactUnit::Currency));
        }

        if let Some(hours) = inputs.hours_per_week {
            if hours < 0.0 || !hours.is_finite() {
                return Err(RulesError::InvalidInput {
                    field: "hours_per_week",
                    reason: format!("{hours} is not a number of hours"),
                });
            }
            let overtime = (hours - self.weekly_limit).max(0.0);
            values.push(FactValue::new("overtime_hours", overtime, FactUnit::Hours));
            values.push(FactValue::new(
                "within_limit",
                flag(hours <= self.weekly_limit),
                FactUnit::Flag,
            ));
            let monthly = round_cents(overtime * WEEKS_PER_MONTH);
            values.push(FactValue::new("monthly_overtime", monthly, FactUnit::Hours));
            values.push(FactValue::new(
                "within_overtime_cap",
                flag(monthly <= self.max_overtime_per_month),
                FactUnit::Flag,
            ));
            if let Some(rate) = hourly_rate {
                values.push(FactValue::new(
                    "overtime_pay",
                    round_cents(overtime * rate * multiplier),
                    FactUnit::Currency,
                ));
            }
        }
        Ok(values)
    }

    fn check(&self) -> Result<(), String> {
        let positive = [
            ("weekly_limit", self.weekly_limit),
            ("normal_day_hours", self.normal_day_hours),
            ("working_days_per_month", self.working_days_per_month),
            ("max_overtime_per_month", self.max_overtime_per_month),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(format!("{name} must be positive"));
        }
        let multipliers = [
            self.overtime.normal,
            self.overtime.rest_day,
            self.overtime.public_holiday,
        ];
        if multipliers.iter().any(|m| *m < 1.0) {
            return Err("overtime multipliers must be at least 1".into());
        }
        Ok(())
    }
}

const fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}
