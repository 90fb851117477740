use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Citizenship, DayKind};

/// Caller-supplied numeric facts the rules engine evaluates against.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct NumericInputs {
    /// Monthly wages in RM.
    pub salary: Option<f64>,
    pub age: Option<u32>,
    pub citizenship: Option<Citizenship>,
    pub years_of_service: Option<f64>,
    pub hours_per_week: Option<f64>,
    pub day_kind: Option<DayKind>,
}

impl NumericInputs {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.salary.is_none()
            && self.age.is_none()
            && self.citizenship.is_none()
            && self.years_of_service.is_none()
            && self.hours_per_week.is_none()
            && self.day_kind.is_none()
    }

    /// Fill every unset field from `fallback`; fields already set win.
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            salary: self.salary.or(fallback.salary),
            age: self.age.or(fallback.age),
            citizenship: self.citizenship.or(fallback.citizenship),
            years_of_service: self.years_of_service.or(fallback.years_of_service),
            hours_per_week: self.hours_per_week.or(fallback.hours_per_week),
            day_kind: self.day_kind.or(fallback.day_kind),
        }
    }

    #[must_use]
    pub const fn with_salary(mut self, salary: f64) -> Self {
        self.salary = Some(salary);
        self
    }

    #[must_use]
    pub const fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    #[must_use]
    pub const fn with_citizenship(mut self, citizenship: Citizenship) -> Self {
        self.citizenship = Some(citizenship);
        self
    }

    #[must_use]
    pub const fn with_years_of_service(mut self, years: f64) -> Self {
        self.years_of_service = Some(years);
        self
    }

    #[must_use]
    pub const fn with_hours_per_week(mut self, hours: f64) -> Self {
        self.hours_per_week = Some(hours);
        self
    }

    #[must_use]
    pub const fn with_day_kind(mut self, day_kind: DayKind) -> Self {
        self.day_kind = Some(day_kind);
        self
    }
}
