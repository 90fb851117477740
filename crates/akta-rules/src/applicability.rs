//! Applicability predicates and effective date ranges.
//!
//! Every range here is half-open: `min` is inclusive, `max` exclusive, and a
//! missing bound is unbounded.

use akta_core::{Citizenship, NumericInputs};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Half-open `[min, max)` range over ages or amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Bounds<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    #[must_use]
    pub const fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn contains(&self, value: T) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value < max)
    }

    /// Whether some value lies in both ranges.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let below = |min: Option<T>, max: Option<T>| match (min, max) {
            (Some(min), Some(max)) => min < max,
            _ => true,
        };
        below(self.min, other.max) && below(other.min, self.max)
    }

    /// `min < max` when both are set.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => min < max,
            _ => true,
        }
    }
}

/// Half-open `[from, until)` range of dates a rule is in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectiveRange {
    pub from: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<NaiveDate>,
}

impl EffectiveRange {
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.from && self.until.is_none_or(|until| date < until)
    }

    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.until.is_none_or(|until| other.from < until)
            && other.until.is_none_or(|until| self.from < until)
    }
}

/// Which employees a rule covers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Applicability {
    /// Empty covers every citizenship status.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citizenship: Vec<Citizenship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Bounds<u32>>,
    /// Monthly salary range in RM.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<Bounds<f64>>,
}

impl Applicability {
    /// Whether the predicate holds for `inputs`. A constrained field that the
    /// inputs leave unset does not match.
    #[must_use]
    pub fn matches(&self, inputs: &NumericInputs) -> bool {
        let citizenship = self.citizenship.is_empty()
            || inputs
                .citizenship
                .is_some_and(|c| self.citizenship.contains(&c));
        let age = self
            .age
            .is_none_or(|bounds| inputs.age.is_some_and(|age| bounds.contains(age)));
        let salary = self
            .salary
            .is_none_or(|bounds| inputs.salary.is_some_and(|salary| bounds.contains(salary)));
        citizenship && age && salary
    }

    /// First field the predicate constrains but `inputs` leaves unset, provided
    /// every field that is set satisfies the predicate. `None` when a set
    /// field already rules the predicate out.
    #[must_use]
    pub fn missing_field(&self, inputs: &NumericInputs) -> Option<&'static str> {
        let citizenship_ok = self.citizenship.is_empty()
            || inputs
                .citizenship
                .is_none_or(|c| self.citizenship.contains(&c));
        let age_ok = self
            .age
            .is_none_or(|bounds| inputs.age.is_none_or(|age| bounds.contains(age)));
        let salary_ok = self
            .salary
            .is_none_or(|bounds| inputs.salary.is_none_or(|salary| bounds.contains(salary)));
        if !(citizenship_ok && age_ok && salary_ok) {
            return None;
        }
        if !self.citizenship.is_empty() && inputs.citizenship.is_none() {
            return Some("citizenship");
        }
        if self.age.is_some() && inputs.age.is_none() {
            return Some("age");
        }
        if self.salary.is_some() && inputs.salary.is_none() {
            return Some("salary");
        }
        None
    }

    /// Whether some inputs satisfy both predicates.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let citizenship = self.citizenship.is_empty()
            || other.citizenship.is_empty()
            || self.citizenship.iter().any(|c| other.citizenship.contains(c));
        let age = match (&self.age, &other.age) {
            (Some(a), Some(b)) => a.overlaps(b),
            _ => true,
        };
        let salary = match (&self.salary, &other.salary) {
            (Some(a), Some(b)) => a.overlaps(b),
            _ => true,
        };
        citizenship && age && salary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[rstest]
    #[case(59, true)]
    #[case(60, false)]
    #[case(0, true)]
    fn age_bounds_are_half_open(#[case] age: u32, #[case] expected: bool) {
        let bounds = Bounds::new(None, Some(60));
        assert_eq!(bounds.contains(age), expected);
    }

    #[rstest]
    #[case(Bounds::new(None, Some(60)), Bounds::new(Some(60), None), false)]
    #[case(Bounds::new(None, Some(61)), Bounds::new(Some(60), None), true)]
    #[case(Bounds::new(Some(18), Some(60)), Bounds::new(None, None), true)]
    #[case(Bounds::new(Some(30), Some(40)), Bounds::new(Some(10), Some(20)), false)]
    fn bounds_overlap(#[case] a: Bounds<u32>, #[case] b: Bounds<u32>, #[case] expected: bool) {
        assert_eq!(a.overlaps(&b), expected);
        assert_eq!(b.overlaps(&a), expected);
    }

    #[test]
    fn effective_ranges_touching_do_not_overlap() {
        let old = EffectiveRange {
            from: date(2022, 5, 1),
            until: Some(date(2025, 2, 1)),
        };
        let new = EffectiveRange {
            from: date(2025, 2, 1),
            until: None,
        };
        assert!(!old.overlaps(&new));
        assert!(old.contains(date(2025, 1, 31)));
        assert!(!old.contains(date(2025, 2, 1)));
        assert!(new.contains(date(2025, 2, 1)));
        assert!(!new.contains(date(2025, 1, 31)));
    }

    #[test]
    fn unset_constrained_field_does_not_match() {
        let predicate = Applicability {
            citizenship: vec![Citizenship::Citizen],
            age: Some(Bounds::new(None, Some(60))),
            salary: None,
        };
        let inputs = NumericInputs::default().with_citizenship(Citizenship::Citizen);
        assert!(!predicate.matches(&inputs));
        assert_eq!(predicate.missing_field(&inputs), Some("age"));
        assert!(predicate.matches(&inputs.with_age(30)));
        assert!(!predicate.matches(&inputs.with_age(30).with_citizenship(Citizenship::ForeignWorker)));

        let foreign = NumericInputs::default().with_citizenship(Citizenship::ForeignWorker);
        assert_eq!(predicate.missing_field(&foreign), None);
    }

    #[test]
    fn citizenship_sets_overlap_when_either_is_open() {
        let citizens = Applicability {
            citizenship: vec![Citizenship::Citizen, Citizenship::PermanentResident],
            ..Applicability::default()
        };
        let foreign = Applicability {
            citizenship: vec![Citizenship::ForeignWorker],
            ..Applicability::default()
        };
        assert!(!citizens.overlaps(&foreign));
        assert!(citizens.overlaps(&Applicability::default()));
    }
}
