//! Numeric inputs stated in the query itself, used when the caller passes none.

use std::sync::LazyLock;

use akta_core::{Citizenship, DayKind, NumericInputs};
use regex::Regex;

use crate::numbers::{NUMBER_WORDS, parse_number};

static SALARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bRM\s?(\d[\d,]*(?:\.\d+)?)|\b(\d[\d,]*(?:\.\d+)?)\s?(?:ringgit|MYR)\b")
        .expect("salary regex is valid")
});

static SERVICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?ix)
        \b(?P<a>\d+(?:\.\d+)?|{NUMBER_WORDS})\s+years?\s+(?:of\s+)?(?:service|employment)
        | \b(?:employed|worked|working|served)\s+(?:here\s+|there\s+)?for\s+(?P<b>\d+(?:\.\d+)?|{NUMBER_WORDS})\s+years?"
    ))
    .expect("service regex is valid")
});

static AGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:aged?|umur)\s+(\d{1,2})\b|\b(\d{1,2})[\s-]years?[\s-]old\b")
        .expect("age regex is valid")
});

static HOURS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s?(?:hours?|hrs?)\b(\s+(?:a|per|each)\s+day|\s+daily)?")
        .expect("hours regex is valid")
});

/// Salary, age, citizenship, years of service, weekly hours and day kind
/// stated in `query`. Fields the query does not state stay unset.
#[must_use]
pub fn extract_inputs(query: &str) -> NumericInputs {
    let mut inputs = NumericInputs::default();

    inputs.salary = SALARY_RE.captures(query).and_then(|c| {
        c.get(1)
            .or_else(|| c.get(2))
            .and_then(|m| parse_number(m.as_str()))
    });
    inputs.years_of_service = SERVICE_RE.captures(query).and_then(|c| {
        c.name("a")
            .or_else(|| c.name("b"))
            .and_then(|m| parse_number(m.as_str()))
    });
    inputs.age = AGE_RE.captures(query).and_then(|c| {
        c.get(1)
            .or_else(|| c.get(2))
            .and_then(|m| m.as_str().parse().ok())
    });
    // "8 hours a day" is a daily figure, not weekly hours.
    inputs.hours_per_week = HOURS_RE
        .captures_iter(query)
        .find(|c| c.get(2).is_none())
        .and_then(|c| c.get(1))
        .and_then(|m| parse_number(m.as_str()));

    let lower = query.to_lowercase();
    inputs.citizenship = if ["foreign worker", "foreigner", "pekerja asing", "expat"]
        .iter()
        .any(|k| lower.contains(k))
    {
        Some(Citizenship::ForeignWorker)
    } else if lower.contains("permanent resident") || lower.split_whitespace().any(|w| w == "pr") {
        Some(Citizenship::PermanentResident)
    } else if ["citizen", "malaysian", "warganegara"].iter().any(|k| lower.contains(k)) {
        Some(Citizenship::Citizen)
    } else {
        None
    };
    inputs.day_kind = if lower.contains("public holiday") || lower.contains("cuti umum") {
        Some(DayKind::PublicHoliday)
    } else if lower.contains("rest day") || lower.contains("hari rehat") {
        Some(DayKind::RestDay)
    } else {
        None
    };

    inputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("How much EPF on RM 5,000?", Some(5000.0))]
    #[case("my salary is RM3500.50 a month", Some(3500.5))]
    #[case("I earn 4200 ringgit", Some(4200.0))]
    #[case("What is the notice period?", None)]
    fn salary(#[case] query: &str, #[case] expected: Option<f64>) {
        assert_eq!(extract_inputs(query).salary, expected);
    }

    #[rstest]
    #[case("notice period for resignation after 2 years of service?", Some(2.0))]
    #[case("I have worked for six years", Some(6.0))]
    #[case("annual leave with 1.5 years service", Some(1.5))]
    #[case("I am 2 years old", None)]
    fn years_of_service(#[case] query: &str, #[case] expected: Option<f64>) {
        assert_eq!(extract_inputs(query).years_of_service, expected);
    }

    #[test]
    fn weekly_hours_skip_daily_figures() {
        assert_eq!(extract_inputs("I work 50 hours a week").hours_per_week, Some(50.0));
        assert_eq!(extract_inputs("I work 10 hours a day").hours_per_week, None);
        assert_eq!(
            extract_inputs("10 hours a day, 55 hours in total").hours_per_week,
            Some(55.0)
        );
    }

    #[test]
    fn reads_people_and_days() {
        let inputs = extract_inputs("A foreign worker aged 45 doing overtime on a public holiday");
        assert_eq!(inputs.citizenship, Some(Citizenship::ForeignWorker));
        assert_eq!(inputs.age, Some(45));
        assert_eq!(inputs.day_kind, Some(DayKind::PublicHoliday));

        let inputs = extract_inputs("I'm a 61-year-old Malaysian on RM2,000");
        assert_eq!(inputs.citizenship, Some(Citizenship::Citizen));
        assert_eq!(inputs.age, Some(61));
        assert_eq!(inputs.salary, Some(2000.0));
    }

    #[test]
    fn plain_question_has_no_inputs() {
        assert!(extract_inputs("Tell me about the Employment Act").is_empty());
    }
}
