//! Keyword-based detection of the statutory categories a query asks about.
//!
//! Matching is on whole words, case-insensitive. This is deliberately a
//! keyword table, not language understanding.

use akta_core::RuleCategory;

/// Keywords that name a category, in English and Malay.
#[must_use]
pub const fn keywords(category: RuleCategory) -> &'static [&'static str] {
    match category {
        RuleCategory::Epf => &["epf", "kwsp", "provident fund", "retirement fund"],
        RuleCategory::Socso => &["socso", "perkeso", "social security"],
        RuleCategory::Eis => &["eis", "sip", "employment insurance"],
        RuleCategory::MinimumWage => &["minimum wage", "minimum wages", "gaji minimum"],
        RuleCategory::AnnualLeave => &["annual leave", "cuti tahunan", "paid leave", "vacation"],
        RuleCategory::SickLeave => &[
            "sick leave",
            "medical leave",
            "cuti sakit",
            "hospitalisation",
            "hospitalization",
        ],
        RuleCategory::MaternityLeave => &[
            "maternity leave",
            "maternity",
            "cuti bersalin",
            "pregnant",
            "pregnancy",
        ],
        RuleCategory::PublicHolidays => &[
            "public holiday",
            "public holidays",
            "gazetted holiday",
            "gazetted holidays",
            "cuti umum",
        ],
        RuleCategory::NoticePeriod => &[
            "notice period",
            "notice",
            "resign",
            "resignation",
            "termination",
            "terminate",
        ],
        RuleCategory::WorkingHours => &[
            "working hours",
            "hours of work",
            "work hours",
            "overtime",
            "kerja lebih masa",
        ],
    }
}

/// Words that ask for every payroll contribution at once.
const PAYROLL_KEYWORDS: &[&str] = &[
    "contribution",
    "contributions",
    "deduction",
    "deductions",
    "payroll",
    "statutory",
    "caruman",
];

/// ` word word ` form of `text`, so keywords match on word boundaries.
fn phrase(text: &str) -> String {
    let mut out = String::from(" ");
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        out.push_str(&word.to_lowercase());
        out.push(' ');
    }
    out
}

fn contains_keyword(phrase: &str, keyword: &str) -> bool {
    phrase.contains(&format!(" {keyword} "))
}

/// Whether `text` names `category`.
#[must_use]
pub fn mentions(text: &str, category: RuleCategory) -> bool {
    let phrase = phrase(text);
    keywords(category)
        .iter()
        .any(|k| contains_keyword(&phrase, k))
}

/// Categories `query` asks about, in [`RuleCategory::ALL`] order.
///
/// A generic payroll question ("what are my statutory deductions?") selects
/// EPF, SOCSO and EIS.
#[must_use]
pub fn detect_categories(query: &str) -> Vec<RuleCategory> {
    let phrase = phrase(query);
    let payroll = PAYROLL_KEYWORDS.iter().any(|k| contains_keyword(&phrase, k));
    RuleCategory::ALL
        .iter()
        .copied()
        .filter(|category| {
            (payroll && category.is_contribution())
                || keywords(*category)
                    .iter()
                    .any(|k| contains_keyword(&phrase, k))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("How much EPF do I pay on RM5000?", vec![RuleCategory::Epf])]
    #[case(
        "What is the notice period for resignation after 2 years of service?",
        vec![RuleCategory::NoticePeriod]
    )]
    #[case(
        "What are my statutory deductions on RM4,000?",
        vec![RuleCategory::Epf, RuleCategory::Socso, RuleCategory::Eis]
    )]
    #[case("Is RM1,600 above the minimum wage?", vec![RuleCategory::MinimumWage])]
    #[case(
        "Overtime on a rest day and my annual leave",
        vec![RuleCategory::AnnualLeave, RuleCategory::WorkingHours]
    )]
    #[case("Berapa caruman KWSP saya?", vec![RuleCategory::Epf, RuleCategory::Socso, RuleCategory::Eis])]
    #[case("How long is maternity leave now?", vec![RuleCategory::MaternityLeave])]
    #[case("Berapa hari cuti umum setahun?", vec![RuleCategory::PublicHolidays])]
    #[case("Tell me about the Employment Act", vec![])]
    fn detects_categories(#[case] query: &str, #[case] expected: Vec<RuleCategory>) {
        assert_eq!(detect_categories(query), expected);
    }

    #[test]
    fn keywords_match_whole_words() {
        assert!(!mentions("their new policy", RuleCategory::Eis));
        assert!(mentions("the EIS scheme", RuleCategory::Eis));
        assert!(!mentions("noticeable changes", RuleCategory::NoticePeriod));
    }

    #[test]
    fn every_category_has_keywords() {
        for category in RuleCategory::ALL {
            assert!(!keywords(*category).is_empty());
        }
    }
}
