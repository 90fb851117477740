//! Numeric claim extraction from generated text.
//!
//! A claim is a figure with a unit (`RM550.00`, `11%`, `6 weeks`, `45 hours`,
//! `1.5x`) in a sentence that names a statutory category. Role words in the
//! same clause (`employee`, `employer`) say which side of a contribution the
//! figure belongs to. Without one, a clause addressed to the reader ("your
//! share", "deducted") is the employee's side unless it speaks of a total.

use std::sync::LazyLock;

use akta_core::{FactUnit, RuleCategory};
use akta_rules::intent;
use regex::Regex;

use crate::numbers::{NUMBER_WORDS, parse_number};

static FIGURE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?ix)
        \bRM\s?(?P<rm>\d[\d,]*(?:\.\d+)?)
        | \b(?P<pct>\d+(?:\.\d+)?)\s?(?:%|per\s?cent\b)
        | \b(?P<qty>\d+(?:\.\d+)?|{NUMBER_WORDS})(?:\s+|-)(?P<unit>days?|weeks?|hours?)\b
        | \b(?P<mult>\d+(?:\.\d+)?)\s?(?:x\b|times\b|×)"
    ))
    .expect("figure regex is valid")
});

static CLAUSE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i),\s|;|\s(?:and|while|whereas|but)\s").expect("clause regex is valid")
});

static EMPLOYEE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:employees?|workers?|pekerja)\b").expect("employee regex is valid")
});

static EMPLOYER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:employers?|majikan)\b").expect("employer regex is valid")
});

static READER_SIDE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:your|deduct(?:ion|ions|ed|s)?|take-home|potongan)\b")
        .expect("reader side regex is valid")
});

static TOTAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:total|combined|altogether|jumlah)\b").expect("total regex is valid")
});

/// Side of a contribution a figure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Employee,
    Employer,
}

impl Role {
    /// Role a fact output name belongs to: `employee_rate` is the employee's.
    #[must_use]
    pub fn of_fact(name: &str) -> Option<Self> {
        if name.starts_with("employee") {
            Some(Self::Employee)
        } else if name.starts_with("employer") {
            Some(Self::Employer)
        } else {
            None
        }
    }
}

/// One figure stated in generated text.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub value: f64,
    pub unit: FactUnit,
    pub role: Option<Role>,
    /// The clause speaks of a combined amount.
    pub total: bool,
    /// Categories the sentence names, or the last ones named in the paragraph.
    pub categories: Vec<RuleCategory>,
    pub sentence: String,
    /// Position of the sentence in the text.
    pub sentence_index: usize,
}

/// Every figure in `text` that sits in a category-bearing sentence.
#[must_use]
pub fn extract_claims(text: &str) -> Vec<Claim> {
    let mut claims = Vec::new();
    let mut position = 0;
    for paragraph in paragraphs(text) {
        let mut context: Vec<RuleCategory> = Vec::new();
        for sentence in sentences(paragraph) {
            position += 1;
            let named: Vec<RuleCategory> = RuleCategory::ALL
                .iter()
                .copied()
                .filter(|c| intent::mentions(sentence, *c))
                .collect();
            if !named.is_empty() {
                context = named;
            }
            if context.is_empty() {
                continue;
            }
            let breaks = clause_breaks(sentence);
            for figure in FIGURE_RE.captures_iter(sentence) {
                let Some((value, unit)) = figure_value(&figure) else {
                    continue;
                };
                let at = figure.get(0).map_or(0, |m| m.start());
                let clause = clause_at(sentence, &breaks, at);
                claims.push(Claim {
                    value,
                    unit,
                    role: role_in(clause),
                    total: TOTAL_RE.is_match(clause),
                    categories: context.clone(),
                    sentence: sentence.to_string(),
                    sentence_index: position,
                });
            }
        }
    }
    claims
}

fn figure_value(caps: &regex::Captures<'_>) -> Option<(f64, FactUnit)> {
    if let Some(m) = caps.name("rm") {
        return parse_number(m.as_str()).map(|v| (v, FactUnit::Currency));
    }
    if let Some(m) = caps.name("pct") {
        return parse_number(m.as_str()).map(|v| (v, FactUnit::Percent));
    }
    if let (Some(qty), Some(unit)) = (caps.name("qty"), caps.name("unit")) {
        let unit = match unit.as_str().to_ascii_lowercase().trim_end_matches('s') {
            "day" => FactUnit::Days,
            "week" => FactUnit::Weeks,
            _ => FactUnit::Hours,
        };
        return parse_number(qty.as_str()).map(|v| (v, unit));
    }
    caps.name("mult")
        .and_then(|m| parse_number(m.as_str()))
        .map(|v| (v, FactUnit::Multiplier))
}

fn paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Sentences end at `.`, `!` or `?` followed by whitespace, and at line
/// breaks. A decimal point never ends a sentence.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let end = match c {
            '\n' => Some((i, i + 1)),
            '.' | '!' | '?' => match chars.peek() {
                None => Some((i + 1, i + 1)),
                Some((_, next)) if next.is_whitespace() => Some((i + 1, i + 1)),
                Some(_) => None,
            },
            _ => None,
        };
        if let Some((end, next_start)) = end {
            let sentence = text[start..end].trim();
            if !sentence.is_empty() {
                out.push(sentence);
            }
            start = next_start;
        }
    }
    let tail = text[start..].trim();
    if !tail.is_empty() {
        out.push(tail);
    }
    out
}

fn clause_breaks(sentence: &str) -> Vec<(usize, usize)> {
    CLAUSE_BREAK_RE
        .find_iter(sentence)
        .map(|m| (m.start(), m.end()))
        .collect()
}

/// The clause of `sentence` around byte offset `at`.
fn clause_at<'s>(sentence: &'s str, breaks: &[(usize, usize)], at: usize) -> &'s str {
    let start = breaks
        .iter()
        .filter(|(_, end)| *end <= at)
        .map(|(_, end)| *end)
        .max()
        .unwrap_or(0);
    let end = breaks
        .iter()
        .filter(|(begin, _)| *begin >= at)
        .map(|(begin, _)| *begin)
        .min()
        .unwrap_or(sentence.len());
    &sentence[start..end]
}

/// Role named in the clause, if exactly one is. Reader-addressed wording
/// stands for the employee.
fn role_in(clause: &str) -> Option<Role> {
    match (EMPLOYEE_RE.is_match(clause), EMPLOYER_RE.is_match(clause)) {
        (true, false) => Some(Role::Employee),
        (false, true) => Some(Role::Employer),
        (false, false) if READER_SIDE_RE.is_match(clause) && !TOTAL_RE.is_match(clause) => {
            Some(Role::Employee)
        }
        _ => None,
    }
}
