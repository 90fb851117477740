//! Plain-text rendering of computed facts, rules-only answers and corrections.

use std::fmt::Write as _;

use akta_core::{ClaimMismatch, ComputedFact, RetrievalResult};

/// `EPF (rule epf-citizen-below-60): employee RM550.00, employer RM600.00, ...`
#[must_use]
pub fn fact_line(fact: &ComputedFact) -> String {
    let figures: Vec<String> = fact
        .values
        .iter()
        .map(|v| format!("{} {}", v.name.replace('_', " "), v.unit.render(v.value)))
        .collect();
    format!(
        "{} (rule {}): {}",
        fact.category.title(),
        fact.rule_id,
        figures.join(", ")
    )
}

/// Answer built from computed facts and passage citations alone, used when
/// generated prose is rejected or unavailable.
#[must_use]
pub fn rules_only(facts: &[ComputedFact], passages: &[RetrievalResult], notes: &[String]) -> String {
    let mut out = String::new();
    if facts.is_empty() {
        out.push_str("No statutory figures apply to this question.\n");
    } else {
        out.push_str("Statutory figures:\n");
        for fact in facts {
            let _ = writeln!(out, "- {}", fact_line(fact));
        }
    }

    let mut seen = Vec::new();
    for passage in passages {
        let label = passage.section_label();
        if !label.is_empty() && !seen.contains(&label) {
            seen.push(label);
        }
    }
    if !seen.is_empty() {
        out.push_str("\nSee:\n");
        for label in &seen {
            let _ = writeln!(out, "- {label}");
        }
    }

    if !notes.is_empty() {
        out.push_str("\nNotes:\n");
        for note in notes {
            let _ = writeln!(out, "- {note}");
        }
    }
    out.trim_end().to_string()
}

/// Block appended to generated text under the annotate policy.
#[must_use]
pub fn correction(mismatches: &[ClaimMismatch]) -> String {
    let mut out = String::from("Correction: some figures above differ from the statutory rules.");
    for m in mismatches {
        let _ = write!(
            out,
            "\n- {} {}: stated {}, correct figure {} (rule {})",
            m.category.title(),
            m.fact.replace('_', " "),
            m.unit.render(m.claimed),
            m.unit.render(m.expected),
            m.rule_id
        );
    }
    out
}
