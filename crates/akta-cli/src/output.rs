use std::fmt::Write as _;

use akta_compose::render::fact_line;
use akta_core::{ComplianceAnswer, ComputedFact, RefreshReport, SourceOutcome};
use akta_rules::{ExpenseBudget, SalaryBreakdown};
use serde::Serialize;

use crate::cli::OutputFormat;

/// Human-readable rendering for `--format text`.
pub trait TextRender {
    fn to_text(&self) -> String;
}

/// Render a response to a string in the requested format.
pub fn render<T: Serialize + TextRender>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Text => Ok(value.to_text()),
    }
}

/// Print a response in the requested format.
pub fn output<T: Serialize + TextRender>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

/// Outcome of `akta rules check`.
#[derive(Debug, Serialize)]
pub struct RulesCheck {
    pub table: String,
    pub rules: usize,
    pub violations: Vec<String>,
}

impl TextRender for ComplianceAnswer {
    fn to_text(&self) -> String {
        let mut out = String::new();
        if !self.generated_text.is_empty() {
            out.push_str(&self.generated_text);
            out.push_str("\n\n");
        }
        let _ = writeln!(out, "[{} as of {}]", self.validation_status, self.as_of);
        if let Some(error) = &self.error {
            let _ = writeln!(out, "error ({}): {}", error.kind, error.message);
        }
        if !self.generated_text.contains("Statutory figures:") {
            for fact in &self.computed_facts {
                let _ = writeln!(out, "- {}", fact_line(fact));
            }
        }
        for note in &self.notes {
            let _ = writeln!(out, "note: {note}");
        }
        out.trim_end().to_string()
    }
}

impl TextRender for SourceOutcome {
    fn to_text(&self) -> String {
        let mut line = format!("{:<9} {}", self.status.as_str(), self.source_url);
        if let Some(chunks) = self.chunk_count {
            let _ = write!(line, " ({chunks} chunks)");
        }
        if let Some(error) = &self.error {
            let _ = write!(line, ": {} ({})", error.message, error.kind);
        }
        line
    }
}

impl TextRender for RefreshReport {
    fn to_text(&self) -> String {
        if self.outcomes.is_empty() {
            return "no sources tracked".to_string();
        }
        let elapsed = self.finished_at - self.started_at;
        let mut lines: Vec<String> = self.outcomes.iter().map(TextRender::to_text).collect();
        lines.push(format!(
            "{} sources in {} ms",
            self.outcomes.len(),
            elapsed.num_milliseconds()
        ));
        lines.join("\n")
    }
}

impl TextRender for ComputedFact {
    fn to_text(&self) -> String {
        fact_line(self)
    }
}

impl TextRender for SalaryBreakdown {
    fn to_text(&self) -> String {
        let mut out = format!("Salary RM{:.2} as of {}\n", self.salary, self.as_of);
        for fact in &self.contributions {
            let _ = writeln!(out, "- {}", fact_line(fact));
        }
        let _ = writeln!(out, "Employee deductions: RM{:.2}", self.employee_deductions);
        let _ = writeln!(out, "Net pay: RM{:.2}", self.net_pay);
        let _ = writeln!(out, "Employer contributions: RM{:.2}", self.employer_contributions);
        let _ = writeln!(out, "Employer cost: RM{:.2}", self.employer_cost);
        match (self.minimum_wage, self.meets_minimum_wage) {
            (Some(minimum), Some(true)) => {
                let _ = writeln!(out, "Meets the minimum wage of RM{minimum:.2}");
            }
            (Some(minimum), _) => {
                let _ = writeln!(out, "Below the minimum wage of RM{minimum:.2}");
            }
            (None, _) => {}
        }
        for note in &self.notes {
            let _ = writeln!(out, "note: {note}");
        }
        out.trim_end().to_string()
    }
}

impl TextRender for ExpenseBudget {
    fn to_text(&self) -> String {
        let mut out = format!("{} on RM{:.2} a month\n", self.city_name, self.income);
        if self.fallback {
            out.push_str("(city not listed, using these figures)\n");
        }
        for line in &self.items {
            let _ = writeln!(
                out,
                "- {:<14} RM{:.2} (RM{:.2} to RM{:.2})",
                line.item, line.average, line.min, line.max
            );
        }
        let _ = writeln!(
            out,
            "Expenses: RM{:.2} (RM{:.2} to RM{:.2})",
            self.total_average, self.total_min, self.total_max
        );
        let _ = write!(
            out,
            "Savings: RM{:.2} ({:.1}%), {}",
            self.savings, self.savings_rate, self.health
        );
        out
    }
}

impl TextRender for RulesCheck {
    fn to_text(&self) -> String {
        if self.violations.is_empty() {
            return format!("{}: {} rules, no overlaps", self.table, self.rules);
        }
        let mut out = format!(
            "{}: {} rules, {} overlaps",
            self.table,
            self.rules,
            self.violations.len()
        );
        for violation in &self.violations {
            let _ = write!(out, "\n- {violation}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use akta_core::{AnswerError, ErrorKind, NumericInputs, RefreshStatus};
    use chrono::{NaiveDate, TimeZone, Utc};
    use pretty_assertions::assert_eq;

    #[test]
    fn refresh_report_text_lists_outcomes() {
        let started_at = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let report = RefreshReport {
            started_at,
            finished_at: started_at + chrono::Duration::milliseconds(1500),
            outcomes: vec![
                SourceOutcome {
                    source_url: "https://example.org/ea".into(),
                    status: RefreshStatus::Updated,
                    document_id: Some("doc-1".into()),
                    chunk_count: Some(12),
                    error: None,
                },
                SourceOutcome::failed(
                    "https://example.org/epf",
                    AnswerError::new(ErrorKind::Timeout, "timed out"),
                ),
            ],
        };
        assert_eq!(
            report.to_text(),
            "updated   https://example.org/ea (12 chunks)\n\
             failed    https://example.org/epf: timed out (timeout)\n\
             2 sources in 1500 ms"
        );
    }

    #[test]
    fn failed_answer_text_carries_the_error() {
        let answer = ComplianceAnswer::failed(
            "How much EIS?",
            NaiveDate::from_ymd_opt(2026, 3, 15).unwrap(),
            NumericInputs::default(),
            AnswerError::new(ErrorKind::AmbiguousRule, "two eis rules apply"),
        );
        let text = answer.to_text();
        assert!(text.starts_with("[failed as of 2026-03-15]"));
        assert!(text.contains("error (ambiguous_rule): two eis rules apply"));
    }

    #[test]
    fn budget_text_lists_items_and_savings() {
        let costs = akta_rules::LivingCosts::builtin().unwrap();
        let text = costs.budget("penang", 3500.0).unwrap().to_text();
        assert!(text.starts_with("Penang on RM3500.00 a month\n"));
        assert!(text.contains("- rent_1br       RM1300.00 (RM800.00 to RM1800.00)"));
        assert!(text.contains("Expenses: RM2950.00 (RM1800.00 to RM4100.00)"));
        assert!(text.ends_with("Savings: RM550.00 (15.7%), consider budgeting"));
    }

    #[test]
    fn json_format_is_pretty_json() {
        let check = RulesCheck {
            table: "built-in".into(),
            rules: 3,
            violations: Vec::new(),
        };
        let json = render(&check, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rules"], 3);
        assert_eq!(render(&check, OutputFormat::Text).unwrap(), "built-in: 3 rules, no overlaps");
    }
}
