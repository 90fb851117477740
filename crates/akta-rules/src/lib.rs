//! # akta-rules
//!
//! Deterministic statutory rules engine for Akta.
//!
//! Rules are data: a TOML table of [`StatutoryRule`]s, each with a category,
//! a half-open effective date range, an applicability predicate and one
//! [`Formula`]. [`RulesEngine::compute`] selects the unique rule in force for
//! a category, date and set of inputs, and evaluates it. Evaluation is pure;
//! identical inputs always produce identical facts.
//!
//! The built-in table ([`DEFAULT_RULES`]) is a starting point. Operators are
//! expected to replace it with the current official schedules.
//!
//! [`LivingCosts`] budgets an income against per-city living-cost ranges.

pub mod applicability;
pub mod budget;
pub mod engine;
pub mod error;
pub mod formula;
pub mod intent;
pub mod table;
pub mod tolerance;

pub use akta_core::{Citizenship, ComputedFact, DayKind, NumericInputs, RuleCategory};
pub use applicability::{Applicability, Bounds, EffectiveRange};
pub use budget::{BudgetHealth, ExpenseBudget, LivingCosts};
pub use engine::{RulesEngine, SalaryBreakdown};
pub use error::RulesError;
pub use formula::{Formula, round_cents};
pub use intent::detect_categories;
pub use table::{DEFAULT_RULES, IntegrityViolation, RuleSet, StatutoryRule};
pub use tolerance::Tolerance;
