//! Closed enums shared across Akta crates.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose the same label through `as_str()`, `Display`, and `FromStr`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

/// Implements `as_str`, `Display`, and `FromStr` for a fieldless enum from a
/// single variant/label table.
macro_rules! labelled_enum {
    ($ty:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $ty {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Return the label used in serialization and storage.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let needle = s.trim().to_ascii_lowercase().replace('-', "_");
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == needle)
                    .ok_or_else(|| {
                        CoreError::Validation(format!(
                            concat!("unknown ", stringify!($ty), " '{}'"),
                            s
                        ))
                    })
            }
        }
    };
}

// ---------------------------------------------------------------------------
// RuleCategory
// ---------------------------------------------------------------------------

/// Statutory category a rule belongs to. The set is closed: a category that
/// is not listed here cannot be computed, detected, or cross-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    /// Employees Provident Fund (KWSP).
    Epf,
    /// Social Security Organisation (PERKESO).
    Socso,
    /// Employment Insurance System.
    Eis,
    MinimumWage,
    AnnualLeave,
    SickLeave,
    MaternityLeave,
    PublicHolidays,
    NoticePeriod,
    WorkingHours,
}

labelled_enum!(RuleCategory {
    Epf => "epf",
    Socso => "socso",
    Eis => "eis",
    MinimumWage => "minimum_wage",
    AnnualLeave => "annual_leave",
    SickLeave => "sick_leave",
    MaternityLeave => "maternity_leave",
    PublicHolidays => "public_holidays",
    NoticePeriod => "notice_period",
    WorkingHours => "working_hours",
});

impl RuleCategory {
    /// Human-facing name used in rendered answers.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Epf => "EPF",
            Self::Socso => "SOCSO",
            Self::Eis => "EIS",
            Self::MinimumWage => "Minimum wage",
            Self::AnnualLeave => "Annual leave",
            Self::SickLeave => "Sick leave",
            Self::MaternityLeave => "Maternity leave",
            Self::PublicHolidays => "Public holidays",
            Self::NoticePeriod => "Notice period",
            Self::WorkingHours => "Working hours",
        }
    }

    /// Whether the category is a salary-based payroll contribution.
    #[must_use]
    pub const fn is_contribution(self) -> bool {
        matches!(self, Self::Epf | Self::Socso | Self::Eis)
    }

    /// Whether the category grants a period of leave, holidays or notice.
    /// Such facts often come as alternatives stated side by side.
    #[must_use]
    pub const fn is_entitlement(self) -> bool {
        matches!(
            self,
            Self::AnnualLeave
                | Self::SickLeave
                | Self::MaternityLeave
                | Self::PublicHolidays
                | Self::NoticePeriod
        )
    }
}

// ---------------------------------------------------------------------------
// Citizenship
// ---------------------------------------------------------------------------

/// Residency status used by rule applicability predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Citizenship {
    Citizen,
    PermanentResident,
    ForeignWorker,
}

labelled_enum!(Citizenship {
    Citizen => "citizen",
    PermanentResident => "permanent_resident",
    ForeignWorker => "foreign_worker",
});

// ---------------------------------------------------------------------------
// DayKind
// ---------------------------------------------------------------------------

/// Kind of day overtime is worked on; selects the overtime pay multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DayKind {
    #[default]
    Normal,
    RestDay,
    PublicHoliday,
}

labelled_enum!(DayKind {
    Normal => "normal",
    RestDay => "rest_day",
    PublicHoliday => "public_holiday",
});

// ---------------------------------------------------------------------------
// FactUnit
// ---------------------------------------------------------------------------

/// Unit of a computed figure. Claims are only compared against facts of the
/// same unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FactUnit {
    /// Ringgit Malaysia.
    Currency,
    Percent,
    Days,
    Weeks,
    Hours,
    Multiplier,
    /// Boolean encoded as `1.0` / `0.0`.
    Flag,
}

labelled_enum!(FactUnit {
    Currency => "currency",
    Percent => "percent",
    Days => "days",
    Weeks => "weeks",
    Hours => "hours",
    Multiplier => "multiplier",
    Flag => "flag",
});

impl FactUnit {
    /// Render a value in this unit for plain-text answers.
    #[must_use]
    pub fn render(self, value: f64) -> String {
        match self {
            Self::Currency => format!("RM{value:.2}"),
            Self::Percent => format!("{}%", trim_number(value)),
            Self::Days => format!("{} days", trim_number(value)),
            Self::Weeks => format!("{} weeks", trim_number(value)),
            Self::Hours => format!("{} hours", trim_number(value)),
            Self::Multiplier => format!("{}x", trim_number(value)),
            Self::Flag => if value > 0.0 { "yes" } else { "no" }.to_string(),
        }
    }
}

fn trim_number(value: f64) -> String {
    let s = format!("{value:.2}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

// ---------------------------------------------------------------------------
// ValidationStatus
// ---------------------------------------------------------------------------

/// Outcome of cross-checking a generated answer against computed facts.
///
/// ```text
/// validated          every overlapping claim matched within tolerance
/// unverified         no claim overlapped a computed fact
/// rejected           at least one claim mismatched
/// generation_failed  retry budget exhausted, rules-only content returned
/// failed             integrity error or deadline, `error` is set
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Validated,
    Unverified,
    Rejected,
    GenerationFailed,
    Failed,
}

labelled_enum!(ValidationStatus {
    Validated => "validated",
    Unverified => "unverified",
    Rejected => "rejected",
    GenerationFailed => "generation_failed",
    Failed => "failed",
});

// ---------------------------------------------------------------------------
// MismatchPolicy
// ---------------------------------------------------------------------------

/// What the composer does with a generated answer that failed the cross-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Replace the generated prose with the rules-only rendering.
    #[default]
    Substitute,
    /// Keep the prose and append a correction block.
    Annotate,
}

labelled_enum!(MismatchPolicy {
    Substitute => "substitute",
    Annotate => "annotate",
});

// ---------------------------------------------------------------------------
// RefreshStatus
// ---------------------------------------------------------------------------

/// Per-source result of a refresh pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RefreshStatus {
    Created,
    Updated,
    Unchanged,
    Failed,
}

labelled_enum!(RefreshStatus {
    Created => "created",
    Updated => "updated",
    Unchanged => "unchanged",
    Failed => "failed",
});

// ---------------------------------------------------------------------------
// ErrorKind
// ---------------------------------------------------------------------------

/// Serializable error taxonomy surfaced at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    NoApplicableRule,
    AmbiguousRule,
    MissingInput,
    ServiceUnavailable,
    Timeout,
    ValidationRejected,
    DeadlineExceeded,
    InvalidData,
}

labelled_enum!(ErrorKind {
    NotFound => "not_found",
    NoApplicableRule => "no_applicable_rule",
    AmbiguousRule => "ambiguous_rule",
    MissingInput => "missing_input",
    ServiceUnavailable => "service_unavailable",
    Timeout => "timeout",
    ValidationRejected => "validation_rejected",
    DeadlineExceeded => "deadline_exceeded",
    InvalidData => "invalid_data",
});

impl ErrorKind {
    /// Transient external-dependency failures that callers may retry or degrade around.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self, Self::ServiceUnavailable | Self::Timeout)
    }
}
