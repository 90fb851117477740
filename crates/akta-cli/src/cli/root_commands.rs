use std::path::PathBuf;

use akta_core::{Citizenship, DayKind, NumericInputs, RuleCategory};
use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Answer an employment-law question from the corpus and the rules.
    Ask(AskArgs),
    /// Refresh tracked sources now.
    Refresh(RefreshArgs),
    /// Run the refresh scheduler until interrupted.
    Watch(WatchArgs),
    /// Put a local statute file into the corpus and index it.
    Ingest(IngestArgs),
    /// Statutory rules.
    Rules {
        #[command(subcommand)]
        action: RulesCommands,
    },
    /// Monthly EPF, SOCSO and EIS breakdown for one salary.
    Breakdown(BreakdownArgs),
    /// Monthly living-expense budget for one salary in one city.
    Budget(BudgetArgs),
    /// Print JSON Schemas of the answer and refresh report shapes.
    Schema(SchemaArgs),
}

/// Rules subcommands.
#[derive(Clone, Debug, Subcommand)]
pub enum RulesCommands {
    /// Evaluate one rule category.
    Compute(ComputeArgs),
    /// Check the rule table for overlapping rules.
    Check,
}

/// Numeric inputs shared by `ask` and `rules compute`.
#[derive(Clone, Debug, Default, Args)]
pub struct InputArgs {
    /// Monthly wages in RM.
    #[arg(long)]
    pub salary: Option<f64>,

    #[arg(long)]
    pub age: Option<u32>,

    /// citizen, permanent_resident or foreign_worker.
    #[arg(long)]
    pub citizenship: Option<Citizenship>,

    /// Completed years of service.
    #[arg(long = "years")]
    pub years_of_service: Option<f64>,

    /// Hours worked per week.
    #[arg(long = "hours")]
    pub hours_per_week: Option<f64>,

    /// normal, rest_day or public_holiday.
    #[arg(long = "day")]
    pub day_kind: Option<DayKind>,
}

impl InputArgs {
    #[must_use]
    pub const fn to_inputs(&self) -> NumericInputs {
        NumericInputs {
            salary: self.salary,
            age: self.age,
            citizenship: self.citizenship,
            years_of_service: self.years_of_service,
            hours_per_week: self.hours_per_week,
            day_kind: self.day_kind,
        }
    }
}

/// Arguments for `akta ask`.
#[derive(Clone, Debug, Args)]
pub struct AskArgs {
    /// The question.
    pub query: String,

    /// Date the answer applies to (defaults to today).
    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    #[command(flatten)]
    pub inputs: InputArgs,
}

/// Arguments for `akta refresh`.
#[derive(Clone, Debug, Args)]
pub struct RefreshArgs {
    /// Refresh only this tracked source URL.
    #[arg(long)]
    pub source: Option<String>,
}

/// Arguments for `akta watch`.
#[derive(Clone, Debug, Args)]
pub struct WatchArgs {
    /// Override `refresh.interval_secs`.
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

/// Arguments for `akta ingest`.
#[derive(Clone, Debug, Args)]
pub struct IngestArgs {
    /// Statute file (HTML or plain text).
    pub file: PathBuf,

    /// Source URL to file the document under (defaults to its `file://` URL).
    #[arg(long)]
    pub url: Option<String>,

    #[arg(long)]
    pub title: Option<String>,
}

/// Arguments for `akta rules compute`.
#[derive(Clone, Debug, Args)]
pub struct ComputeArgs {
    /// epf, socso, eis, minimum_wage, annual_leave, sick_leave,
    /// maternity_leave, public_holidays, notice_period or working_hours.
    pub category: RuleCategory,

    #[arg(long)]
    pub as_of: Option<NaiveDate>,

    #[command(flatten)]
    pub inputs: InputArgs,
}

/// Arguments for `akta breakdown`.
#[derive(Clone, Debug, Args)]
pub struct BreakdownArgs {
    /// Monthly wages in RM.
    #[arg(long)]
    pub salary: f64,

    #[arg(long)]
    pub age: Option<u32>,

    #[arg(long)]
    pub citizenship: Option<Citizenship>,

    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// Arguments for `akta budget`.
#[derive(Clone, Debug, Args)]
pub struct BudgetArgs {
    /// kuala_lumpur, penang, johor_bahru or another listed city.
    #[arg(long, default_value = "kuala_lumpur")]
    pub city: String,

    /// Monthly wages in RM.
    #[arg(long)]
    pub salary: f64,

    /// Budget the gross salary instead of pay after EPF, SOCSO and EIS.
    #[arg(long)]
    pub gross: bool,

    #[arg(long)]
    pub age: Option<u32>,

    #[arg(long)]
    pub citizenship: Option<Citizenship>,

    #[arg(long)]
    pub as_of: Option<NaiveDate>,
}

/// Which schema `akta schema` prints.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum SchemaKind {
    Answer,
    Report,
    All,
}

/// Arguments for `akta schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    #[arg(value_enum, default_value = "all")]
    pub kind: SchemaKind,
}
