//! Monthly living-expense budget against an income.
//!
//! A living-cost table lists, per city, the monthly range of each expense
//! item. A budget takes the midpoint of every range, sums them, and reports
//! what is left of the income.
//!
//! ```toml
//! default_city = "kuala_lumpur"
//!
//! [[city]]
//! id = "penang"
//! name = "Penang"
//! items = [{ item = "rent_1br", min = 800, max = 1800 }]
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use akta_config::RulesConfig;
use serde::{Deserialize, Serialize};

use crate::error::RulesError;
use crate::formula::round_cents;
use crate::table::read;

/// The built-in living-cost table.
pub const DEFAULT_LIVING_COSTS: &str = include_str!("../rules/living_costs.toml");

/// Savings rate at or above which a budget is healthy, in percent.
const GOOD_SAVINGS_RATE: f64 = 20.0;
/// Savings rate below which a budget is tight, in percent.
const TIGHT_SAVINGS_RATE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CostRange {
    pub item: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CityCosts {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    pub items: Vec<CostRange>,
}

impl CityCosts {
    fn answers_to(&self, key: &str) -> bool {
        self.id == key || city_key(&self.name) == key || self.aliases.iter().any(|a| a == key)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CostFile {
    default_city: String,
    #[serde(default, rename = "city")]
    cities: Vec<CityCosts>,
}

/// Validated living-cost table.
#[derive(Debug, Clone, PartialEq)]
pub struct LivingCosts {
    cities: Vec<CityCosts>,
    default_city: usize,
}

/// How much room a budget leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetHealth {
    /// At least a fifth of the income is left.
    Good,
    /// Something is left, but under a fifth.
    ConsiderBudgeting,
    Tight,
}

impl BudgetHealth {
    fn from_savings_rate(rate: f64) -> Self {
        if rate >= GOOD_SAVINGS_RATE {
            Self::Good
        } else if rate >= TIGHT_SAVINGS_RATE {
            Self::ConsiderBudgeting
        } else {
            Self::Tight
        }
    }
}

impl fmt::Display for BudgetHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Good => "good",
            Self::ConsiderBudgeting => "consider budgeting",
            Self::Tight => "tight",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetLine {
    pub item: String,
    pub min: f64,
    pub max: f64,
    pub average: f64,
}

/// Result of [`LivingCosts::budget`]. Amounts are RM per month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseBudget {
    /// City the figures come from.
    pub city: String,
    pub city_name: String,
    /// The requested city is not in the table and the default city was used.
    pub fallback: bool,
    pub income: f64,
    pub items: Vec<BudgetLine>,
    pub total_min: f64,
    pub total_max: f64,
    pub total_average: f64,
    /// Income left after average expenses; negative when they exceed it.
    pub savings: f64,
    /// `savings` as a percentage of income.
    pub savings_rate: f64,
    pub health: BudgetHealth,
}

impl LivingCosts {
    /// The built-in table.
    ///
    /// # Errors
    ///
    /// Fails only if the shipped table is itself invalid.
    pub fn builtin() -> Result<Self, RulesError> {
        Self::from_toml_str(DEFAULT_LIVING_COSTS)
    }

    /// Table from the configured file, or the built-in table.
    ///
    /// # Errors
    ///
    /// Returns the file's read, parse or validation error.
    pub fn from_config(config: &RulesConfig) -> Result<Self, RulesError> {
        if config.has_living_costs() {
            Self::load(Path::new(config.living_costs_path.trim()))
        } else {
            Self::builtin()
        }
    }

    /// Read and validate a living-cost table file.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load(path: &Path) -> Result<Self, RulesError> {
        Self::from_toml_str(&read(path)?)
    }

    /// Parse and validate a living-cost table.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::Table`] for malformed TOML and
    /// [`RulesError::InvalidCostTable`] for duplicate cities, inverted or
    /// negative ranges, or an unknown default city.
    pub fn from_toml_str(raw: &str) -> Result<Self, RulesError> {
        let file: CostFile = toml::from_str(raw)?;
        let invalid = RulesError::InvalidCostTable;

        let mut seen = HashSet::new();
        for city in &file.cities {
            if !seen.insert(city.id.as_str()) {
                return Err(invalid(format!("duplicate city {}", city.id)));
            }
            if city.items.is_empty() {
                return Err(invalid(format!("city {} has no items", city.id)));
            }
            if let Some(range) = city
                .items
                .iter()
                .find(|r| r.min < 0.0 || r.max < r.min || !r.max.is_finite())
            {
                return Err(invalid(format!(
                    "{} {} range {} .. {} is not a cost range",
                    city.id, range.item, range.min, range.max
                )));
            }
        }
        let key = city_key(&file.default_city);
        let default_city = file
            .cities
            .iter()
            .position(|c| c.answers_to(&key))
            .ok_or_else(|| invalid(format!("default city {} is not listed", file.default_city)))?;
        Ok(Self {
            cities: file.cities,
            default_city,
        })
    }

    #[must_use]
    pub fn cities(&self) -> &[CityCosts] {
        &self.cities
    }

    /// The city listed under `name` (id, display name or alias, any case).
    #[must_use]
    pub fn city(&self, name: &str) -> Option<&CityCosts> {
        let key = city_key(name);
        self.cities.iter().find(|c| c.answers_to(&key))
    }

    /// Budget `income` against the average costs of `city`.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::InvalidInput`] unless `income` is positive.
    pub fn budget(&self, city: &str, income: f64) -> Result<ExpenseBudget, RulesError> {
        if income <= 0.0 || !income.is_finite() {
            return Err(RulesError::InvalidInput {
                field: "salary",
                reason: format!("{income} is not a monthly income"),
            });
        }
        let (costs, fallback) = match self.city(city) {
            Some(costs) => (costs, false),
            None => {
                let costs = &self.cities[self.default_city];
                tracing::debug!(requested = city, used = %costs.id, "rules: unknown city, using default");
                (costs, true)
            }
        };

        let items: Vec<BudgetLine> = costs
            .items
            .iter()
            .map(|r| BudgetLine {
                item: r.item.clone(),
                min: r.min,
                max: r.max,
                average: round_cents(f64::midpoint(r.min, r.max)),
            })
            .collect();
        let total_min = round_cents(items.iter().map(|l| l.min).sum());
        let total_max = round_cents(items.iter().map(|l| l.max).sum());
        let total_average = round_cents(items.iter().map(|l| l.average).sum());
        let savings = round_cents(income - total_average);
        let savings_rate = round_cents(savings / income * 100.0);

        Ok(ExpenseBudget {
            city: costs.id.clone(),
            city_name: costs.name.clone(),
            fallback,
            income,
            items,
            total_min,
            total_max,
            total_average,
            savings,
            savings_rate,
            health: BudgetHealth::from_savings_rate(savings_rate),
        })
    }
}

/// `Kuala Lumpur`, `kuala-lumpur` and ` KUALA_LUMPUR ` all become `kuala_lumpur`.
fn city_key(name: &str) -> String {
    name.split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
