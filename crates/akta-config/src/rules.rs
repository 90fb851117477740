//! Rules engine configuration.

use serde::{Deserialize, Serialize};

const fn default_tolerance_absolute() -> f64 {
    0.01
}

const fn default_tolerance_relative() -> f64 {
    0.005
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RulesConfig {
    /// Path to a rules table TOML file. Empty uses the built-in table.
    #[serde(default)]
    pub table_path: String,

    /// Path to a living-cost table TOML file. Empty uses the built-in table.
    #[serde(default)]
    pub living_costs_path: String,

    /// Absolute tolerance in currency units for the numeric cross-check.
    #[serde(default = "default_tolerance_absolute")]
    pub tolerance_absolute: f64,

    /// Relative tolerance (fraction of the expected value).
    #[serde(default = "default_tolerance_relative")]
    pub tolerance_relative: f64,
}

impl RulesConfig {
    /// Returns `true` if an external table file is set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.table_path.trim().is_empty()
    }

    /// Returns `true` if an external living-cost table is set.
    #[must_use]
    pub fn has_living_costs(&self) -> bool {
        !self.living_costs_path.trim().is_empty()
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            table_path: String::new(),
            living_costs_path: String::new(),
            tolerance_absolute: default_tolerance_absolute(),
            tolerance_relative: default_tolerance_relative(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = RulesConfig::default();
        assert!(!config.is_configured());
        assert!(!config.has_living_costs());
        assert!((config.tolerance_absolute - 0.01).abs() < f64::EPSILON);
        assert!((config.tolerance_relative - 0.005).abs() < f64::EPSILON);
    }
}
