//! Numeric tolerance for cross-checking claimed figures against computed facts.

use akta_config::RulesConfig;
use serde::Serialize;

/// `|claimed - expected| <= max(absolute, relative * |expected|)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tolerance {
    pub absolute: f64,
    pub relative: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            absolute: 0.01,
            relative: 0.005,
        }
    }
}

impl Tolerance {
    #[must_use]
    pub const fn new(absolute: f64, relative: f64) -> Self {
        Self { absolute, relative }
    }

    #[must_use]
    pub const fn from_config(config: &RulesConfig) -> Self {
        Self::new(config.tolerance_absolute, config.tolerance_relative)
    }

    /// Largest difference accepted for `expected`.
    #[must_use]
    pub fn allowed(&self, expected: f64) -> f64 {
        self.absolute.max(self.relative * expected.abs())
    }

    #[must_use]
    pub fn accepts(&self, claimed: f64, expected: f64) -> bool {
        (claimed - expected).abs() <= self.allowed(expected) + 1e-9
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(550.0, 550.0, true)]
    #[case(550.01, 550.0, true)]
    #[case(552.70, 550.0, true)]
    #[case(552.80, 550.0, false)]
    #[case(600.0, 550.0, false)]
    #[case(1.01, 1.0, true)]
    #[case(1.02, 1.0, false)]
    #[case(0.0, 0.0, true)]
    fn absolute_or_relative_whichever_is_larger(
        #[case] claimed: f64,
        #[case] expected: f64,
        #[case] accepted: bool,
    ) {
        assert_eq!(Tolerance::default().accepts(claimed, expected), accepted);
    }

    #[test]
    fn follows_config() {
        let config = RulesConfig {
            tolerance_absolute: 1.0,
            ..RulesConfig::default()
        };
        let tolerance = Tolerance::from_config(&config);
        assert!(tolerance.accepts(10.9, 10.0));
    }
}
