// Engine configuration

use serde::{Deserialize, Serialize};

use crate::calculator::arithmetic::DEFAULT_FRACTION_DIGITS;
use crate::calculator::format::MAX_SIGNIFICANT_DIGITS;

/// Presentation and precision settings for the calculator engine.
///
/// Missing fields fall back to their defaults when deserialized, so a host
/// can keep just the values it cares about in its own settings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Significant digits shown in the result text
    pub max_display_digits: u32,
    /// Decimal places kept from power and root results
    pub max_fraction_digits: u32,
    /// Exponent applied by the power key
    pub power_exponent: u32,
    /// Degree of the root key
    pub root_degree: u32,
}

impl EngineConfig {
    pub fn with_max_display_digits(mut self, digits: u32) -> Self {
        self.max_display_digits = digits;
        self.sanitized()
    }

    pub fn with_max_fraction_digits(mut self, digits: u32) -> Self {
        self.max_fraction_digits = digits;
        self.sanitized()
    }

    pub fn with_power_exponent(mut self, exponent: u32) -> Self {
        self.power_exponent = exponent;
        self.sanitized()
    }

    pub fn with_root_degree(mut self, degree: u32) -> Self {
        self.root_degree = degree;
        self.sanitized()
    }

    /// Clamp every setting into the range the decimal type supports
    pub fn sanitized(self) -> Self {
        Self {
            max_display_digits: self.max_display_digits.clamp(1, MAX_SIGNIFICANT_DIGITS),
            max_fraction_digits: self.max_fraction_digits.min(MAX_SIGNIFICANT_DIGITS),
            power_exponent: self.power_exponent,
            root_degree: self.root_degree.max(1),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_display_digits: 12,
            max_fraction_digits: DEFAULT_FRACTION_DIGITS,
            power_exponent: 2,
            root_degree: 2,
        }
    }
}
