use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::is_unit_rate;
use crate::error::ConfigurationError;
use crate::models::{Money, Rate};

/// Engine-wide settings, fixed at construction.
///
/// Every field has a default, so a partial TOML or JSON document
/// deserializes:
///
/// ```
/// use rust_decimal_macros::dec;
/// use takehome_core::EngineConfig;
///
/// let config: EngineConfig = serde_json::from_str(r#"{"generic_rate":"0.25"}"#).unwrap();
/// assert_eq!(config.generic_rate, dec!(0.25));
/// assert_eq!(config.min_year, 2020);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Earliest tax year accepted.
    pub min_year: i32,
    /// Latest tax year accepted.
    pub max_year: i32,
    /// Flat rate of the Generic estimate.
    pub generic_rate: Rate,
    /// Lowest total tax a jurisdiction without negative tax can reach.
    pub tax_floor: Money,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_year: 2020,
            max_year: 2030,
            generic_rate: dec!(0.20),
            tax_floor: Decimal::ZERO,
        }
    }
}

impl EngineConfig {
    /// # Errors
    ///
    /// [`ConfigurationError::InvalidEngineConfig`] for an empty year range, a
    /// Generic rate outside `[0, 1]` or a positive tax floor.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.min_year > self.max_year {
            return Err(ConfigurationError::InvalidEngineConfig(format!(
                "min_year {} is after max_year {}",
                self.min_year, self.max_year
            )));
        }
        if !is_unit_rate(self.generic_rate) {
            return Err(ConfigurationError::InvalidEngineConfig(format!(
                "generic_rate {} is outside [0, 1]",
                self.generic_rate
            )));
        }
        if self.tax_floor > Decimal::ZERO {
            return Err(ConfigurationError::InvalidEngineConfig(format!(
                "tax_floor {} must not be positive",
                self.tax_floor
            )));
        }
        Ok(())
    }

    pub fn supports_year(
        &self,
        year: i32,
    ) -> bool {
        (self.min_year..=self.max_year).contains(&year)
    }
}
