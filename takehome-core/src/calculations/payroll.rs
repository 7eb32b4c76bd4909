//! Payroll contribution calculations.
//!
//! Social insurance contributions are flat-rate charges on gross pay, with
//! optional limits. One rule shape covers every scheme the engine knows:
//!
//! | Field                  | Effect |
//! |------------------------|--------|
//! | `rate`                 | Rate on earnings between `exemption` and `wage_base` |
//! | `wage_base`            | Earnings above this are not charged at `rate` (cap) |
//! | `exemption`            | Earnings below this are not charged at `rate` (floor) |
//! | `additional_rate`      | Extra rate on earnings above `additional_threshold` |
//! | `additional_threshold` | Start of the additional-rate band |
//!
//! So `base = max(0, min(gross, wage_base) - exemption) × rate` and
//! `additional = max(0, gross - additional_threshold) × additional_rate`.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use takehome_core::calculations::{ContributionRule, PayrollContributionCalculator};
//!
//! let rules = vec![
//!     ContributionRule::flat("Social Security", dec!(0.062)).capped_at(dec!(176100)),
//!     ContributionRule::flat("Medicare", dec!(0.0145)).with_additional(dec!(0.009), dec!(200000)),
//! ];
//!
//! let contributions = PayrollContributionCalculator::calculate(dec!(250000), &rules).unwrap();
//!
//! assert_eq!(contributions[0].amount, dec!(10918.20));
//! assert_eq!(contributions[1].amount, dec!(4075.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{is_unit_rate, non_negative, round_half_up};
use crate::error::ConfigurationError;
use crate::models::{Money, NamedAmount, Rate};

/// A flat-rate social contribution with optional cap, floor and surcharge band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRule {
    pub name: String,
    pub rate: Rate,
    #[serde(default)]
    pub wage_base: Option<Money>,
    #[serde(default)]
    pub exemption: Option<Money>,
    #[serde(default)]
    pub additional_rate: Option<Rate>,
    #[serde(default)]
    pub additional_threshold: Option<Money>,
    /// Whether the contribution reduces taxable income.
    #[serde(default)]
    pub deductible: bool,
}

impl ContributionRule {
    /// An uncapped contribution at `rate` on all gross pay.
    pub fn flat(
        name: impl Into<String>,
        rate: Rate,
    ) -> Self {
        Self {
            name: name.into(),
            rate,
            wage_base: None,
            exemption: None,
            additional_rate: None,
            additional_threshold: None,
            deductible: false,
        }
    }

    pub fn capped_at(
        mut self,
        wage_base: Money,
    ) -> Self {
        self.wage_base = Some(wage_base);
        self
    }

    pub fn exempting(
        mut self,
        exemption: Money,
    ) -> Self {
        self.exemption = Some(exemption);
        self
    }

    pub fn with_additional(
        mut self,
        rate: Rate,
        threshold: Money,
    ) -> Self {
        self.additional_rate = Some(rate);
        self.additional_threshold = Some(threshold);
        self
    }

    pub fn deductible(mut self) -> Self {
        self.deductible = true;
        self
    }

    /// Checks rates are fractions and limits are consistent.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let invalid = |reason: &str| {
            Err(ConfigurationError::InvalidContributionRule {
                name: self.name.clone(),
                reason: reason.to_string(),
            })
        };

        if !is_unit_rate(self.rate) {
            return invalid("rate must be between 0 and 1");
        }
        if self.wage_base.is_some_and(|base| base < Decimal::ZERO) {
            return invalid("wage base must not be negative");
        }
        if self.exemption.is_some_and(|floor| floor < Decimal::ZERO) {
            return invalid("exemption must not be negative");
        }
        if let (Some(base), Some(floor)) = (self.wage_base, self.exemption) {
            if floor > base {
                return invalid("exemption must not exceed the wage base");
            }
        }
        match (self.additional_rate, self.additional_threshold) {
            (Some(rate), Some(threshold)) => {
                if !is_unit_rate(rate) {
                    return invalid("additional rate must be between 0 and 1");
                }
                if threshold < Decimal::ZERO {
                    return invalid("additional threshold must not be negative");
                }
            }
            (Some(_), None) => return invalid("additional rate requires a threshold"),
            (None, Some(_)) => return invalid("additional threshold requires a rate"),
            (None, None) => {}
        }
        Ok(())
    }

    /// Contribution owed on `gross_income`, unrounded.
    fn amount(
        &self,
        gross_income: Money,
    ) -> Money {
        let gross = non_negative(gross_income);
        let capped = self.wage_base.map_or(gross, |base| gross.min(base));
        let charged = non_negative(capped - self.exemption.unwrap_or(Decimal::ZERO));
        let base = charged * self.rate;

        let additional = match (self.additional_rate, self.additional_threshold) {
            (Some(rate), Some(threshold)) => non_negative(gross - threshold) * rate,
            _ => Decimal::ZERO,
        };

        base + additional
    }
}

/// One computed contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contribution {
    pub name: String,
    pub amount: Money,
    pub deductible: bool,
}

impl From<&Contribution> for NamedAmount {
    fn from(contribution: &Contribution) -> Self {
        NamedAmount::new(contribution.name.clone(), contribution.amount)
    }
}

/// Stateless payroll contribution calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayrollContributionCalculator;

impl PayrollContributionCalculator {
    /// Computes every rule against `gross_income`, in rule order.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidContributionRule`] if any rule is
    /// malformed; no partial list is returned.
    pub fn calculate(
        gross_income: Money,
        rules: &[ContributionRule],
    ) -> Result<Vec<Contribution>, ConfigurationError> {
        rules.iter().try_for_each(ContributionRule::validate)?;

        Ok(rules
            .iter()
            .map(|rule| Contribution {
                name: rule.name.clone(),
                amount: round_half_up(rule.amount(gross_income)),
                deductible: rule.deductible,
            })
            .collect())
    }

    /// Sum of the contributions flagged as reducing taxable income.
    pub fn deductible_total(contributions: &[Contribution]) -> Money {
        contributions
            .iter()
            .filter(|c| c.deductible)
            .map(|c| c.amount)
            .sum()
    }
}
