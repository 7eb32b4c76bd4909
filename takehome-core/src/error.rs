//! Error taxonomy for the calculation engine.
//!
//! Two kinds of failure abort a calculation:
//!
//! - [`ConfigurationError`]: the jurisdiction data itself is broken (a bracket
//!   table with a gap, a rate above 100%, ...). Retrying cannot help.
//! - [`ValidationError`]: the caller supplied an impossible input. Every
//!   variant names the offending field.
//!
//! Coverage gaps and simplified rules are not errors; they are reported on
//! the result as [`Annotation`](crate::models::Annotation)s.

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::JurisdictionKey;

/// What is wrong with a bracket table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BracketDefect {
    Empty,
    NotAnchoredAtZero {
        lower_bound: Decimal,
    },
    NonContiguous {
        index: usize,
        expected: Decimal,
        actual: Decimal,
    },
    EmptyRange {
        index: usize,
        lower_bound: Decimal,
        upper_bound: Decimal,
    },
    RateOutOfRange {
        index: usize,
        rate: Decimal,
    },
    UnboundedBeforeLast {
        index: usize,
    },
    BoundedFinalBracket,
}

impl fmt::Display for BracketDefect {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "table has no brackets"),
            Self::NotAnchoredAtZero { lower_bound } => {
                write!(f, "first bracket starts at {lower_bound}, expected 0")
            }
            Self::NonContiguous {
                index,
                expected,
                actual,
            } => write!(
                f,
                "bracket {index} starts at {actual}, expected {expected} (unsorted, gap or overlap)"
            ),
            Self::EmptyRange {
                index,
                lower_bound,
                upper_bound,
            } => write!(
                f,
                "bracket {index} upper bound {upper_bound} is not above lower bound {lower_bound}"
            ),
            Self::RateOutOfRange { index, rate } => {
                write!(f, "bracket {index} rate {rate} is outside [0, 1]")
            }
            Self::UnboundedBeforeLast { index } => {
                write!(f, "bracket {index} is unbounded but is not the last bracket")
            }
            Self::BoundedFinalBracket => write!(f, "last bracket must be unbounded"),
        }
    }
}

/// Broken jurisdiction data. Fatal for the call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("invalid bracket table '{table}': {defect}")]
    InvalidBracketTable { table: String, defect: BracketDefect },

    #[error("invalid contribution rule '{name}': {reason}")]
    InvalidContributionRule { name: String, reason: String },

    #[error("invalid surtax rule '{name}': {reason}")]
    InvalidSurtaxRule { name: String, reason: String },

    #[error("invalid credit rule '{name}': {reason}")]
    InvalidCreditRule { name: String, reason: String },

    #[error("jurisdiction {0} is registered more than once")]
    DuplicateJurisdiction(JurisdictionKey),

    #[error("jurisdiction {0} defines no regimes")]
    NoRegimes(JurisdictionKey),

    #[error("invalid engine configuration: {0}")]
    InvalidEngineConfig(String),
}

impl ConfigurationError {
    pub(crate) fn bracket_table(
        table: &str,
        defect: BracketDefect,
    ) -> Self {
        Self::InvalidBracketTable {
            table: table.to_string(),
            defect,
        }
    }
}

/// Caller input that cannot be calculated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("gross income must not be negative, got {0}")]
    NegativeGrossIncome(Decimal),

    #[error("tax year {year} is outside the supported range {min}..={max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("dependents must not be negative, got {0}")]
    NegativeDependents(i32),

    #[error("regime '{regime}' is not offered by {jurisdiction} (available: {available})")]
    UnknownRegime {
        jurisdiction: JurisdictionKey,
        regime: String,
        available: String,
    },

    #[error("'{0}' is not a jurisdiction key (expected e.g. 'US' or 'US-CA')")]
    InvalidJurisdictionKey(String),
}

impl ValidationError {
    /// Name of the input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NegativeGrossIncome(_) => "gross_income",
            Self::YearOutOfRange { .. } => "year",
            Self::NegativeDependents(_) => "dependents",
            Self::UnknownRegime { .. } => "regime",
            Self::InvalidJurisdictionKey(_) => "jurisdiction",
        }
    }
}

/// Any failure of a calculation call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaxError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("scenario '{name}' failed: {source}")]
    Scenario {
        name: String,
        #[source]
        source: Box<TaxError>,
    },
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn validation_errors_name_their_field() {
        assert_eq!(
            ValidationError::NegativeGrossIncome(dec!(-1)).field(),
            "gross_income"
        );
        assert_eq!(ValidationError::NegativeDependents(-2).field(), "dependents");
        assert_eq!(
            ValidationError::YearOutOfRange {
                year: 1990,
                min: 2020,
                max: 2030
            }
            .field(),
            "year"
        );
    }

    #[test]
    fn bracket_table_error_message_includes_table_and_defect() {
        let err = ConfigurationError::bracket_table(
            "federal",
            BracketDefect::RateOutOfRange {
                index: 2,
                rate: dec!(-0.1),
            },
        );

        assert_eq!(
            err.to_string(),
            "invalid bracket table 'federal': bracket 2 rate -0.1 is outside [0, 1]"
        );
    }

    #[test]
    fn scenario_error_wraps_source() {
        let err = TaxError::Scenario {
            name: "raise".to_string(),
            source: Box::new(ValidationError::NegativeDependents(-1).into()),
        };

        assert_eq!(
            err.to_string(),
            "scenario 'raise' failed: dependents must not be negative, got -1"
        );
    }
}
