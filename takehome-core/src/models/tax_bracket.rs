use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{BracketDefect, ConfigurationError};
use crate::models::{Money, Rate};

/// One income range taxed at a single marginal rate.
///
/// The range is `[lower_bound, upper_bound)`; `None` means unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower_bound: Money,
    pub upper_bound: Option<Money>,
    pub rate: Rate,
}

impl TaxBracket {
    /// Whether `income` falls inside `[lower_bound, upper_bound)`.
    pub fn contains(
        &self,
        income: Money,
    ) -> bool {
        income >= self.lower_bound && self.upper_bound.is_none_or(|upper| income < upper)
    }
}

#[derive(Deserialize)]
struct RawBracketTable {
    name: String,
    brackets: Vec<TaxBracket>,
}

/// A validated, named progressive bracket table.
///
/// Brackets start at zero, are sorted, contiguous and non-overlapping, carry
/// rates in `[0, 1]`, and the last one is unbounded. A `BracketTable` cannot
/// be built (or deserialized) without passing these checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBracketTable")]
pub struct BracketTable {
    name: String,
    brackets: Vec<TaxBracket>,
}

impl BracketTable {
    /// Validates and wraps an explicit list of brackets.
    pub fn new(
        name: impl Into<String>,
        brackets: Vec<TaxBracket>,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        validate(&name, &brackets)?;
        Ok(Self { name, brackets })
    }

    /// Builds a table from `(lower_bound, rate)` pairs; each bracket ends where
    /// the next begins and the last one is unbounded.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use takehome_core::BracketTable;
    ///
    /// let table = BracketTable::progressive(
    ///     "federal",
    ///     &[(dec!(0), dec!(0.10)), (dec!(10000), dec!(0.20))],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(table.brackets()[0].upper_bound, Some(dec!(10000)));
    /// assert_eq!(table.top_rate(), dec!(0.20));
    /// ```
    pub fn progressive(
        name: impl Into<String>,
        steps: &[(Money, Rate)],
    ) -> Result<Self, ConfigurationError> {
        let brackets = steps
            .iter()
            .enumerate()
            .map(|(i, &(lower_bound, rate))| TaxBracket {
                lower_bound,
                upper_bound: steps.get(i + 1).map(|&(next, _)| next),
                rate,
            })
            .collect();
        Self::new(name, brackets)
    }

    /// A single unbounded bracket at `rate`.
    pub fn flat(
        name: impl Into<String>,
        rate: Rate,
    ) -> Result<Self, ConfigurationError> {
        Self::progressive(name, &[(Decimal::ZERO, rate)])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Rate of the last (unbounded) bracket.
    pub fn top_rate(&self) -> Rate {
        self.brackets
            .last()
            .map(|b| b.rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// The bracket that would tax the next unit of `income`.
    pub fn bracket_for(
        &self,
        income: Money,
    ) -> Option<&TaxBracket> {
        let income = income.max(Decimal::ZERO);
        self.brackets
            .iter()
            .find(|b| b.contains(income))
            .or_else(|| self.brackets.last())
    }

    /// The same table with every bound multiplied by `factor`.
    ///
    /// Used where joint filers get bands exactly twice as wide.
    pub fn scaled(
        &self,
        name: impl Into<String>,
        factor: Decimal,
    ) -> Result<Self, ConfigurationError> {
        let brackets = self
            .brackets
            .iter()
            .map(|b| TaxBracket {
                lower_bound: b.lower_bound * factor,
                upper_bound: b.upper_bound.map(|u| u * factor),
                rate: b.rate,
            })
            .collect();
        Self::new(name, brackets)
    }

    pub fn renamed(
        &self,
        name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            brackets: self.brackets.clone(),
        }
    }
}

impl TryFrom<RawBracketTable> for BracketTable {
    type Error = ConfigurationError;

    fn try_from(raw: RawBracketTable) -> Result<Self, Self::Error> {
        Self::new(raw.name, raw.brackets)
    }
}

fn validate(
    table: &str,
    brackets: &[TaxBracket],
) -> Result<(), ConfigurationError> {
    let defect = |defect| Err(ConfigurationError::bracket_table(table, defect));

    let Some(first) = brackets.first() else {
        return defect(BracketDefect::Empty);
    };
    if first.lower_bound != Decimal::ZERO {
        return defect(BracketDefect::NotAnchoredAtZero {
            lower_bound: first.lower_bound,
        });
    }

    let last_index = brackets.len() - 1;
    let mut expected_lower = Decimal::ZERO;

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.lower_bound != expected_lower {
            return defect(BracketDefect::NonContiguous {
                index,
                expected: expected_lower,
                actual: bracket.lower_bound,
            });
        }
        if bracket.rate < Decimal::ZERO || bracket.rate > Decimal::ONE {
            return defect(BracketDefect::RateOutOfRange {
                index,
                rate: bracket.rate,
            });
        }
        match bracket.upper_bound {
            Some(upper) if upper <= bracket.lower_bound => {
                return defect(BracketDefect::EmptyRange {
                    index,
                    lower_bound: bracket.lower_bound,
                    upper_bound: upper,
                });
            }
            Some(upper) => expected_lower = upper,
            None if index != last_index => {
                return defect(BracketDefect::UnboundedBeforeLast { index });
            }
            None => {}
        }
    }

    if brackets[last_index].upper_bound.is_some() {
        return defect(BracketDefect::BoundedFinalBracket);
    }

    Ok(())
}
