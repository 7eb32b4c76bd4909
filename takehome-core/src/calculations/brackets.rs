//! Progressive bracket walking.
//!
//! The only place in the engine that turns a taxable income and a bracket
//! table into tax. Every jurisdiction, including tables loaded from data,
//! goes through [`BracketCalculator`].
//!
//! # Algorithm
//!
//! For each bracket `[lower, upper)` in ascending order, the income taxed in
//! the bracket is `min(income, upper) - lower`, clamped at zero, and the
//! bracket contributes `amount × rate`. Only brackets with `lower < income`
//! produce a line item, so an income sitting exactly on a boundary is fully
//! taxed in the lower bracket.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use takehome_core::BracketTable;
//! use takehome_core::calculations::BracketCalculator;
//!
//! let table = BracketTable::progressive(
//!     "income",
//!     &[(dec!(0), dec!(0.10)), (dec!(10000), dec!(0.20))],
//! )
//! .unwrap();
//!
//! let result = BracketCalculator::calculate(dec!(50000), &table);
//!
//! assert_eq!(result.tax, dec!(9000.00));
//! assert_eq!(result.line_items.len(), 2);
//! assert_eq!(result.marginal_rate, dec!(0.20));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{non_negative, round_half_up};
use crate::error::ConfigurationError;
use crate::models::{BracketLineItem, BracketTable, Money, Rate, TaxBracket};

/// Tax owed under one bracket table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketCalculation {
    pub table: String,
    pub taxable_income: Money,
    pub line_items: Vec<BracketLineItem>,
    /// Sum of the (rounded) line-item taxes.
    pub tax: Money,
    /// Rate applied to the next unit of income.
    pub marginal_rate: Rate,
}

/// Stateless progressive-bracket calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct BracketCalculator;

impl BracketCalculator {
    /// Applies `table` to `taxable_income`.
    ///
    /// Negative income is treated as zero.
    pub fn calculate(
        taxable_income: Money,
        table: &BracketTable,
    ) -> BracketCalculation {
        Self::calculate_with_parts(taxable_income, table, Decimal::ONE)
    }

    /// Validates a raw bracket list, then applies it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidBracketTable`] if the brackets are
    /// empty, unsorted, overlapping, do not start at zero, do not end
    /// unbounded, or carry a rate outside `[0, 1]`.
    pub fn try_calculate(
        taxable_income: Money,
        table_name: &str,
        brackets: &[TaxBracket],
    ) -> Result<BracketCalculation, ConfigurationError> {
        let table = BracketTable::new(table_name, brackets.to_vec())?;
        Ok(Self::calculate(taxable_income, &table))
    }

    /// Family-quotient variant: the table is applied to `taxable_income /
    /// parts` and every line item is multiplied back by `parts`.
    ///
    /// `parts` below one is treated as one.
    pub fn calculate_with_parts(
        taxable_income: Money,
        table: &BracketTable,
        parts: Decimal,
    ) -> BracketCalculation {
        if taxable_income < Decimal::ZERO {
            warn!(
                table = table.name(),
                taxable_income = %taxable_income,
                "Negative taxable income; treating as zero"
            );
        }
        let taxable_income = non_negative(taxable_income);
        let parts = parts.max(Decimal::ONE);
        let income_per_part = taxable_income / parts;

        let line_items: Vec<BracketLineItem> = table
            .brackets()
            .iter()
            .filter(|bracket| bracket.lower_bound < income_per_part)
            .map(|bracket| {
                let ceiling = bracket
                    .upper_bound
                    .map_or(income_per_part, |upper| upper.min(income_per_part));
                let amount = non_negative(ceiling - bracket.lower_bound);

                BracketLineItem {
                    table: table.name().to_string(),
                    lower_bound: bracket.lower_bound,
                    upper_bound: bracket.upper_bound,
                    rate: bracket.rate,
                    amount_taxed: round_half_up(amount * parts),
                    tax: round_half_up(amount * bracket.rate * parts),
                }
            })
            .collect();

        let tax = line_items.iter().map(|item| item.tax).sum();

        BracketCalculation {
            table: table.name().to_string(),
            taxable_income,
            line_items,
            tax,
            marginal_rate: Self::marginal_rate(income_per_part, table),
        }
    }

    /// Rate of the bracket containing `income` (`lower <= income < upper`),
    /// or the top rate once income passes every bounded bracket.
    pub fn marginal_rate(
        income: Money,
        table: &BracketTable,
    ) -> Rate {
        table
            .bracket_for(income)
            .map(|bracket| bracket.rate)
            .unwrap_or_else(|| table.top_rate())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::error::BracketDefect;

    fn two_bracket_table() -> BracketTable {
        BracketTable::progressive("income", &[(dec!(0), dec!(0.10)), (dec!(10000), dec!(0.20))])
            .unwrap()
    }

    fn us_single_2025() -> BracketTable {
        BracketTable::progressive(
            "federal",
            &[
                (dec!(0), dec!(0.10)),
                (dec!(11925), dec!(0.12)),
                (dec!(48475), dec!(0.22)),
                (dec!(103350), dec!(0.24)),
                (dec!(197300), dec!(0.32)),
                (dec!(250525), dec!(0.35)),
                (dec!(626350), dec!(0.37)),
            ],
        )
        .unwrap()
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn calculate_returns_zero_for_zero_income() {
        let result = BracketCalculator::calculate(dec!(0), &two_bracket_table());

        assert_eq!(result.tax, dec!(0));
        assert!(result.line_items.is_empty());
        assert_eq!(result.marginal_rate, dec!(0.10));
    }

    #[test]
    fn calculate_treats_negative_income_as_zero() {
        let result = BracketCalculator::calculate(dec!(-500), &two_bracket_table());

        assert_eq!(result.taxable_income, dec!(0));
        assert_eq!(result.tax, dec!(0));
    }

    #[test]
    fn calculate_spans_two_brackets() {
        let result = BracketCalculator::calculate(dec!(50000), &two_bracket_table());

        assert_eq!(result.line_items[0].amount_taxed, dec!(10000.00));
        assert_eq!(result.line_items[0].tax, dec!(1000.00));
        assert_eq!(result.line_items[1].amount_taxed, dec!(40000.00));
        assert_eq!(result.line_items[1].tax, dec!(8000.00));
        assert_eq!(result.tax, dec!(9000.00));
        assert_eq!(result.marginal_rate, dec!(0.20));
    }

    #[test]
    fn boundary_income_is_taxed_in_lower_bracket() {
        let result = BracketCalculator::calculate(dec!(10000), &two_bracket_table());

        assert_eq!(result.line_items.len(), 1);
        assert_eq!(result.tax, dec!(1000.00));
        // The next unit of income is taxed at the upper rate.
        assert_eq!(result.marginal_rate, dec!(0.20));
    }

    #[test]
    fn matches_base_tax_schedule_in_third_bracket() {
        // Schedule form: 5578.50 + (85000 - 48475) * 0.22 = 13614
        let result = BracketCalculator::calculate(dec!(85000), &us_single_2025());

        assert_eq!(result.tax, dec!(13614.00));
        assert_eq!(result.line_items.len(), 3);
    }

    #[test]
    fn matches_base_tax_schedule_in_top_bracket() {
        // Schedule form: 188769.75 + (700000 - 626350) * 0.37 = 216020.25
        let result = BracketCalculator::calculate(dec!(700000), &us_single_2025());

        assert_eq!(result.tax, dec!(216020.25));
        assert_eq!(result.marginal_rate, dec!(0.37));
    }

    #[test]
    fn line_items_sum_to_total() {
        let table = us_single_2025();

        for income in [dec!(1), dec!(11925), dec!(48475.01), dec!(333333.33), dec!(1000000)] {
            let result = BracketCalculator::calculate(income, &table);
            let sum: Decimal = result.line_items.iter().map(|i| i.tax).sum();
            assert_eq!(sum, result.tax);
        }
    }

    #[test]
    fn boundary_continuity_at_edges() {
        let table = us_single_2025();
        let epsilon = dec!(1);
        let edge = dec!(48475);

        let below = BracketCalculator::calculate(edge - epsilon, &table).tax;
        let at = BracketCalculator::calculate(edge, &table).tax;
        let above = BracketCalculator::calculate(edge + epsilon, &table).tax;

        assert_eq!(at - below, epsilon * dec!(0.12));
        assert_eq!(above - at, epsilon * dec!(0.22));
    }

    // =========================================================================
    // quotient tests
    // =========================================================================

    #[test]
    fn calculate_with_parts_splits_income() {
        // 60000 over 2 parts: 2 * tax(30000) = 2 * (1000 + 4000) = 10000
        let result =
            BracketCalculator::calculate_with_parts(dec!(60000), &two_bracket_table(), dec!(2));

        assert_eq!(result.tax, dec!(10000.00));
        assert_eq!(result.line_items[0].amount_taxed, dec!(20000.00));
        assert_eq!(result.taxable_income, dec!(60000));
    }

    #[test]
    fn calculate_with_parts_below_one_behaves_like_one() {
        let plain = BracketCalculator::calculate(dec!(60000), &two_bracket_table());
        let parts =
            BracketCalculator::calculate_with_parts(dec!(60000), &two_bracket_table(), dec!(0));

        assert_eq!(plain, parts);
    }

    // =========================================================================
    // try_calculate tests
    // =========================================================================

    #[test]
    fn try_calculate_rejects_unsorted_brackets() {
        let brackets = vec![
            TaxBracket {
                lower_bound: dec!(0),
                upper_bound: Some(dec!(100)),
                rate: dec!(0.1),
            },
            TaxBracket {
                lower_bound: dec!(200),
                upper_bound: None,
                rate: dec!(0.2),
            },
        ];

        let result = BracketCalculator::try_calculate(dec!(500), "broken", &brackets);

        assert_eq!(
            result,
            Err(ConfigurationError::InvalidBracketTable {
                table: "broken".to_string(),
                defect: BracketDefect::NonContiguous {
                    index: 1,
                    expected: dec!(100),
                    actual: dec!(200)
                }
            })
        );
    }
}
