//! Deduction resolution.
//!
//! Combines the caller's deduction inputs with a jurisdiction's
//! [`DeductionPolicy`] into one deductible amount and a breakdown for display.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::calculations::common::{amount_or_zero, round_half_up};
use crate::models::{DeductionInput, ItemizedAmounts, Money, NamedAmount};

/// How the standard amount and itemized deductions combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeductionMode {
    /// The larger of the two applies.
    #[default]
    GreaterOfStandardOrItemized,
    /// Both apply.
    StandardPlusItemized,
}

/// A jurisdiction's deduction rules for one regime and filing status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionPolicy {
    pub label: String,
    pub standard_amount: Money,
    pub mode: DeductionMode,
    pub allows_itemized: bool,
    pub allows_above_the_line: bool,
}

impl DeductionPolicy {
    /// No standard amount, nothing admissible.
    pub fn none() -> Self {
        Self {
            label: "standard deduction".to_string(),
            standard_amount: Decimal::ZERO,
            mode: DeductionMode::GreaterOfStandardOrItemized,
            allows_itemized: false,
            allows_above_the_line: false,
        }
    }

    /// Greater of `standard_amount` or itemized, plus above-the-line items.
    pub fn standard(
        label: impl Into<String>,
        standard_amount: Money,
    ) -> Self {
        Self {
            label: label.into(),
            standard_amount,
            mode: DeductionMode::GreaterOfStandardOrItemized,
            allows_itemized: true,
            allows_above_the_line: true,
        }
    }

    pub fn stacking(mut self) -> Self {
        self.mode = DeductionMode::StandardPlusItemized;
        self
    }

    pub fn without_itemized(mut self) -> Self {
        self.allows_itemized = false;
        self
    }

    pub fn without_above_the_line(mut self) -> Self {
        self.allows_above_the_line = false;
        self
    }

    pub fn with_standard_amount(
        mut self,
        standard_amount: Money,
    ) -> Self {
        self.standard_amount = standard_amount;
        self
    }
}

impl Default for DeductionPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Outcome of [`DeductionResolver::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeductionResolution {
    /// Standard and/or itemized amount.
    pub base: Money,
    /// Retirement, health savings, student-loan interest and other
    /// adjustments; these always add.
    pub above_the_line: Money,
    pub itemized: Vec<NamedAmount>,
    /// Inputs the policy does not admit.
    pub dropped: Vec<NamedAmount>,
}

impl DeductionResolution {
    pub fn total(&self) -> Money {
        self.base + self.above_the_line
    }

    pub fn into_itemized_amounts(self) -> ItemizedAmounts {
        ItemizedAmounts::from_items(self.itemized)
    }
}

/// Stateless deduction resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeductionResolver;

impl DeductionResolver {
    /// Resolves `input` under `policy`.
    ///
    /// Missing and negative inputs count as zero. Items the policy does not
    /// admit are reported in [`DeductionResolution::dropped`] rather than
    /// failing.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use takehome_core::DeductionInput;
    /// use takehome_core::calculations::{DeductionPolicy, DeductionResolver};
    ///
    /// let input = DeductionInput {
    ///     itemized_total: Some(dec!(18000)),
    ///     retirement_contributions: Some(dec!(5000)),
    ///     ..DeductionInput::default()
    /// };
    /// let policy = DeductionPolicy::standard("standard deduction", dec!(15000));
    ///
    /// let resolution = DeductionResolver::resolve(Some(&input), &policy);
    ///
    /// assert_eq!(resolution.total(), dec!(23000));
    /// ```
    pub fn resolve(
        input: Option<&DeductionInput>,
        policy: &DeductionPolicy,
    ) -> DeductionResolution {
        let empty = DeductionInput::default();
        let input = input.unwrap_or(&empty);

        let standard = round_half_up(
            input
                .standard_override
                .map(|amount| amount.max(Decimal::ZERO))
                .unwrap_or(policy.standard_amount),
        );
        let itemized = round_half_up(amount_or_zero(input.itemized_total));

        let mut resolution = DeductionResolution::default();

        if !policy.allows_itemized && itemized > Decimal::ZERO {
            resolution
                .dropped
                .push(NamedAmount::new("itemized deductions", itemized));
        }
        let itemized = if policy.allows_itemized {
            itemized
        } else {
            Decimal::ZERO
        };

        match policy.mode {
            DeductionMode::GreaterOfStandardOrItemized => {
                if itemized > standard {
                    resolution.base = itemized;
                    resolution
                        .itemized
                        .push(NamedAmount::new("itemized deductions", itemized));
                } else {
                    resolution.base = standard;
                    push_nonzero(&mut resolution.itemized, &policy.label, standard);
                }
            }
            DeductionMode::StandardPlusItemized => {
                resolution.base = standard + itemized;
                push_nonzero(&mut resolution.itemized, &policy.label, standard);
                push_nonzero(&mut resolution.itemized, "itemized deductions", itemized);
            }
        }

        let above_the_line = [
            ("retirement contributions", input.retirement_contributions),
            ("health savings", input.health_savings),
            ("student loan interest", input.student_loan_interest),
            ("other adjustments", input.other_adjustments),
        ];

        for (name, amount) in above_the_line {
            let amount = round_half_up(amount_or_zero(amount));
            if amount.is_zero() {
                continue;
            }
            if policy.allows_above_the_line {
                resolution.above_the_line += amount;
                resolution.itemized.push(NamedAmount::new(name, amount));
            } else {
                resolution.dropped.push(NamedAmount::new(name, amount));
            }
        }

        for item in &resolution.dropped {
            warn!(
                deduction = %item.name,
                amount = %item.amount,
                "Deduction not admissible in this jurisdiction; ignoring"
            );
        }

        resolution
    }
}

fn push_nonzero(
    items: &mut Vec<NamedAmount>,
    name: &str,
    amount: Money,
) {
    if !amount.is_zero() {
        items.push(NamedAmount::new(name, amount));
    }
}
