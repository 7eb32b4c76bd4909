//! Surtaxes: levies computed from tax already owed or from income above a
//! threshold.
//!
//! Rules are evaluated in order after credits are known. A tax-based rule
//! sees its section's bracket tax net of the non-refundable credits aimed at
//! that section, so a rebate reduces both the tax and the levies stacked on
//! it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{is_unit_rate, non_negative, round_half_up};
use crate::calculations::{BracketCalculation, BracketCalculator};
use crate::error::ConfigurationError;
use crate::models::{BracketTable, Money, NamedAmount, Rate};

/// Income an income-based surtax is measured against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurtaxBase {
    Gross,
    /// Taxable income of the primary section.
    Taxable,
    SectionTaxable(String),
}

/// Caps a surtax at `rate × (measure − floor)` so it phases in smoothly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadeIn {
    pub floor: Money,
    pub rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurtaxTier {
    pub threshold: Money,
    pub rate: Rate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurtaxRule {
    /// `rate × (tax − threshold)`. With no section the tax of every section
    /// counts; `includes_surtaxes` adds the surtaxes evaluated before it.
    OnTax {
        name: String,
        rate: Rate,
        threshold: Money,
        section: Option<String>,
        includes_surtaxes: bool,
        shade_in: Option<ShadeIn>,
    },
    /// `rate × (income − threshold)`.
    OnIncome {
        name: String,
        rate: Rate,
        threshold: Money,
        base: SurtaxBase,
        shade_in: Option<ShadeIn>,
    },
    /// The whole section tax at the rate of the highest tier its taxable
    /// income passes, with optional marginal relief at each tier.
    Tiered {
        name: String,
        section: String,
        tiers: Vec<SurtaxTier>,
        marginal_relief: bool,
    },
}

impl SurtaxRule {
    pub fn on_tax(
        name: impl Into<String>,
        rate: Rate,
    ) -> Self {
        Self::OnTax {
            name: name.into(),
            rate,
            threshold: Decimal::ZERO,
            section: None,
            includes_surtaxes: false,
            shade_in: None,
        }
    }

    pub fn on_income(
        name: impl Into<String>,
        rate: Rate,
        base: SurtaxBase,
    ) -> Self {
        Self::OnIncome {
            name: name.into(),
            rate,
            threshold: Decimal::ZERO,
            base,
            shade_in: None,
        }
    }

    pub fn above(
        mut self,
        value: Money,
    ) -> Self {
        if let Self::OnTax { threshold, .. } | Self::OnIncome { threshold, .. } = &mut self {
            *threshold = value;
        }
        self
    }

    pub fn on_section(
        mut self,
        value: impl Into<String>,
    ) -> Self {
        if let Self::OnTax { section, .. } = &mut self {
            *section = Some(value.into());
        }
        self
    }

    pub fn compounding(mut self) -> Self {
        if let Self::OnTax {
            includes_surtaxes, ..
        } = &mut self
        {
            *includes_surtaxes = true;
        }
        self
    }

    pub fn shaded_in(
        mut self,
        floor: Money,
        rate: Rate,
    ) -> Self {
        if let Self::OnTax { shade_in, .. } | Self::OnIncome { shade_in, .. } = &mut self {
            *shade_in = Some(ShadeIn { floor, rate });
        }
        self
    }

    pub fn name(&self) -> &str {
        match self {
            Self::OnTax { name, .. } | Self::OnIncome { name, .. } | Self::Tiered { name, .. } => {
                name
            }
        }
    }

    /// Whether the rule is charged on `section`'s tax or income.
    pub fn charges(
        &self,
        section: &str,
    ) -> bool {
        match self {
            Self::OnTax { section: target, .. } => target.as_deref().is_none_or(|t| t == section),
            Self::OnIncome { base, .. } => {
                matches!(base, SurtaxBase::SectionTaxable(target) if target == section)
            }
            Self::Tiered { section: target, .. } => target == section,
        }
    }

    fn validate(
        &self,
        sections: &[TaxedSection<'_>],
    ) -> Result<(), ConfigurationError> {
        let invalid = |reason: String| {
            Err(ConfigurationError::InvalidSurtaxRule {
                name: self.name().to_string(),
                reason,
            })
        };
        let known = |section: &str| sections.iter().any(|s| s.calculation.table == section);

        let (rates, thresholds, section): (Vec<Rate>, Vec<Money>, Option<&str>) = match self {
            Self::OnTax {
                rate,
                threshold,
                section,
                shade_in,
                ..
            } => (
                shade_in.iter().map(|s| s.rate).chain([*rate]).collect(),
                shade_in.iter().map(|s| s.floor).chain([*threshold]).collect(),
                section.as_deref(),
            ),
            Self::OnIncome {
                rate,
                threshold,
                base,
                shade_in,
                ..
            } => (
                shade_in.iter().map(|s| s.rate).chain([*rate]).collect(),
                shade_in.iter().map(|s| s.floor).chain([*threshold]).collect(),
                match base {
                    SurtaxBase::SectionTaxable(section) => Some(section.as_str()),
                    _ => None,
                },
            ),
            Self::Tiered { section, tiers, .. } => {
                if tiers.is_empty() {
                    return invalid("tiered surtax needs at least one tier".to_string());
                }
                if tiers.windows(2).any(|w| w[1].threshold <= w[0].threshold) {
                    return invalid("tier thresholds must be strictly ascending".to_string());
                }
                (
                    tiers.iter().map(|t| t.rate).collect(),
                    tiers.iter().map(|t| t.threshold).collect(),
                    Some(section.as_str()),
                )
            }
        };

        if !rates.into_iter().all(is_unit_rate) {
            return invalid("rates must be between 0 and 1".to_string());
        }
        if thresholds.into_iter().any(|t| t < Decimal::ZERO) {
            return invalid("thresholds must not be negative".to_string());
        }
        if let Some(section) = section {
            if !known(section) {
                return invalid(format!("no bracket table named '{section}'"));
            }
        }
        Ok(())
    }
}

/// A section's bracket result with what is needed to re-evaluate it.
#[derive(Debug, Clone, Copy)]
pub struct TaxedSection<'a> {
    pub calculation: &'a BracketCalculation,
    pub table: &'a BracketTable,
    pub parts: Decimal,
    /// Non-refundable credits set against this section.
    pub credits: Money,
}

impl TaxedSection<'_> {
    pub fn net_tax(&self) -> Money {
        non_negative(self.calculation.tax - self.credits)
    }
}

/// Relief applied once every surtax is known.
///
/// The levy on a section is its tax net of credits plus the surtaxes charged
/// on it. Past each threshold the levy may rise by no more than the income
/// above that threshold, so a surtax computed on a relieved amount (a cess on
/// a surcharge, say) cannot push the marginal rate over 100%. The plan
/// executor grants the excess as a non-refundable credit against the section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevyRelief {
    pub name: String,
    pub section: String,
    pub thresholds: Vec<Money>,
}

impl LevyRelief {
    pub fn new(
        name: impl Into<String>,
        section: impl Into<String>,
        thresholds: impl IntoIterator<Item = Money>,
    ) -> Self {
        Self {
            name: name.into(),
            section: section.into(),
            thresholds: thresholds.into_iter().collect(),
        }
    }

    /// Highest threshold strictly below `income`.
    pub fn threshold_below(
        &self,
        income: Money,
    ) -> Option<Money> {
        self.thresholds
            .iter()
            .copied()
            .filter(|threshold| *threshold < income)
            .max()
    }

    /// Relief owed on `levy` at `income`, given the levy due at `threshold`.
    pub fn relief(
        levy: Money,
        levy_at_threshold: Money,
        income: Money,
        threshold: Money,
    ) -> Money {
        non_negative(levy - levy_at_threshold - (income - threshold))
    }

    /// # Errors
    ///
    /// [`ConfigurationError::InvalidSurtaxRule`] for a negative threshold.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.thresholds.iter().any(|t| *t < Decimal::ZERO) {
            return Err(ConfigurationError::InvalidSurtaxRule {
                name: self.name.clone(),
                reason: "relief thresholds must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SurtaxContext<'a> {
    pub gross_income: Money,
    pub taxable_income: Money,
    pub sections: &'a [TaxedSection<'a>],
}

impl SurtaxContext<'_> {
    fn section(
        &self,
        name: &str,
    ) -> Option<&TaxedSection<'_>> {
        self.sections.iter().find(|s| s.calculation.table == name)
    }

    fn net_tax(
        &self,
        section: Option<&str>,
    ) -> Money {
        match section {
            Some(name) => self.section(name).map_or(Decimal::ZERO, TaxedSection::net_tax),
            None => self.sections.iter().map(TaxedSection::net_tax).sum(),
        }
    }
}

/// Stateless surtax calculator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurtaxCalculator;

impl SurtaxCalculator {
    /// Evaluates `rules` in order; each amount is rounded to cents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSurtaxRule`] for rates outside
    /// `[0, 1]`, negative thresholds, unsorted tiers or unknown sections.
    pub fn calculate(
        context: &SurtaxContext<'_>,
        rules: &[SurtaxRule],
    ) -> Result<Vec<NamedAmount>, ConfigurationError> {
        for rule in rules {
            rule.validate(context.sections)?;
        }

        let mut surtaxes: Vec<NamedAmount> = Vec::with_capacity(rules.len());

        for rule in rules {
            let amount = match rule {
                SurtaxRule::OnTax {
                    rate,
                    threshold,
                    section,
                    includes_surtaxes,
                    shade_in,
                    ..
                } => {
                    let mut base = context.net_tax(section.as_deref());
                    if *includes_surtaxes {
                        base += surtaxes.iter().map(|s| s.amount).sum::<Money>();
                    }
                    shaded(*rate * non_negative(base - *threshold), base, shade_in.as_ref())
                }
                SurtaxRule::OnIncome {
                    rate,
                    threshold,
                    base,
                    shade_in,
                    ..
                } => {
                    let measure = match base {
                        SurtaxBase::Gross => context.gross_income,
                        SurtaxBase::Taxable => context.taxable_income,
                        SurtaxBase::SectionTaxable(name) => context
                            .section(name)
                            .map_or(Decimal::ZERO, |s| s.calculation.taxable_income),
                    };
                    shaded(
                        *rate * non_negative(measure - *threshold),
                        measure,
                        shade_in.as_ref(),
                    )
                }
                SurtaxRule::Tiered {
                    section,
                    tiers,
                    marginal_relief,
                    ..
                } => match context.section(section) {
                    Some(section) => tiered(section, tiers, *marginal_relief),
                    None => Decimal::ZERO,
                },
            };

            surtaxes.push(NamedAmount::new(rule.name(), round_half_up(amount)));
        }

        Ok(surtaxes)
    }
}

fn shaded(
    amount: Money,
    measure: Money,
    shade_in: Option<&ShadeIn>,
) -> Money {
    match shade_in {
        Some(shade) => amount.min(shade.rate * non_negative(measure - shade.floor)),
        None => amount,
    }
}

fn tiered(
    section: &TaxedSection<'_>,
    tiers: &[SurtaxTier],
    marginal_relief: bool,
) -> Money {
    let income = section.calculation.taxable_income;
    let Some(index) = tiers.iter().rposition(|tier| tier.threshold < income) else {
        return Decimal::ZERO;
    };
    let tier = &tiers[index];
    let tax = section.net_tax();
    let amount = tier.rate * tax;

    if !marginal_relief {
        return amount;
    }

    // Tax plus surtax may not grow faster than income past the tier threshold.
    let previous_rate = index
        .checked_sub(1)
        .map_or(Decimal::ZERO, |i| tiers[i].rate);
    let tax_at_threshold =
        BracketCalculator::calculate_with_parts(tier.threshold, section.table, section.parts).tax;
    let ceiling = tax_at_threshold * (Decimal::ONE + previous_rate) + (income - tier.threshold);

    amount.min(non_negative(ceiling - tax))
}
