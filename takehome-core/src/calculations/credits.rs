//! Credit resolution and income-based phase-outs.
//!
//! A [`CreditRule`] pairs a *basis* (where the starting amount comes from)
//! with a *phase-out* (how rising income erodes it). Rules are evaluated
//! after bracket tax is known, so rebates can be bounded by the tax they
//! offset.
//!
//! Phase-outs measure the taxable income of the section the credit is set
//! against, or adjusted income (gross less deductible contributions and
//! above-the-line deductions) for credits not tied to a section.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::BracketCalculation;
use crate::calculations::common::{amount_or_zero, is_unit_rate, non_negative, round_half_up};
use crate::error::ConfigurationError;
use crate::models::{CreditInput, Money, Rate};

/// Caller-claimed credit categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditKind {
    EarnedIncome,
    Child,
    Education,
    Other,
}

impl CreditKind {
    pub const ALL: [CreditKind; 4] = [
        CreditKind::EarnedIncome,
        CreditKind::Child,
        CreditKind::Education,
        CreditKind::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::EarnedIncome => "earned income credit",
            Self::Child => "child credit",
            Self::Education => "education credit",
            Self::Other => "other credits",
        }
    }

    fn claimed(
        &self,
        claims: &CreditInput,
    ) -> Money {
        amount_or_zero(match self {
            Self::EarnedIncome => claims.earned_income,
            Self::Child => claims.child,
            Self::Education => claims.education,
            Self::Other => claims.other,
        })
    }
}

/// Where a credit's starting amount comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CreditBasis {
    /// `amount` for each dependent. A caller `child` claim replaces the product.
    PerDependent { amount: Money },
    Fixed { amount: Money },
    /// Whatever the caller claims for `kind`.
    Claimed { kind: CreditKind, limit_to_gross: bool },
    /// The tax it offsets, up to `cap`.
    IncomeTaxUpTo { cap: Money },
}

/// One band of a [`PhaseOut::Taper`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaperStep {
    pub from: Money,
    pub to: Option<Money>,
    pub rate: Rate,
}

/// How a credit shrinks as income rises.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseOut {
    #[default]
    None,
    /// Full credit at or below `threshold`, nothing above.
    Cliff { threshold: Money },
    /// Full credit up to `start`, falling linearly to zero at `end`.
    Linear { start: Money, end: Money },
    /// Reduced by `rate` for every unit of income inside each step.
    Taper { steps: Vec<TaperStep> },
    /// Above `threshold`, limited so that the offset tax, net of the credit,
    /// never exceeds the income above the threshold.
    MarginalRelief { threshold: Money },
}

impl PhaseOut {
    fn apply(
        &self,
        amount: Money,
        income: Money,
        offset_tax: Money,
    ) -> Money {
        match self {
            Self::None => amount,
            Self::Cliff { threshold } => {
                if income <= *threshold {
                    amount
                } else {
                    Decimal::ZERO
                }
            }
            Self::Linear { start, end } => {
                if income <= *start {
                    amount
                } else if income >= *end {
                    Decimal::ZERO
                } else {
                    amount * (*end - income) / (*end - *start)
                }
            }
            Self::Taper { steps } => {
                let reduction: Money = steps
                    .iter()
                    .map(|step| {
                        let top = step.to.map_or(income, |to| income.min(to));
                        non_negative(top - step.from) * step.rate
                    })
                    .sum();
                non_negative(amount - reduction)
            }
            Self::MarginalRelief { threshold } => {
                if income <= *threshold {
                    amount
                } else {
                    amount.min(non_negative(offset_tax - (income - *threshold)))
                }
            }
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Self::None => Ok(()),
            Self::Cliff { threshold } | Self::MarginalRelief { threshold } => {
                if *threshold < Decimal::ZERO {
                    Err("phase-out threshold must not be negative".to_string())
                } else {
                    Ok(())
                }
            }
            Self::Linear { start, end } => {
                if *start < Decimal::ZERO || end <= start {
                    Err("linear phase-out needs 0 <= start < end".to_string())
                } else {
                    Ok(())
                }
            }
            Self::Taper { steps } => {
                for step in steps {
                    if !is_unit_rate(step.rate) {
                        return Err("taper rate must be between 0 and 1".to_string());
                    }
                    if step.from < Decimal::ZERO || step.to.is_some_and(|to| to <= step.from) {
                        return Err("taper step needs 0 <= from < to".to_string());
                    }
                }
                Ok(())
            }
        }
    }
}

/// A credit a jurisdiction grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditRule {
    pub name: String,
    pub basis: CreditBasis,
    #[serde(default)]
    pub phase_out: PhaseOut,
    #[serde(default)]
    pub refundable: bool,
    /// Bracket table whose tax the credit offsets.
    #[serde(default)]
    pub section: Option<String>,
    /// The rule is a documented simplification.
    #[serde(default)]
    pub estimate: bool,
}

impl CreditRule {
    pub fn new(
        name: impl Into<String>,
        basis: CreditBasis,
    ) -> Self {
        Self {
            name: name.into(),
            basis,
            phase_out: PhaseOut::None,
            refundable: false,
            section: None,
            estimate: false,
        }
    }

    pub fn phasing_out(
        mut self,
        phase_out: PhaseOut,
    ) -> Self {
        self.phase_out = phase_out;
        self
    }

    pub fn refundable(mut self) -> Self {
        self.refundable = true;
        self
    }

    pub fn against(
        mut self,
        section: impl Into<String>,
    ) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn estimated(mut self) -> Self {
        self.estimate = true;
        self
    }

    fn matches_claim(
        &self,
        kind: CreditKind,
    ) -> bool {
        match &self.basis {
            CreditBasis::Claimed { kind: claimed, .. } => *claimed == kind,
            CreditBasis::PerDependent { .. } => kind == CreditKind::Child,
            _ => false,
        }
    }

    fn validate(
        &self,
        sections: &[BracketCalculation],
    ) -> Result<(), ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidCreditRule {
            name: self.name.clone(),
            reason,
        };

        let amount = match &self.basis {
            CreditBasis::PerDependent { amount } | CreditBasis::Fixed { amount } => Some(*amount),
            CreditBasis::IncomeTaxUpTo { cap } => Some(*cap),
            CreditBasis::Claimed { .. } => None,
        };
        if amount.is_some_and(|amount| amount < Decimal::ZERO) {
            return Err(invalid("credit amount must not be negative".to_string()));
        }
        self.phase_out.validate().map_err(invalid)?;
        if let Some(section) = &self.section {
            if !sections.iter().any(|s| &s.table == section) {
                return Err(invalid(format!("no bracket table named '{section}'")));
            }
        }
        Ok(())
    }
}

/// Inputs a credit rule can look at.
#[derive(Debug, Clone, Copy)]
pub struct CreditContext<'a> {
    pub claims: &'a CreditInput,
    pub dependents: u32,
    pub gross_income: Money,
    pub adjusted_income: Money,
    pub sections: &'a [BracketCalculation],
}

impl CreditContext<'_> {
    fn section(
        &self,
        name: &str,
    ) -> Option<&BracketCalculation> {
        self.sections.iter().find(|s| s.table == name)
    }

    fn total_tax(&self) -> Money {
        self.sections.iter().map(|s| s.tax).sum()
    }
}

/// A credit after basis, phase-out and section limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedCredit {
    pub name: String,
    pub amount: Money,
    pub refundable: bool,
    pub section: Option<String>,
    pub estimate: bool,
    /// Part of the credit was lost to the section's tax running out.
    pub limited: bool,
}

/// Stateless credit resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreditResolver;

impl CreditResolver {
    /// Resolves `rules` in order, then appends caller claims no rule covers
    /// as non-refundable credits without phase-out.
    ///
    /// Non-refundable credits aimed at a section are limited to that
    /// section's remaining tax.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidCreditRule`] for negative
    /// amounts, malformed phase-outs, or a section that is not in `context`.
    pub fn resolve(
        context: &CreditContext<'_>,
        rules: &[CreditRule],
    ) -> Result<Vec<ResolvedCredit>, ConfigurationError> {
        for rule in rules {
            rule.validate(context.sections)?;
        }

        let mut room: Vec<(String, Money)> = context
            .sections
            .iter()
            .map(|s| (s.table.clone(), s.tax))
            .collect();

        let mut credits = Vec::with_capacity(rules.len());

        for rule in rules {
            let section = rule.section.as_deref().and_then(|name| context.section(name));
            let (measured_income, offset_tax) = match section {
                Some(section) => (section.taxable_income, section.tax),
                None => (context.adjusted_income, context.total_tax()),
            };

            let base = match &rule.basis {
                CreditBasis::PerDependent { amount } => context
                    .claims
                    .child
                    .map(non_negative)
                    .unwrap_or_else(|| *amount * Decimal::from(context.dependents)),
                CreditBasis::Fixed { amount } => *amount,
                CreditBasis::Claimed {
                    kind,
                    limit_to_gross,
                } => {
                    let claimed = kind.claimed(context.claims);
                    if *limit_to_gross {
                        claimed.min(context.gross_income)
                    } else {
                        claimed
                    }
                }
                CreditBasis::IncomeTaxUpTo { cap } => (*cap).min(offset_tax),
            };

            let mut amount = round_half_up(rule.phase_out.apply(base, measured_income, offset_tax));
            let mut limited = false;

            if !rule.refundable {
                if let Some((_, remaining)) = rule
                    .section
                    .as_deref()
                    .and_then(|name| room.iter_mut().find(|(s, _)| s == name))
                {
                    if amount > *remaining {
                        amount = *remaining;
                        limited = true;
                    }
                    *remaining -= amount;
                }
            }

            credits.push(ResolvedCredit {
                name: rule.name.clone(),
                amount,
                refundable: rule.refundable,
                section: rule.section.clone(),
                estimate: rule.estimate,
                limited,
            });
        }

        for kind in CreditKind::ALL {
            let claimed = round_half_up(kind.claimed(context.claims));
            if claimed.is_zero() || rules.iter().any(|rule| rule.matches_claim(kind)) {
                continue;
            }
            credits.push(ResolvedCredit {
                name: kind.label().to_string(),
                amount: claimed,
                refundable: false,
                section: None,
                estimate: false,
                limited: false,
            });
        }

        Ok(credits)
    }
}
