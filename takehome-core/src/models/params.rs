use serde::{Deserialize, Serialize};

use crate::models::{FilingStatus, JurisdictionKey, Money};

/// Deduction amounts supplied by the caller. Every field is optional;
/// missing or negative values count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeductionInput {
    /// Replaces the jurisdiction's standard deduction.
    pub standard_override: Option<Money>,
    /// Sum of itemized deductions (mortgage interest, charity, ...).
    pub itemized_total: Option<Money>,
    pub retirement_contributions: Option<Money>,
    pub health_savings: Option<Money>,
    pub student_loan_interest: Option<Money>,
    pub other_adjustments: Option<Money>,
}

/// Credits claimed by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditInput {
    pub earned_income: Option<Money>,
    /// Replaces the per-dependent amount a jurisdiction would compute.
    pub child: Option<Money>,
    pub education: Option<Money>,
    pub other: Option<Money>,
}

/// Everything one calculation needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationParams {
    pub gross_income: Money,
    pub jurisdiction: JurisdictionKey,
    #[serde(default)]
    pub regime: Option<String>,
    #[serde(default)]
    pub filing_status: Option<FilingStatus>,
    #[serde(default)]
    pub dependents: Option<i32>,
    #[serde(default)]
    pub deductions: Option<DeductionInput>,
    #[serde(default)]
    pub credits: Option<CreditInput>,
    pub year: i32,
}

impl TaxCalculationParams {
    pub fn new(
        gross_income: Money,
        jurisdiction: JurisdictionKey,
        year: i32,
    ) -> Self {
        Self {
            gross_income,
            jurisdiction,
            regime: None,
            filing_status: None,
            dependents: None,
            deductions: None,
            credits: None,
            year,
        }
    }

    pub fn filing_status(&self) -> FilingStatus {
        self.filing_status.unwrap_or_default()
    }

    /// Dependents as a count; validation has already rejected negatives.
    pub fn dependent_count(&self) -> u32 {
        self.dependents
            .and_then(|d| u32::try_from(d).ok())
            .unwrap_or(0)
    }
}

/// A partial set of params layered over a base scenario.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamsOverride {
    pub gross_income: Option<Money>,
    pub jurisdiction: Option<JurisdictionKey>,
    pub regime: Option<String>,
    pub filing_status: Option<FilingStatus>,
    pub dependents: Option<i32>,
    pub deductions: Option<DeductionInput>,
    pub credits: Option<CreditInput>,
    pub year: Option<i32>,
}

impl ParamsOverride {
    /// Returns `base` with every field this override sets replaced.
    pub fn apply(
        &self,
        base: &TaxCalculationParams,
    ) -> TaxCalculationParams {
        TaxCalculationParams {
            gross_income: self.gross_income.unwrap_or(base.gross_income),
            jurisdiction: self
                .jurisdiction
                .clone()
                .unwrap_or_else(|| base.jurisdiction.clone()),
            regime: self.regime.clone().or_else(|| base.regime.clone()),
            filing_status: self.filing_status.or(base.filing_status),
            dependents: self.dependents.or(base.dependents),
            deductions: self
                .deductions
                .clone()
                .or_else(|| base.deductions.clone()),
            credits: self.credits.clone().or_else(|| base.credits.clone()),
            year: self.year.unwrap_or(base.year),
        }
    }
}

/// A named what-if variant of a base scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioVariant {
    pub name: String,
    #[serde(flatten)]
    pub overrides: ParamsOverride,
}
