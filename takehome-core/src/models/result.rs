use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{JurisdictionKey, Money, Rate};

/// A labelled amount (one contribution, surtax, deduction or credit).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedAmount {
    pub name: String,
    pub amount: Money,
}

impl NamedAmount {
    pub fn new(
        name: impl Into<String>,
        amount: Money,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// A total with the items that make it up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemizedAmounts {
    pub total: Money,
    pub itemized: Vec<NamedAmount>,
}

impl ItemizedAmounts {
    pub fn from_items(itemized: Vec<NamedAmount>) -> Self {
        let total = itemized.iter().map(|i| i.amount).sum();
        Self { total, itemized }
    }
}

/// Tax owed on the slice of income that fell in one bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketLineItem {
    /// Name of the table the bracket belongs to (`federal`, `state`, ...).
    pub table: String,
    pub lower_bound: Money,
    pub upper_bound: Option<Money>,
    pub rate: Rate,
    pub amount_taxed: Money,
    pub tax: Money,
}

/// How closely the jurisdiction that was used matches the one requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    #[default]
    Exact,
    /// The subdivision is not registered; only country-level rules applied.
    CountryLevel,
    /// Nothing matched; the flat Generic estimate applied.
    Generic,
}

impl Coverage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::CountryLevel => "country_level",
            Self::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    CoverageGap,
    SimplifiedRule,
    TableYearMismatch,
    CreditsLimited,
    InadmissibleDeduction,
    RegimeIgnored,
}

impl AnnotationKind {
    /// Whether a result carrying this annotation is only an approximation.
    pub fn marks_estimate(&self) -> bool {
        matches!(
            self,
            Self::CoverageGap | Self::SimplifiedRule | Self::TableYearMismatch
        )
    }
}

/// A note attached to a result explaining how a figure was derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    pub message: String,
}

impl Annotation {
    pub fn new(
        kind: AnnotationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The fully itemized outcome of one calculation.
///
/// Every component is always present; components that do not apply are zero
/// or empty. Amounts are in the jurisdiction's currency, rates are fractions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    /// Key the caller asked for.
    pub jurisdiction: JurisdictionKey,
    /// Key whose rules were actually applied.
    pub resolved_jurisdiction: JurisdictionKey,
    pub currency: String,
    pub year: i32,
    pub regime: Option<String>,

    pub gross_income: Money,
    pub taxable_income: Money,
    pub total_tax: Money,
    pub take_home_pay: Money,
    pub effective_rate: Rate,
    pub marginal_rate: Rate,

    pub brackets: Vec<BracketLineItem>,
    pub payroll_contributions: Vec<NamedAmount>,
    pub surtaxes: Vec<NamedAmount>,
    pub deductions: ItemizedAmounts,
    pub credits: ItemizedAmounts,

    pub coverage: Coverage,
    pub is_estimate: bool,
    pub annotations: Vec<Annotation>,
}

impl TaxCalculationResult {
    /// Tax from bracket tables alone.
    pub fn bracket_tax(&self) -> Money {
        self.brackets.iter().map(|b| b.tax).sum()
    }

    pub fn contributions_total(&self) -> Money {
        self.payroll_contributions.iter().map(|c| c.amount).sum()
    }

    pub fn surtaxes_total(&self) -> Money {
        self.surtaxes.iter().map(|s| s.amount).sum()
    }

    pub fn has_annotation(
        &self,
        kind: AnnotationKind,
    ) -> bool {
        self.annotations.iter().any(|a| a.kind == kind)
    }

    /// Flattens the result into a single row for storage or export.
    pub fn to_flat_record(&self) -> FlatResultRecord {
        FlatResultRecord {
            jurisdiction: self.jurisdiction.to_string(),
            resolved_jurisdiction: self.resolved_jurisdiction.to_string(),
            currency: self.currency.clone(),
            year: self.year,
            regime: self.regime.clone().unwrap_or_default(),
            gross_income: self.gross_income,
            taxable_income: self.taxable_income,
            bracket_tax: self.bracket_tax(),
            payroll_contributions: self.contributions_total(),
            surtaxes: self.surtaxes_total(),
            deductions: self.deductions.total,
            credits: self.credits.total,
            total_tax: self.total_tax,
            take_home_pay: self.take_home_pay,
            effective_rate: self.effective_rate,
            marginal_rate: self.marginal_rate,
            coverage: self.coverage.as_str().to_string(),
            is_estimate: self.is_estimate,
        }
    }
}

/// Scalar-only view of a [`TaxCalculationResult`], one row per calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatResultRecord {
    pub jurisdiction: String,
    pub resolved_jurisdiction: String,
    pub currency: String,
    pub year: i32,
    pub regime: String,
    pub gross_income: Money,
    pub taxable_income: Money,
    pub bracket_tax: Money,
    pub payroll_contributions: Money,
    pub surtaxes: Money,
    pub deductions: Money,
    pub credits: Money,
    pub total_tax: Money,
    pub take_home_pay: Money,
    pub effective_rate: Rate,
    pub marginal_rate: Rate,
    pub coverage: String,
    pub is_estimate: bool,
}

/// Variant minus base for the headline figures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioDelta {
    pub take_home_pay: Money,
    pub total_tax: Money,
    pub effective_rate: Rate,
}

impl ScenarioDelta {
    pub fn between(
        base: &TaxCalculationResult,
        variant: &TaxCalculationResult,
    ) -> Self {
        Self {
            take_home_pay: variant.take_home_pay - base.take_home_pay,
            total_tax: variant.total_tax - base.total_tax,
            effective_rate: variant.effective_rate - base.effective_rate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub name: String,
    pub result: TaxCalculationResult,
    pub delta: ScenarioDelta,
}

/// A base calculation and its what-if variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub base: TaxCalculationResult,
    pub variants: Vec<ScenarioOutcome>,
}

impl ScenarioComparison {
    /// The variant with the highest take-home pay, if any beats the base.
    pub fn best_variant(&self) -> Option<&ScenarioOutcome> {
        self.variants
            .iter()
            .filter(|v| v.delta.take_home_pay > Decimal::ZERO)
            .max_by_key(|v| v.delta.take_home_pay)
    }
}
