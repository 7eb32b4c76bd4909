mod filing_status;
mod jurisdiction;
mod params;
mod result;
mod tax_bracket;

use rust_decimal::Decimal;

pub use filing_status::FilingStatus;
pub use jurisdiction::JurisdictionKey;
pub use params::{
    CreditInput, DeductionInput, ParamsOverride, ScenarioVariant, TaxCalculationParams,
};
pub use result::{
    Annotation, AnnotationKind, BracketLineItem, Coverage, FlatResultRecord, ItemizedAmounts,
    NamedAmount, ScenarioComparison, ScenarioDelta, ScenarioOutcome, TaxCalculationResult,
};
pub use tax_bracket::{BracketTable, TaxBracket};

/// Monetary amounts, in the jurisdiction's own currency.
pub type Money = Decimal;

/// Rates as fractions (0.05 = 5%), never percentages.
pub type Rate = Decimal;
