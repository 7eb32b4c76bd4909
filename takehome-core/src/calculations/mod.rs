//! Calculators shared by every jurisdiction.
//!
//! Each calculator is a stateless unit struct. Jurisdictions never walk
//! brackets or apply caps themselves; they describe rules and hand them to
//! these types.

mod brackets;
pub mod common;
mod credits;
mod deductions;
mod payroll;
mod surtax;

pub use brackets::{BracketCalculation, BracketCalculator};
pub use credits::{
    CreditBasis, CreditContext, CreditKind, CreditResolver, CreditRule, PhaseOut, ResolvedCredit,
    TaperStep,
};
pub use deductions::{DeductionMode, DeductionPolicy, DeductionResolution, DeductionResolver};
pub use payroll::{Contribution, ContributionRule, PayrollContributionCalculator};
pub use surtax::{
    LevyRelief, ShadeIn, SurtaxBase, SurtaxCalculator, SurtaxContext, SurtaxRule, SurtaxTier,
    TaxedSection,
};
