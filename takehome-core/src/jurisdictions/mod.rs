//! Jurisdiction strategies.
//!
//! Every supported jurisdiction is a variant of [`JurisdictionStrategy`].
//! A strategy only chooses tables and rules for a taxpayer; the arithmetic is
//! always done by the shared executor in [`profile`], so adding a
//! jurisdiction never touches bracket walking or cap logic.

mod australia;
mod canada;
mod france;
mod generic;
mod germany;
mod india;
mod japan;
pub mod profile;
mod registry;
mod singapore;
mod united_kingdom;
mod united_states;

pub use australia::Australia;
pub use canada::Canada;
pub use france::France;
pub use generic::Generic;
pub use germany::Germany;
pub use india::India;
pub use japan::Japan;
pub use profile::{
    IncomeAdjustment, JurisdictionProfile, PlanOutcome, PlanSection, RegimeProfile, ScheduleStep,
    TaxPlan,
};
pub use registry::{JurisdictionRegistry, JurisdictionSummary, RegistryBuilder, Resolution};
pub use singapore::Singapore;
pub use united_kingdom::UnitedKingdom;
pub use united_states::UnitedStates;

use crate::error::ConfigurationError;
use crate::models::{AnnotationKind, JurisdictionKey, TaxCalculationParams};

/// What each strategy provides.
trait JurisdictionRules {
    fn profile(&self) -> &JurisdictionProfile;

    /// Tables and rules for `params` under `regime`.
    fn plan(
        &self,
        _params: &TaxCalculationParams,
        regime: &RegimeProfile,
    ) -> Result<TaxPlan, ConfigurationError> {
        Ok(regime.plan())
    }
}

impl JurisdictionRules for JurisdictionProfile {
    fn profile(&self) -> &JurisdictionProfile {
        self
    }
}

/// A supported jurisdiction.
#[derive(Debug, Clone)]
pub enum JurisdictionStrategy {
    UnitedStates(UnitedStates),
    Canada(Canada),
    UnitedKingdom(UnitedKingdom),
    Germany(Germany),
    France(France),
    India(India),
    Australia(Australia),
    Japan(Japan),
    Singapore(Singapore),
    Generic(Generic),
    /// A profile loaded from data rather than built in.
    TableDriven(JurisdictionProfile),
}

impl JurisdictionStrategy {
    fn rules(&self) -> &dyn JurisdictionRules {
        match self {
            Self::UnitedStates(s) => s,
            Self::Canada(s) => s,
            Self::UnitedKingdom(s) => s,
            Self::Germany(s) => s,
            Self::France(s) => s,
            Self::India(s) => s,
            Self::Australia(s) => s,
            Self::Japan(s) => s,
            Self::Singapore(s) => s,
            Self::Generic(s) => s,
            Self::TableDriven(profile) => profile,
        }
    }

    pub fn profile(&self) -> &JurisdictionProfile {
        self.rules().profile()
    }

    pub fn key(&self) -> &JurisdictionKey {
        &self.profile().key
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Generic(_))
    }

    /// The plan for `params` under `regime`, annotated with the profile's
    /// documented simplifications.
    pub fn plan(
        &self,
        params: &TaxCalculationParams,
        regime: &RegimeProfile,
    ) -> Result<TaxPlan, ConfigurationError> {
        let mut plan = self.rules().plan(params, regime)?;
        for note in &self.profile().simplifications {
            plan.annotate(AnnotationKind::SimplifiedRule, note.clone());
        }
        Ok(plan)
    }

    /// Every built-in jurisdiction except Generic.
    pub fn built_in() -> Result<Vec<Self>, ConfigurationError> {
        let mut strategies = Vec::new();
        strategies.extend(UnitedStates::all()?.into_iter().map(Self::UnitedStates));
        strategies.extend(Canada::all()?.into_iter().map(Self::Canada));
        strategies.extend(UnitedKingdom::all()?.into_iter().map(Self::UnitedKingdom));
        strategies.push(Self::Germany(Germany::new()?));
        strategies.push(Self::France(France::new()?));
        strategies.push(Self::India(India::new()?));
        strategies.push(Self::Australia(Australia::new()?));
        strategies.push(Self::Japan(Japan::new()?));
        strategies.push(Self::Singapore(Singapore::new()?));
        Ok(strategies)
    }
}
