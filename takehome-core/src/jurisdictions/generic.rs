use rust_decimal::Decimal;

use super::{JurisdictionProfile, JurisdictionRules, RegimeProfile};
use crate::error::ConfigurationError;
use crate::models::{BracketTable, JurisdictionKey, Rate};

/// Flat-rate estimate used when no registration matches.
#[derive(Debug, Clone)]
pub struct Generic {
    profile: JurisdictionProfile,
}

impl Generic {
    pub fn new(rate: Rate) -> Result<Self, ConfigurationError> {
        let table = BracketTable::flat("flat estimate", rate)?;
        let percent = (rate * Decimal::ONE_HUNDRED).normalize();

        let profile = JurisdictionProfile::new(
            JurisdictionKey::generic(),
            "Generic estimate",
            "XXX",
            None,
            vec![RegimeProfile::new("flat", vec![table])],
        )?
        .with_simplification(format!(
            "flat {percent}% of gross income with no deductions or contributions; claimed credits apply as entered"
        ));

        Ok(Self { profile })
    }
}

impl JurisdictionRules for Generic {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }
}
