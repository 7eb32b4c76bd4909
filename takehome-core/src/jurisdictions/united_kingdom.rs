//! United Kingdom, 2025/26: personal allowance with the 100k taper, rest of
//! UK or Scottish bands, Class 1 employee National Insurance.

use rust_decimal_macros::dec;

use super::{IncomeAdjustment, JurisdictionProfile, JurisdictionRules, RegimeProfile};
use crate::calculations::ContributionRule;
use crate::error::ConfigurationError;
use crate::models::{BracketTable, JurisdictionKey};

#[derive(Debug, Clone)]
pub struct UnitedKingdom {
    profile: JurisdictionProfile,
}

impl UnitedKingdom {
    /// England, Wales and Northern Ireland.
    pub fn rest_of_uk() -> Result<Self, ConfigurationError> {
        let bands = BracketTable::progressive(
            "income tax",
            &[
                (dec!(0), dec!(0.20)),
                (dec!(37700), dec!(0.40)),
                (dec!(125140), dec!(0.45)),
            ],
        )?;
        Self::build(JurisdictionKey::from_static("GB", None), "United Kingdom", bands)
    }

    pub fn scotland() -> Result<Self, ConfigurationError> {
        let bands = BracketTable::progressive(
            "income tax",
            &[
                (dec!(0), dec!(0.19)),
                (dec!(2827), dec!(0.20)),
                (dec!(14921), dec!(0.21)),
                (dec!(31092), dec!(0.42)),
                (dec!(62430), dec!(0.45)),
                (dec!(112570), dec!(0.48)),
            ],
        )?;
        Self::build(
            JurisdictionKey::from_static("GB", Some("SCT")),
            "United Kingdom - Scotland",
            bands,
        )
    }

    pub fn all() -> Result<Vec<Self>, ConfigurationError> {
        Ok(vec![Self::rest_of_uk()?, Self::scotland()?])
    }

    fn build(
        key: JurisdictionKey,
        name: &str,
        bands: BracketTable,
    ) -> Result<Self, ConfigurationError> {
        let regime = RegimeProfile::new("standard", vec![bands])
            .with_adjustment(IncomeAdjustment::TaperedAllowance {
                name: "personal allowance".to_string(),
                amount: dec!(12570),
                threshold: dec!(100000),
                taper_rate: dec!(0.5),
            })
            .with_contribution(
                ContributionRule::flat("National Insurance", dec!(0.08))
                    .exempting(dec!(12570))
                    .capped_at(dec!(50270))
                    .with_additional(dec!(0.02), dec!(50270)),
            );

        let profile = JurisdictionProfile::new(key, name, "GBP", Some(2025), vec![regime])?;

        Ok(Self { profile })
    }
}

impl JurisdictionRules for UnitedKingdom {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }
}
