use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{JurisdictionProfile, JurisdictionRules, RegimeProfile};
use crate::calculations::{
    CreditBasis, CreditRule, DeductionPolicy, PhaseOut, SurtaxBase, SurtaxRule, TaperStep,
};
use crate::error::ConfigurationError;
use crate::models::{BracketTable, JurisdictionKey};

/// Australia, 2025-26 resident rates with the Medicare levy and the low
/// income tax offset.
#[derive(Debug, Clone)]
pub struct Australia {
    profile: JurisdictionProfile,
}

impl Australia {
    pub fn new() -> Result<Self, ConfigurationError> {
        let resident = BracketTable::progressive(
            "income tax",
            &[
                (dec!(0), dec!(0)),
                (dec!(18200), dec!(0.16)),
                (dec!(45000), dec!(0.30)),
                (dec!(135000), dec!(0.37)),
                (dec!(190000), dec!(0.45)),
            ],
        )?;

        let low_income_offset = CreditRule::new("low income tax offset", CreditBasis::Fixed {
            amount: dec!(700),
        })
        .phasing_out(PhaseOut::Taper {
            steps: vec![
                TaperStep {
                    from: dec!(37500),
                    to: Some(dec!(45000)),
                    rate: dec!(0.05),
                },
                TaperStep {
                    from: dec!(45000),
                    to: None,
                    rate: dec!(0.015),
                },
            ],
        })
        .against("income tax");

        let regime = RegimeProfile::new("resident", vec![resident])
            // Work-related expenses are claimed as itemized deductions.
            .with_deductions(DeductionPolicy::standard("work-related deductions", Decimal::ZERO))
            .with_credit(low_income_offset)
            .with_surtax(
                SurtaxRule::on_income("Medicare levy", dec!(0.02), SurtaxBase::Taxable)
                    .shaded_in(dec!(27222), dec!(0.10)),
            );

        let profile = JurisdictionProfile::new(
            JurisdictionKey::from_static("AU", None),
            "Australia",
            "AUD",
            Some(2025),
            vec![regime],
        )?
        .with_simplification("Medicare levy surcharge is not modelled");

        Ok(Self { profile })
    }
}

impl JurisdictionRules for Australia {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }
}
