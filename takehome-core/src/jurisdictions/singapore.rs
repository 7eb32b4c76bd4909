use rust_decimal_macros::dec;

use super::{IncomeAdjustment, JurisdictionProfile, JurisdictionRules, RegimeProfile};
use crate::calculations::ContributionRule;
use crate::error::ConfigurationError;
use crate::models::{BracketTable, JurisdictionKey};

/// Singapore, year of assessment 2025, for a citizen employee.
#[derive(Debug, Clone)]
pub struct Singapore {
    profile: JurisdictionProfile,
}

impl Singapore {
    pub fn new() -> Result<Self, ConfigurationError> {
        let resident = BracketTable::progressive(
            "income tax",
            &[
                (dec!(0), dec!(0)),
                (dec!(20000), dec!(0.02)),
                (dec!(30000), dec!(0.035)),
                (dec!(40000), dec!(0.07)),
                (dec!(80000), dec!(0.115)),
                (dec!(120000), dec!(0.15)),
                (dec!(160000), dec!(0.18)),
                (dec!(200000), dec!(0.19)),
                (dec!(240000), dec!(0.195)),
                (dec!(280000), dec!(0.20)),
                (dec!(320000), dec!(0.22)),
                (dec!(500000), dec!(0.23)),
                (dec!(1000000), dec!(0.24)),
            ],
        )?;

        let regime = RegimeProfile::new("resident", vec![resident])
            .with_adjustment(IncomeAdjustment::Exemption {
                name: "earned income relief".to_string(),
                amount: dec!(1000),
            })
            .with_adjustment(IncomeAdjustment::PerDependent {
                name: "qualifying child relief".to_string(),
                amount: dec!(4000),
            })
            .with_contribution(
                ContributionRule::flat("CPF employee contribution", dec!(0.20))
                    .capped_at(dec!(88800))
                    .deductible(),
            );

        let profile = JurisdictionProfile::new(
            JurisdictionKey::from_static("SG", None),
            "Singapore",
            "SGD",
            Some(2025),
            vec![regime],
        )?
        .with_simplification("the 80000 cap on total personal reliefs is not applied");

        Ok(Self { profile })
    }
}

impl JurisdictionRules for Singapore {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::TaxCalculationParams;

    #[test]
    fn cpf_relief_reduces_chargeable_income() {
        let singapore = Singapore::new().unwrap();
        let params = TaxCalculationParams::new(dec!(100000), singapore.profile().key.clone(), 2025);

        let outcome = singapore
            .plan(&params, singapore.profile().default_regime())
            .unwrap()
            .execute(&params)
            .unwrap();

        // CPF on the 88800 ceiling
        assert_eq!(outcome.contributions[0].amount, dec!(17760.00));
        assert_eq!(outcome.taxable_income, dec!(81240.00));
        assert_eq!(outcome.sections[0].tax, dec!(3492.60));
    }

    #[test]
    fn low_income_pays_no_tax() {
        let singapore = Singapore::new().unwrap();
        let params = TaxCalculationParams::new(dec!(24000), singapore.profile().key.clone(), 2025);

        let outcome = singapore
            .plan(&params, singapore.profile().default_regime())
            .unwrap()
            .execute(&params)
            .unwrap();

        // 24000 - 4800 CPF - 1000 relief
        assert_eq!(outcome.taxable_income, dec!(18200.00));
        assert_eq!(outcome.sections[0].tax, dec!(0));
    }
}
