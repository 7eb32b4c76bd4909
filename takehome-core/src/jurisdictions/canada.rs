//! Canada: 2025 federal income tax, CPP/CPP2/EI, and the Ontario and British
//! Columbia provincial schedules.

use rust_decimal_macros::dec;

use super::{JurisdictionProfile, JurisdictionRules, RegimeProfile};
use crate::calculations::{ContributionRule, CreditBasis, CreditRule, SurtaxRule};
use crate::error::ConfigurationError;
use crate::models::{BracketTable, JurisdictionKey, Money};

fn federal_regime() -> Result<RegimeProfile, ConfigurationError> {
    let federal = BracketTable::progressive(
        "federal",
        &[
            (dec!(0), dec!(0.15)),
            (dec!(57375), dec!(0.205)),
            (dec!(114750), dec!(0.26)),
            (dec!(177882), dec!(0.29)),
            (dec!(253414), dec!(0.33)),
        ],
    )?;

    Ok(RegimeProfile::new("standard", vec![federal])
        .with_contribution(
            ContributionRule::flat("CPP", dec!(0.0595))
                .exempting(dec!(3500))
                .capped_at(dec!(71300)),
        )
        .with_contribution(
            ContributionRule::flat("CPP2", dec!(0.04))
                .exempting(dec!(71300))
                .capped_at(dec!(81200)),
        )
        .with_contribution(ContributionRule::flat("EI", dec!(0.0164)).capped_at(dec!(65700)))
        .with_credit(basic_personal_credit("federal", dec!(2419.35))))
}

fn basic_personal_credit(
    section: &str,
    amount: Money,
) -> CreditRule {
    CreditRule::new(format!("{section} basic personal amount"), CreditBasis::Fixed {
        amount,
    })
    .against(section)
}

/// Federal rules, optionally with one province.
#[derive(Debug, Clone)]
pub struct Canada {
    profile: JurisdictionProfile,
}

impl Canada {
    pub fn federal() -> Result<Self, ConfigurationError> {
        let profile = JurisdictionProfile::new(
            JurisdictionKey::from_static("CA", None),
            "Canada (federal)",
            "CAD",
            Some(2025),
            vec![federal_regime()?],
        )?
        .with_simplification("provincial income tax is not included without a province");

        Ok(Self::with_common_notes(profile))
    }

    pub fn ontario() -> Result<Self, ConfigurationError> {
        let provincial = BracketTable::progressive(
            "provincial",
            &[
                (dec!(0), dec!(0.0505)),
                (dec!(52886), dec!(0.0915)),
                (dec!(105775), dec!(0.1116)),
                (dec!(150000), dec!(0.1216)),
                (dec!(220000), dec!(0.1316)),
            ],
        )?;

        let mut regime = federal_regime()?
            .with_credit(basic_personal_credit("provincial", dec!(643.72)))
            .with_surtax(
                SurtaxRule::on_tax("Ontario surtax", dec!(0.20))
                    .on_section("provincial")
                    .above(dec!(5710)),
            )
            .with_surtax(
                SurtaxRule::on_tax("Ontario surtax (upper)", dec!(0.36))
                    .on_section("provincial")
                    .above(dec!(7307)),
            );
        regime.tables.push(provincial);

        let profile = JurisdictionProfile::new(
            JurisdictionKey::from_static("CA", Some("ON")),
            "Canada - Ontario",
            "CAD",
            Some(2025),
            vec![regime],
        )?
        .with_simplification("Ontario Health Premium is not modelled");

        Ok(Self::with_common_notes(profile))
    }

    pub fn british_columbia() -> Result<Self, ConfigurationError> {
        let provincial = BracketTable::progressive(
            "provincial",
            &[
                (dec!(0), dec!(0.0506)),
                (dec!(49279), dec!(0.077)),
                (dec!(98560), dec!(0.105)),
                (dec!(113158), dec!(0.1229)),
                (dec!(137407), dec!(0.147)),
                (dec!(186306), dec!(0.168)),
                (dec!(259829), dec!(0.205)),
            ],
        )?;

        let mut regime =
            federal_regime()?.with_credit(basic_personal_credit("provincial", dec!(654.36)));
        regime.tables.push(provincial);

        let profile = JurisdictionProfile::new(
            JurisdictionKey::from_static("CA", Some("BC")),
            "Canada - British Columbia",
            "CAD",
            Some(2025),
            vec![regime],
        )?;

        Ok(Self::with_common_notes(profile))
    }

    pub fn all() -> Result<Vec<Self>, ConfigurationError> {
        Ok(vec![Self::federal()?, Self::ontario()?, Self::british_columbia()?])
    }

    fn with_common_notes(profile: JurisdictionProfile) -> Self {
        Self {
            profile: profile.with_simplification("CPP and EI contribution credits are not applied"),
        }
    }
}

impl JurisdictionRules for Canada {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::jurisdictions::PlanOutcome;
    use crate::models::TaxCalculationParams;

    fn run(
        canada: &Canada,
        gross: Money,
    ) -> PlanOutcome {
        let params = TaxCalculationParams::new(gross, canada.profile().key.clone(), 2025);
        canada
            .plan(&params, canada.profile().default_regime())
            .unwrap()
            .execute(&params)
            .unwrap()
    }

    #[test]
    fn cpp_applies_between_exemption_and_ceiling() {
        let outcome = run(&Canada::federal().unwrap(), dec!(60000));

        // (60000 - 3500) * 5.95%
        assert_eq!(outcome.contributions[0].amount, dec!(3361.75));
        assert_eq!(outcome.contributions[1].amount, dec!(0.00));
        assert_eq!(outcome.contributions[2].amount, dec!(984.00));
    }

    #[test]
    fn cpp2_covers_second_earnings_band() {
        let outcome = run(&Canada::federal().unwrap(), dec!(100000));

        assert_eq!(outcome.contributions[0].amount, dec!(4034.10));
        assert_eq!(outcome.contributions[1].amount, dec!(396.00));
        assert_eq!(outcome.contributions[2].amount, dec!(1077.48));
    }

    #[test]
    fn basic_personal_credit_offsets_federal_tax() {
        let outcome = run(&Canada::federal().unwrap(), dec!(50000));

        assert_eq!(outcome.sections[0].tax, dec!(7500.00));
        assert_eq!(outcome.credits[0].amount, dec!(2419.35));
    }

    #[test]
    fn low_income_credit_is_limited_to_section_tax() {
        let outcome = run(&Canada::federal().unwrap(), dec!(10000));

        assert_eq!(outcome.credits[0].amount, dec!(1500.00));
        assert!(outcome.credits[0].limited);
    }

    #[test]
    fn ontario_surtax_applies_on_provincial_tax_net_of_credit() {
        let outcome = run(&Canada::ontario().unwrap(), dec!(150000));

        // Ontario tax: 2670.74 + 4839.34 + 4935.51 = 12445.59, less 643.72
        // credit = 11801.87; surtax 20% of 6091.87 + 36% of 4494.87
        assert_eq!(outcome.sections[1].tax, dec!(12445.59));
        assert_eq!(outcome.surtaxes[0].amount, dec!(1218.37));
        assert_eq!(outcome.surtaxes[1].amount, dec!(1618.15));
    }

    #[test]
    fn british_columbia_has_no_surtax() {
        let outcome = run(&Canada::british_columbia().unwrap(), dec!(150000));

        assert_eq!(outcome.sections.len(), 2);
        assert!(outcome.surtaxes.is_empty());
    }
}
