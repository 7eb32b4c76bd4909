use rust_decimal_macros::dec;

use super::{JurisdictionProfile, JurisdictionRules, RegimeProfile, TaxPlan};
use crate::calculations::{ContributionRule, DeductionPolicy, SurtaxRule};
use crate::error::ConfigurationError;
use crate::models::{BracketTable, JurisdictionKey, Rate, TaxCalculationParams};

const LONG_TERM_CARE: &str = "long-term care insurance";

fn long_term_care(rate: Rate) -> ContributionRule {
    ContributionRule::flat(LONG_TERM_CARE, rate)
        .capped_at(dec!(66150))
        .deductible()
}

/// Germany, 2025. The progressive zone formula is approximated by brackets
/// at the average rate of each zone.
#[derive(Debug, Clone)]
pub struct Germany {
    profile: JurisdictionProfile,
}

impl Germany {
    pub fn new() -> Result<Self, ConfigurationError> {
        let zones = BracketTable::progressive(
            "income tax",
            &[
                (dec!(0), dec!(0)),
                (dec!(12096), dec!(0.19)),
                (dec!(17443), dec!(0.33)),
                (dec!(68480), dec!(0.42)),
                (dec!(277825), dec!(0.45)),
            ],
        )?;

        let regime = RegimeProfile::new("standard", vec![zones])
            .with_deductions(DeductionPolicy::standard("employee lump-sum allowance", dec!(1230)))
            .with_contribution(
                ContributionRule::flat("pension insurance", dec!(0.093))
                    .capped_at(dec!(96600))
                    .deductible(),
            )
            .with_contribution(
                ContributionRule::flat("unemployment insurance", dec!(0.013)).capped_at(dec!(96600)),
            )
            .with_contribution(
                ContributionRule::flat("health insurance", dec!(0.0855))
                    .capped_at(dec!(66150))
                    .deductible(),
            )
            .with_contribution(long_term_care(dec!(0.018)))
            .with_surtax(
                SurtaxRule::on_tax("solidarity surcharge", dec!(0.055))
                    .shaded_in(dec!(19950), dec!(0.119)),
            );

        let profile = JurisdictionProfile::new(
            JurisdictionKey::from_static("DE", None),
            "Germany",
            "EUR",
            Some(2025),
            vec![regime],
        )?
        .with_simplification("income tax zones are approximated by brackets at average zone rates")
        .with_simplification("church tax is not modelled");

        Ok(Self { profile })
    }
}

impl JurisdictionRules for Germany {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }

    fn plan(
        &self,
        params: &TaxCalculationParams,
        regime: &RegimeProfile,
    ) -> Result<TaxPlan, ConfigurationError> {
        let mut plan = regime.plan();

        // Childless contributors pay the long-term care surcharge.
        if params.dependent_count() == 0 {
            for rule in plan.contributions.iter_mut().filter(|r| r.name == LONG_TERM_CARE) {
                *rule = long_term_care(dec!(0.024));
            }
        }

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::jurisdictions::PlanOutcome;
    use crate::models::Money;

    fn run(
        gross: Money,
        dependents: i32,
    ) -> PlanOutcome {
        let germany = Germany::new().unwrap();
        let mut params = TaxCalculationParams::new(gross, germany.profile().key.clone(), 2025);
        params.dependents = Some(dependents);
        germany
            .plan(&params, germany.profile().default_regime())
            .unwrap()
            .execute(&params)
            .unwrap()
    }

    #[test]
    fn contributions_are_deducted_before_brackets() {
        let outcome = run(dec!(60000), 0);

        // 60000 - (5580 + 5130 + 1440) deductible - 1230 allowance
        assert_eq!(outcome.taxable_income, dec!(46620.00));
        assert_eq!(outcome.sections[0].tax, dec!(10644.34));
        // Tax is below the solidarity surcharge exemption.
        assert!(outcome.surtaxes.is_empty());
    }

    #[test]
    fn long_term_care_rate_depends_on_children() {
        let childless = run(dec!(60000), 0);
        let parent = run(dec!(60000), 1);

        assert_eq!(childless.contributions[3].amount, dec!(1440.00));
        assert_eq!(parent.contributions[3].amount, dec!(1080.00));
    }

    #[test]
    fn high_earner_pays_capped_contributions_and_solidarity_surcharge() {
        let outcome = run(dec!(200000), 0);

        assert_eq!(outcome.contributions[0].amount, dec!(8983.80));
        assert_eq!(outcome.contributions[2].amount, dec!(5655.83));
        assert_eq!(outcome.sections[0].tax, dec!(65764.50));
        assert_eq!(outcome.surtaxes[0].amount, dec!(3617.05));
    }
}
