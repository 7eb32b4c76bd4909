//! France, 2025 income: per-part bracket tax under the family quotient,
//! employee social contributions and the 10% professional-expense abatement.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::{IncomeAdjustment, JurisdictionProfile, JurisdictionRules, RegimeProfile, TaxPlan};
use crate::calculations::ContributionRule;
use crate::error::ConfigurationError;
use crate::models::{AnnotationKind, BracketTable, FilingStatus, JurisdictionKey, TaxCalculationParams};

/// Social security ceiling (PASS).
const CEILING: Decimal = dec!(47100);

#[derive(Debug, Clone)]
pub struct France {
    profile: JurisdictionProfile,
}

impl France {
    pub fn new() -> Result<Self, ConfigurationError> {
        let per_part = BracketTable::progressive(
            "income tax",
            &[
                (dec!(0), dec!(0)),
                (dec!(11497), dec!(0.11)),
                (dec!(29315), dec!(0.30)),
                (dec!(83823), dec!(0.41)),
                (dec!(180294), dec!(0.45)),
            ],
        )?;

        let regime = RegimeProfile::new("standard", vec![per_part])
            .with_adjustment(IncomeAdjustment::Abatement {
                name: "professional expenses abatement".to_string(),
                rate: dec!(0.10),
                min: dec!(504),
                max: Some(dec!(14171)),
            })
            .with_contribution(
                ContributionRule::flat("old-age insurance (capped)", dec!(0.069))
                    .capped_at(CEILING)
                    .deductible(),
            )
            .with_contribution(ContributionRule::flat("old-age insurance", dec!(0.004)).deductible())
            .with_contribution(
                ContributionRule::flat("supplementary pension T1", dec!(0.0401))
                    .capped_at(CEILING)
                    .deductible(),
            )
            .with_contribution(
                ContributionRule::flat("supplementary pension T2", dec!(0.0972))
                    .exempting(CEILING)
                    .capped_at(CEILING * dec!(8))
                    .deductible(),
            )
            .with_contribution(ContributionRule::flat("CSG (deductible)", dec!(0.06681)).deductible())
            .with_contribution(ContributionRule::flat("CSG (non-deductible)", dec!(0.02358)))
            .with_contribution(ContributionRule::flat("CRDS", dec!(0.0049125)));

        let profile = JurisdictionProfile::new(
            JurisdictionKey::from_static("FR", None),
            "France",
            "EUR",
            Some(2025),
            vec![regime],
        )?
        .with_simplification("the décote for low tax amounts is not applied");

        Ok(Self { profile })
    }

    /// Family-quotient parts: one per adult, half for each of the first two
    /// children and one for each further child.
    pub fn parts(
        status: FilingStatus,
        dependents: u32,
    ) -> Decimal {
        let adults = if status.is_joint() { dec!(2) } else { Decimal::ONE };
        let first_two = Decimal::from(dependents.min(2)) * dec!(0.5);
        let further = Decimal::from(dependents.saturating_sub(2));
        adults + first_two + further
    }
}

impl JurisdictionRules for France {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }

    fn plan(
        &self,
        params: &TaxCalculationParams,
        regime: &RegimeProfile,
    ) -> Result<TaxPlan, ConfigurationError> {
        let mut plan = regime.plan();
        let dependents = params.dependent_count();
        let parts = Self::parts(params.filing_status(), dependents);

        for section in &mut plan.sections {
            section.parts = parts;
        }
        if dependents > 0 {
            plan.annotate(
                AnnotationKind::SimplifiedRule,
                "the cap on the tax advantage of children's parts is not applied",
            );
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
        status: FilingStatus,
        dependents: i32,
    ) -> PlanOutcome {
        let france = France::new().unwrap();
        let mut params = TaxCalculationParams::new(gross, france.profile().key.clone(), 2025);
        params.filing_status = Some(status);
        params.dependents = Some(dependents);
        france
            .plan(&params, france.profile().default_regime())
            .unwrap()
            .execute(&params)
            .unwrap()
    }

    // =========================================================================
    // Family quotient
    // =========================================================================

    #[test]
    fn parts_follow_household_composition() {
        assert_eq!(France::parts(FilingStatus::Single, 0), dec!(1));
        assert_eq!(France::parts(FilingStatus::MarriedFilingJointly, 0), dec!(2));
        assert_eq!(France::parts(FilingStatus::MarriedFilingJointly, 2), dec!(3));
        assert_eq!(France::parts(FilingStatus::MarriedFilingJointly, 3), dec!(4));
        assert_eq!(France::parts(FilingStatus::Single, 1), dec!(1.5));
    }

    #[test]
    fn more_parts_lower_the_tax() {
        let single = run(dec!(80000), FilingStatus::Single, 0);
        let family = run(dec!(80000), FilingStatus::MarriedFilingJointly, 2);

        assert_eq!(single.taxable_income, family.taxable_income);
        assert!(family.sections[0].tax < single.sections[0].tax);
        assert!(
            family
                .annotations
                .iter()
                .any(|a| a.kind == AnnotationKind::SimplifiedRule)
        );
    }

    // =========================================================================
    // Contributions and abatement
    // =========================================================================

    #[test]
    fn single_earner_at_50k() {
        let outcome = run(dec!(50000), FilingStatus::Single, 0);

        assert_eq!(outcome.contributions[0].amount, dec!(3249.90));
        assert_eq!(outcome.contributions[3].amount, dec!(281.88));
        assert_eq!(outcome.contributions[6].amount, dec!(245.63));
        // 50000 - 8960.99 deductible contributions - 4103.90 abatement
        assert_eq!(outcome.taxable_income, dec!(36935.11));
        assert_eq!(outcome.sections[0].tax, dec!(4246.01));
    }

    #[test]
    fn abatement_has_a_floor() {
        let outcome = run(dec!(3000), FilingStatus::Single, 0);

        let abatement = &outcome.deductions.itemized[0];
        assert_eq!(abatement.name, "professional expenses abatement");
        assert_eq!(abatement.amount, dec!(504.00));
    }
}
