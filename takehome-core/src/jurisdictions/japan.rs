//! Japan, 2025: national income tax with the employment income deduction,
//! the special reconstruction income tax and a flat resident tax.

use rust_decimal_macros::dec;

use super::{IncomeAdjustment, JurisdictionProfile, JurisdictionRules, RegimeProfile, ScheduleStep};
use crate::calculations::{ContributionRule, SurtaxBase, SurtaxRule};
use crate::error::ConfigurationError;
use crate::models::{BracketTable, JurisdictionKey};

const NATIONAL: &str = "national income tax";

fn employment_income_deduction() -> IncomeAdjustment {
    let step = |up_to, rate, fixed| ScheduleStep { up_to, rate, fixed };
    IncomeAdjustment::EmploymentSchedule {
        name: "employment income deduction".to_string(),
        steps: vec![
            step(Some(dec!(1900000)), dec!(0), dec!(650000)),
            step(Some(dec!(3600000)), dec!(0.30), dec!(80000)),
            step(Some(dec!(6600000)), dec!(0.20), dec!(440000)),
            step(Some(dec!(8500000)), dec!(0.10), dec!(1100000)),
            step(None, dec!(0), dec!(1950000)),
        ],
    }
}

#[derive(Debug, Clone)]
pub struct Japan {
    profile: JurisdictionProfile,
}

impl Japan {
    pub fn new() -> Result<Self, ConfigurationError> {
        let national = BracketTable::progressive(
            NATIONAL,
            &[
                (dec!(0), dec!(0.05)),
                (dec!(1950000), dec!(0.10)),
                (dec!(3300000), dec!(0.20)),
                (dec!(6950000), dec!(0.23)),
                (dec!(9000000), dec!(0.33)),
                (dec!(18000000), dec!(0.40)),
                (dec!(40000000), dec!(0.45)),
            ],
        )?;

        let regime = RegimeProfile::new("standard", vec![national])
            .with_adjustment(employment_income_deduction())
            .with_adjustment(IncomeAdjustment::Exemption {
                name: "basic deduction".to_string(),
                amount: dec!(480000),
            })
            .with_adjustment(IncomeAdjustment::PerDependent {
                name: "dependent deduction".to_string(),
                amount: dec!(380000),
            })
            .with_contribution(
                ContributionRule::flat("health insurance", dec!(0.05))
                    .capped_at(dec!(16680000))
                    .deductible(),
            )
            .with_contribution(
                ContributionRule::flat("employees' pension insurance", dec!(0.0915))
                    .capped_at(dec!(7800000))
                    .deductible(),
            )
            .with_contribution(ContributionRule::flat("employment insurance", dec!(0.0055)).deductible())
            .with_surtax(SurtaxRule::on_tax("reconstruction income tax", dec!(0.021)).on_section(NATIONAL))
            .with_surtax(SurtaxRule::on_income(
                "resident tax",
                dec!(0.10),
                SurtaxBase::SectionTaxable(NATIONAL.to_string()),
            ));

        let profile = JurisdictionProfile::new(
            JurisdictionKey::from_static("JP", None),
            "Japan",
            "JPY",
            Some(2025),
            vec![regime],
        )?
        .with_simplification(
            "resident tax is a flat 10% of national taxable income without its own deductions or per-capita levy",
        );

        Ok(Self { profile })
    }
}

impl JurisdictionRules for Japan {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }
}
