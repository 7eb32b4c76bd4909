//! India, FY 2025-26. Two regimes: the new regime (default) and the old
//! regime with its own slabs, rebate and surcharge tiers.

use rust_decimal_macros::dec;

use super::{JurisdictionProfile, JurisdictionRules, RegimeProfile};
use crate::calculations::{
    ContributionRule, CreditBasis, CreditRule, DeductionPolicy, LevyRelief, PhaseOut, SurtaxRule,
    SurtaxTier,
};
use crate::error::ConfigurationError;
use crate::models::{BracketTable, JurisdictionKey, Money, Rate};

const INCOME_TAX: &str = "income tax";

/// Taxable income up to which the new regime's rebate is available in full.
const REBATE_THRESHOLD: Money = dec!(1200000);
const OLD_REBATE_THRESHOLD: Money = dec!(500000);

const NEW_SURCHARGE: [(Money, Rate); 3] = [
    (dec!(5000000), dec!(0.10)),
    (dec!(10000000), dec!(0.15)),
    (dec!(20000000), dec!(0.25)),
];
const OLD_SURCHARGE: [(Money, Rate); 4] = [
    (dec!(5000000), dec!(0.10)),
    (dec!(10000000), dec!(0.15)),
    (dec!(20000000), dec!(0.25)),
    (dec!(50000000), dec!(0.37)),
];

fn surcharge(tiers: &[(Money, Rate)]) -> SurtaxRule {
    SurtaxRule::Tiered {
        name: "surcharge".to_string(),
        section: INCOME_TAX.to_string(),
        tiers: tiers
            .iter()
            .map(|&(threshold, rate)| SurtaxTier { threshold, rate })
            .collect(),
        marginal_relief: true,
    }
}

fn cess() -> SurtaxRule {
    SurtaxRule::on_tax("health and education cess", dec!(0.04))
        .on_section(INCOME_TAX)
        .compounding()
}

/// Rebate and surcharge relief stop at the tax before cess; this carries
/// them through the cess so income tax never grows faster than income past
/// the rebate threshold or a surcharge tier.
fn cess_relief(
    rebate_threshold: Money,
    surcharge_tiers: &[(Money, Rate)],
) -> LevyRelief {
    LevyRelief::new(
        "marginal relief on cess",
        INCOME_TAX,
        std::iter::once(rebate_threshold).chain(surcharge_tiers.iter().map(|&(threshold, _)| threshold)),
    )
}

fn section_87a_rebate(
    cap: Money,
    phase_out: PhaseOut,
) -> CreditRule {
    CreditRule::new("section 87A rebate", CreditBasis::IncomeTaxUpTo { cap })
        .phasing_out(phase_out)
        .against(INCOME_TAX)
}

fn new_regime() -> Result<RegimeProfile, ConfigurationError> {
    let slabs = BracketTable::progressive(
        INCOME_TAX,
        &[
            (dec!(0), dec!(0)),
            (dec!(400000), dec!(0.05)),
            (dec!(800000), dec!(0.10)),
            (dec!(1200000), dec!(0.15)),
            (dec!(1600000), dec!(0.20)),
            (dec!(2000000), dec!(0.25)),
            (dec!(2400000), dec!(0.30)),
        ],
    )?;

    Ok(RegimeProfile::new("new", vec![slabs])
        .with_deductions(
            DeductionPolicy::standard("standard deduction", dec!(75000))
                .without_itemized()
                .without_above_the_line(),
        )
        .with_credit(section_87a_rebate(dec!(60000), PhaseOut::MarginalRelief {
            threshold: REBATE_THRESHOLD,
        }))
        .with_surtax(surcharge(&NEW_SURCHARGE))
        .with_surtax(cess())
        .with_relief(cess_relief(REBATE_THRESHOLD, &NEW_SURCHARGE)))
}

fn old_regime() -> Result<RegimeProfile, ConfigurationError> {
    let slabs = BracketTable::progressive(
        INCOME_TAX,
        &[
            (dec!(0), dec!(0)),
            (dec!(250000), dec!(0.05)),
            (dec!(500000), dec!(0.20)),
            (dec!(1000000), dec!(0.30)),
        ],
    )?;

    Ok(RegimeProfile::new("old", vec![slabs])
        .with_deductions(DeductionPolicy::standard("standard deduction", dec!(50000)).stacking())
        .with_credit(section_87a_rebate(dec!(12500), PhaseOut::MarginalRelief {
            threshold: OLD_REBATE_THRESHOLD,
        }))
        .with_surtax(surcharge(&OLD_SURCHARGE))
        .with_surtax(cess())
        .with_relief(cess_relief(OLD_REBATE_THRESHOLD, &OLD_SURCHARGE)))
}

#[derive(Debug, Clone)]
pub struct India {
    profile: JurisdictionProfile,
}

impl India {
    pub fn new() -> Result<Self, ConfigurationError> {
        let provident_fund = ContributionRule::flat("employee provident fund", dec!(0.12))
            .capped_at(dec!(180000));

        let regimes = [new_regime()?, old_regime()?]
            .into_iter()
            .map(|regime| regime.with_contribution(provident_fund.clone()))
            .collect();

        let profile = JurisdictionProfile::new(
            JurisdictionKey::from_static("IN", None),
            "India",
            "INR",
            Some(2025),
            regimes,
        )?
        .with_simplification(
            "provident fund is 12% of gross up to the statutory wage ceiling; basic pay is not separated",
        );

        Ok(Self { profile })
    }
}

impl JurisdictionRules for India {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }
}
