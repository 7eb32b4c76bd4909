//! United States: 2025 federal income tax and FICA, with California, New
//! York and the states that levy no income tax on wages.

use rust_decimal_macros::dec;

use super::{JurisdictionProfile, JurisdictionRules, PlanSection, RegimeProfile, TaxPlan};
use crate::calculations::{
    ContributionRule, CreditBasis, CreditKind, CreditRule, DeductionPolicy, PhaseOut, SurtaxBase,
    SurtaxRule, TaperStep,
};
use crate::error::ConfigurationError;
use crate::models::{
    AnnotationKind, BracketTable, FilingStatus, JurisdictionKey, Money, Rate,
    TaxCalculationParams,
};

const FEDERAL_RATES: [Rate; 7] = [
    dec!(0.10),
    dec!(0.12),
    dec!(0.22),
    dec!(0.24),
    dec!(0.32),
    dec!(0.35),
    dec!(0.37),
];

const NO_INCOME_TAX_STATES: [(&str, &str); 9] = [
    ("AK", "Alaska"),
    ("FL", "Florida"),
    ("NV", "Nevada"),
    ("NH", "New Hampshire"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("WA", "Washington"),
    ("WY", "Wyoming"),
];

fn federal_table(
    name: &str,
    bounds: [Money; 7],
) -> Result<BracketTable, ConfigurationError> {
    let steps: Vec<(Money, Rate)> = bounds.into_iter().zip(FEDERAL_RATES).collect();
    BracketTable::progressive(name, &steps)
}

#[derive(Debug, Clone)]
struct FederalTables {
    single: BracketTable,
    joint: BracketTable,
    separate: BracketTable,
    head_of_household: BracketTable,
}

impl FederalTables {
    fn new() -> Result<Self, ConfigurationError> {
        Ok(Self {
            single: federal_table(
                "federal",
                [
                    dec!(0),
                    dec!(11925),
                    dec!(48475),
                    dec!(103350),
                    dec!(197300),
                    dec!(250525),
                    dec!(626350),
                ],
            )?,
            joint: federal_table(
                "federal",
                [
                    dec!(0),
                    dec!(23850),
                    dec!(96950),
                    dec!(206700),
                    dec!(394600),
                    dec!(501050),
                    dec!(751600),
                ],
            )?,
            separate: federal_table(
                "federal",
                [
                    dec!(0),
                    dec!(11925),
                    dec!(48475),
                    dec!(103350),
                    dec!(197300),
                    dec!(250525),
                    dec!(375800),
                ],
            )?,
            head_of_household: federal_table(
                "federal",
                [
                    dec!(0),
                    dec!(17000),
                    dec!(64850),
                    dec!(103350),
                    dec!(197300),
                    dec!(250500),
                    dec!(626350),
                ],
            )?,
        })
    }

    fn for_status(
        &self,
        status: FilingStatus,
    ) -> &BracketTable {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedFilingJointly | FilingStatus::QualifyingSurvivingSpouse => {
                &self.joint
            }
            FilingStatus::MarriedFilingSeparately => &self.separate,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
        }
    }
}

fn standard_deduction(status: FilingStatus) -> Money {
    match status {
        FilingStatus::Single | FilingStatus::MarriedFilingSeparately => dec!(15000),
        FilingStatus::MarriedFilingJointly | FilingStatus::QualifyingSurvivingSpouse => {
            dec!(30000)
        }
        FilingStatus::HeadOfHousehold => dec!(22500),
    }
}

fn additional_medicare_threshold(status: FilingStatus) -> Money {
    match status {
        FilingStatus::MarriedFilingJointly => dec!(250000),
        FilingStatus::MarriedFilingSeparately => dec!(125000),
        _ => dec!(200000),
    }
}

fn payroll(status: FilingStatus) -> Vec<ContributionRule> {
    vec![
        ContributionRule::flat("Social Security", dec!(0.062)).capped_at(dec!(176100)),
        ContributionRule::flat("Medicare", dec!(0.0145))
            .with_additional(dec!(0.009), additional_medicare_threshold(status)),
    ]
}

fn credits(status: FilingStatus) -> Vec<CreditRule> {
    let phase_out_start = if status.is_joint() {
        dec!(400000)
    } else {
        dec!(200000)
    };

    vec![
        CreditRule::new("child tax credit", CreditBasis::PerDependent {
            amount: dec!(2000),
        })
        .phasing_out(PhaseOut::Taper {
            steps: vec![TaperStep {
                from: phase_out_start,
                to: None,
                rate: dec!(0.05),
            }],
        }),
        CreditRule::new("earned income credit", CreditBasis::Claimed {
            kind: CreditKind::EarnedIncome,
            limit_to_gross: true,
        })
        .refundable(),
    ]
}

/// Income tax rules of one state.
#[derive(Debug, Clone)]
struct StateRules {
    single: BracketTable,
    joint: BracketTable,
    standard_deduction: Money,
    joint_standard_deduction: Money,
    /// The joint table is derived from the single one rather than published.
    joint_is_derived: bool,
    contributions: Vec<ContributionRule>,
    surtaxes: Vec<SurtaxRule>,
}

impl StateRules {
    fn california() -> Result<Self, ConfigurationError> {
        let single = BracketTable::progressive(
            "state",
            &[
                (dec!(0), dec!(0.01)),
                (dec!(10756), dec!(0.02)),
                (dec!(25499), dec!(0.04)),
                (dec!(40245), dec!(0.06)),
                (dec!(55866), dec!(0.08)),
                (dec!(70606), dec!(0.093)),
                (dec!(360659), dec!(0.103)),
                (dec!(432787), dec!(0.113)),
                (dec!(721314), dec!(0.123)),
            ],
        )?;
        let joint = single.scaled("state", dec!(2))?;

        Ok(Self {
            single,
            joint,
            standard_deduction: dec!(5540),
            joint_standard_deduction: dec!(11080),
            joint_is_derived: false,
            contributions: vec![ContributionRule::flat("CA SDI", dec!(0.012))],
            surtaxes: vec![
                SurtaxRule::on_income(
                    "CA mental health services tax",
                    dec!(0.01),
                    SurtaxBase::SectionTaxable("state".to_string()),
                )
                .above(dec!(1000000)),
            ],
        })
    }

    fn new_york() -> Result<Self, ConfigurationError> {
        let single = BracketTable::progressive(
            "state",
            &[
                (dec!(0), dec!(0.04)),
                (dec!(8500), dec!(0.045)),
                (dec!(11700), dec!(0.0525)),
                (dec!(13900), dec!(0.055)),
                (dec!(80650), dec!(0.06)),
                (dec!(215400), dec!(0.0685)),
                (dec!(1077550), dec!(0.0965)),
                (dec!(5000000), dec!(0.103)),
                (dec!(25000000), dec!(0.109)),
            ],
        )?;
        let joint = single.scaled("state", dec!(2))?;

        Ok(Self {
            single,
            joint,
            standard_deduction: dec!(8000),
            joint_standard_deduction: dec!(16050),
            joint_is_derived: true,
            contributions: Vec::new(),
            surtaxes: Vec::new(),
        })
    }

    fn extend(
        &self,
        plan: &mut TaxPlan,
        status: FilingStatus,
    ) {
        let (table, deduction) = if status.is_joint() {
            (&self.joint, self.joint_standard_deduction)
        } else {
            (&self.single, self.standard_deduction)
        };

        plan.sections.push(
            PlanSection::new(table.clone())
                .with_deductions(DeductionPolicy::standard("state standard deduction", deduction)),
        );
        plan.contributions.extend(self.contributions.iter().cloned());
        plan.surtaxes.extend(self.surtaxes.iter().cloned());

        if status.is_joint() && self.joint_is_derived {
            plan.annotate(
                AnnotationKind::SimplifiedRule,
                "state joint brackets are estimated as twice the single brackets",
            );
        }
        if matches!(
            status,
            FilingStatus::HeadOfHousehold | FilingStatus::MarriedFilingSeparately
        ) {
            plan.annotate(
                AnnotationKind::SimplifiedRule,
                format!("state tax uses single-filer brackets for {}", status.as_str()),
            );
        }
    }
}

/// Federal rules plus, optionally, one state.
#[derive(Debug, Clone)]
pub struct UnitedStates {
    profile: JurisdictionProfile,
    federal: FederalTables,
    state: Option<StateRules>,
}

impl UnitedStates {
    pub fn federal() -> Result<Self, ConfigurationError> {
        Self::build(
            JurisdictionKey::from_static("US", None),
            "United States (federal)",
            None,
        )
    }

    pub fn california() -> Result<Self, ConfigurationError> {
        let us = Self::build(
            JurisdictionKey::from_static("US", Some("CA")),
            "United States - California",
            Some(StateRules::california()?),
        )?;
        Ok(us.with_simplification("California brackets are the 2024 schedule"))
    }

    pub fn new_york() -> Result<Self, ConfigurationError> {
        let us = Self::build(
            JurisdictionKey::from_static("US", Some("NY")),
            "United States - New York",
            Some(StateRules::new_york()?),
        )?;
        Ok(us.with_simplification("New York supplemental tax recapture is not modelled"))
    }

    /// A state with no tax on wages: federal rules only, under the state key.
    pub fn without_state_income_tax(
        code: &'static str,
        name: &str,
    ) -> Result<Self, ConfigurationError> {
        Self::build(
            JurisdictionKey::from_static("US", Some(code)),
            &format!("United States - {name} (no state income tax)"),
            None,
        )
    }

    pub fn all() -> Result<Vec<Self>, ConfigurationError> {
        let mut all = vec![Self::federal()?, Self::california()?, Self::new_york()?];
        for (code, name) in NO_INCOME_TAX_STATES {
            all.push(Self::without_state_income_tax(code, name)?);
        }
        Ok(all)
    }

    fn build(
        key: JurisdictionKey,
        name: &str,
        state: Option<StateRules>,
    ) -> Result<Self, ConfigurationError> {
        let federal = FederalTables::new()?;

        // The profile describes a single filer; `plan` picks per status.
        let status = FilingStatus::Single;
        let mut tables = vec![federal.for_status(status).clone()];
        tables.extend(state.as_ref().map(|s| s.single.clone()));

        let mut regime = RegimeProfile::new("standard", tables)
            .with_deductions(DeductionPolicy::standard(
                "standard deduction",
                standard_deduction(status),
            ));
        regime.contributions = payroll(status);
        regime.credits = credits(status);
        if let Some(state) = &state {
            regime.contributions.extend(state.contributions.iter().cloned());
            regime.surtaxes.extend(state.surtaxes.iter().cloned());
        }

        let profile = JurisdictionProfile::new(key, name, "USD", Some(2025), vec![regime])?
            .allowing_negative_tax();

        Ok(Self {
            profile,
            federal,
            state,
        })
    }

    fn with_simplification(
        mut self,
        note: &str,
    ) -> Self {
        self.profile = self.profile.with_simplification(note);
        self
    }
}

impl JurisdictionRules for UnitedStates {
    fn profile(&self) -> &JurisdictionProfile {
        &self.profile
    }

    fn plan(
        &self,
        params: &TaxCalculationParams,
        _regime: &RegimeProfile,
    ) -> Result<TaxPlan, ConfigurationError> {
        let status = params.filing_status();

        let mut plan = TaxPlan {
            sections: vec![PlanSection::new(self.federal.for_status(status).clone())],
            deductions: DeductionPolicy::standard("standard deduction", standard_deduction(status)),
            contributions: payroll(status),
            credits: credits(status),
            ..TaxPlan::default()
        };

        if let Some(state) = &self.state {
            state.extend(&mut plan, status);
        }

        Ok(plan)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::calculations::BracketCalculator;
    use crate::jurisdictions::PlanOutcome;

    fn run(
        us: &UnitedStates,
        gross: Money,
        status: FilingStatus,
        dependents: i32,
    ) -> PlanOutcome {
        let mut params = TaxCalculationParams::new(gross, us.profile().key.clone(), 2025);
        params.filing_status = Some(status);
        params.dependents = Some(dependents);
        us.plan(&params, us.profile().default_regime())
            .unwrap()
            .execute(&params)
            .unwrap()
    }

    // =========================================================================
    // federal tests
    // =========================================================================

    #[test]
    fn single_filer_takes_standard_deduction_and_fica() {
        let us = UnitedStates::federal().unwrap();

        let outcome = run(&us, dec!(100000), FilingStatus::Single, 0);

        assert_eq!(outcome.taxable_income, dec!(85000.00));
        assert_eq!(outcome.sections[0].tax, dec!(13614.00));
        assert_eq!(outcome.contributions[0].amount, dec!(6200.00));
        assert_eq!(outcome.contributions[1].amount, dec!(1450.00));
    }

    #[test]
    fn joint_filers_use_joint_table() {
        let us = UnitedStates::federal().unwrap();

        let outcome = run(&us, dec!(130000), FilingStatus::MarriedFilingJointly, 0);

        // 100000 taxable: 2385 + 8772 + 671
        let expected = BracketCalculator::calculate(dec!(100000), us.federal.for_status(
            FilingStatus::MarriedFilingJointly,
        ))
        .tax;
        assert_eq!(outcome.sections[0].tax, expected);
        assert_eq!(expected, dec!(11828.00));
    }

    #[test]
    fn child_tax_credit_per_dependent() {
        let us = UnitedStates::federal().unwrap();

        let outcome = run(&us, dec!(100000), FilingStatus::Single, 2);

        assert_eq!(outcome.credits[0].name, "child tax credit");
        assert_eq!(outcome.credits[0].amount, dec!(4000.00));
    }

    #[test]
    fn child_tax_credit_tapers_above_threshold() {
        let us = UnitedStates::federal().unwrap();

        // Adjusted income 220000: 4000 - 5% of 20000
        let outcome = run(&us, dec!(220000), FilingStatus::Single, 2);

        assert_eq!(outcome.credits[0].amount, dec!(3000.00));
    }

    #[test]
    fn social_security_saturates_at_wage_base() {
        let us = UnitedStates::federal().unwrap();

        let at_base = run(&us, dec!(176100), FilingStatus::Single, 0);
        let above = run(&us, dec!(400000), FilingStatus::Single, 0);

        assert_eq!(at_base.contributions[0].amount, dec!(10918.20));
        assert_eq!(above.contributions[0].amount, dec!(10918.20));
    }

    // =========================================================================
    // state tests
    // =========================================================================

    #[test]
    fn california_adds_state_section_sdi_and_own_deduction() {
        let us = UnitedStates::california().unwrap();

        let outcome = run(&us, dec!(100000), FilingStatus::Single, 0);

        assert_eq!(outcome.sections.len(), 2);
        assert_eq!(outcome.sections[1].table, "state");
        assert_eq!(outcome.sections[1].taxable_income, dec!(94460.00));
        assert_eq!(outcome.contributions[2].name, "CA SDI");
        assert_eq!(outcome.contributions[2].amount, dec!(1200.00));
    }

    #[test]
    fn california_mental_health_tax_above_one_million() {
        let us = UnitedStates::california().unwrap();

        let outcome = run(&us, dec!(2005540), FilingStatus::Single, 0);

        // State taxable income 2,000,000: 1% of the excess over 1,000,000.
        assert_eq!(
            outcome.surtaxes[0].amount,
            dec!(10000.00)
        );
    }

    #[test]
    fn new_york_joint_is_flagged_as_estimate() {
        let us = UnitedStates::new_york().unwrap();

        let outcome = run(&us, dec!(150000), FilingStatus::MarriedFilingJointly, 0);

        assert!(
            outcome
                .annotations
                .iter()
                .any(|a| a.kind == AnnotationKind::SimplifiedRule)
        );
    }

    #[test]
    fn no_income_tax_state_has_only_federal_section() {
        let us = UnitedStates::without_state_income_tax("TX", "Texas").unwrap();

        let outcome = run(&us, dec!(100000), FilingStatus::Single, 0);

        assert_eq!(outcome.sections.len(), 1);
        assert_eq!(us.profile().key.to_string(), "US-TX");
    }

    #[test]
    fn all_registers_twelve_jurisdictions() {
        assert_eq!(UnitedStates::all().unwrap().len(), 12);
    }
}
