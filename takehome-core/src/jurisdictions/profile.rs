//! Jurisdiction profiles and the shared plan executor.
//!
//! A [`JurisdictionProfile`] is the immutable description of a jurisdiction:
//! its currency, table year and one or more [`RegimeProfile`]s. For a single
//! call a strategy turns the profile into a [`TaxPlan`] (the tables and rules
//! that apply to this taxpayer), and [`TaxPlan::execute`] runs it through the
//! calculators in a fixed order:
//!
//! 1. payroll contributions on gross income
//! 2. deductions, then adjusted income (gross less deductible contributions
//!    and above-the-line deductions)
//! 3. income adjustments (abatements, allowances, exemptions)
//! 4. bracket tax for each section
//! 5. credits, which may be bounded by section tax
//! 6. surtaxes, on section tax net of credits or on income
//! 7. levy reliefs, granted as credits once every surtax is known

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{non_negative, round_half_up};
use crate::calculations::{
    BracketCalculation, BracketCalculator, Contribution, ContributionRule, CreditContext,
    CreditResolver, CreditRule, DeductionPolicy, DeductionResolver, LevyRelief,
    PayrollContributionCalculator, ResolvedCredit, SurtaxCalculator, SurtaxContext, SurtaxRule,
    TaxedSection,
};
use crate::error::{BracketDefect, ConfigurationError};
use crate::models::{
    Annotation, AnnotationKind, BracketTable, CreditInput, ItemizedAmounts, JurisdictionKey, Money,
    NamedAmount, Rate, TaxCalculationParams,
};

/// One step of an [`IncomeAdjustment::EmploymentSchedule`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStep {
    /// Gross income up to which this step applies; `None` for the last step.
    pub up_to: Option<Money>,
    pub rate: Rate,
    pub fixed: Money,
}

/// A reduction of income before brackets apply, other than the deductions a
/// caller supplies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncomeAdjustment {
    /// `rate ×` adjusted income, at least `min`, at most `max`.
    Abatement {
        name: String,
        rate: Rate,
        min: Money,
        max: Option<Money>,
    },
    /// A flat amount.
    Exemption { name: String, amount: Money },
    /// `amount` for each dependent.
    PerDependent { name: String, amount: Money },
    /// `amount`, reduced by `taper_rate` for each unit of adjusted income
    /// above `threshold`.
    TaperedAllowance {
        name: String,
        amount: Money,
        threshold: Money,
        taper_rate: Rate,
    },
    /// `rate × gross + fixed` from the first step whose `up_to` covers gross
    /// income.
    EmploymentSchedule {
        name: String,
        steps: Vec<ScheduleStep>,
    },
}

impl IncomeAdjustment {
    pub fn name(&self) -> &str {
        match self {
            Self::Abatement { name, .. }
            | Self::Exemption { name, .. }
            | Self::PerDependent { name, .. }
            | Self::TaperedAllowance { name, .. }
            | Self::EmploymentSchedule { name, .. } => name,
        }
    }

    /// Amount of the adjustment, never more than the income it reduces.
    pub fn evaluate(
        &self,
        gross_income: Money,
        adjusted_income: Money,
        dependents: u32,
    ) -> Money {
        let amount = match self {
            Self::Abatement { rate, min, max, .. } => {
                let raw = (*rate * adjusted_income).max(*min);
                let capped = max.map_or(raw, |max| raw.min(max));
                capped.min(adjusted_income)
            }
            Self::Exemption { amount, .. } => *amount,
            Self::PerDependent { amount, .. } => *amount * Decimal::from(dependents),
            Self::TaperedAllowance {
                amount,
                threshold,
                taper_rate,
                ..
            } => non_negative(*amount - non_negative(adjusted_income - *threshold) * *taper_rate),
            Self::EmploymentSchedule { steps, .. } => steps
                .iter()
                .find(|step| step.up_to.is_none_or(|up_to| gross_income <= up_to))
                .or_else(|| steps.last())
                .map_or(Decimal::ZERO, |step| step.rate * gross_income + step.fixed)
                .min(gross_income),
        };
        round_half_up(non_negative(amount))
    }
}

/// One bracket table applied within a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSection {
    pub table: BracketTable,
    /// Family-quotient parts; one for ordinary tables.
    pub parts: Decimal,
    /// Deduction rules for this section when they differ from the plan's.
    pub deductions: Option<DeductionPolicy>,
}

impl PlanSection {
    pub fn new(table: BracketTable) -> Self {
        Self {
            table,
            parts: Decimal::ONE,
            deductions: None,
        }
    }

    pub fn with_parts(
        mut self,
        parts: Decimal,
    ) -> Self {
        self.parts = parts;
        self
    }

    pub fn with_deductions(
        mut self,
        deductions: DeductionPolicy,
    ) -> Self {
        self.deductions = Some(deductions);
        self
    }
}

/// The concrete tables and rules for one calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxPlan {
    /// The first section is the primary one.
    pub sections: Vec<PlanSection>,
    pub deductions: DeductionPolicy,
    pub adjustments: Vec<IncomeAdjustment>,
    pub contributions: Vec<ContributionRule>,
    pub credits: Vec<CreditRule>,
    pub surtaxes: Vec<SurtaxRule>,
    pub reliefs: Vec<LevyRelief>,
    pub annotations: Vec<Annotation>,
}

/// Everything [`TaxPlan::execute`] computed, before credits are capped and
/// totals assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOutcome {
    pub taxable_income: Money,
    pub sections: Vec<BracketCalculation>,
    pub contributions: Vec<Contribution>,
    pub surtaxes: Vec<NamedAmount>,
    pub deductions: ItemizedAmounts,
    pub credits: Vec<ResolvedCredit>,
    pub annotations: Vec<Annotation>,
}

impl TaxPlan {
    pub fn annotate(
        &mut self,
        kind: AnnotationKind,
        message: impl Into<String>,
    ) {
        self.annotations.push(Annotation::new(kind, message));
    }

    /// Runs the plan for `params`.
    ///
    /// # Errors
    ///
    /// Propagates the [`ConfigurationError`] of any malformed contribution,
    /// credit, surtax or relief rule.
    pub fn execute(
        &self,
        params: &TaxCalculationParams,
    ) -> Result<PlanOutcome, ConfigurationError> {
        let gross_income = non_negative(params.gross_income);
        let dependents = params.dependent_count();
        let mut annotations = self.annotations.clone();

        let contributions = PayrollContributionCalculator::calculate(gross_income, &self.contributions)?;
        let deductible_contributions = PayrollContributionCalculator::deductible_total(&contributions);

        let deduction = DeductionResolver::resolve(params.deductions.as_ref(), &self.deductions);
        for dropped in &deduction.dropped {
            annotations.push(Annotation::new(
                AnnotationKind::InadmissibleDeduction,
                format!("{} ({}) is not deductible here and was ignored", dropped.name, dropped.amount),
            ));
        }

        let adjusted_income =
            non_negative(gross_income - deductible_contributions - deduction.above_the_line);

        let adjustments: Vec<NamedAmount> = self
            .adjustments
            .iter()
            .map(|adj| {
                NamedAmount::new(adj.name(), adj.evaluate(gross_income, adjusted_income, dependents))
            })
            .filter(|item| !item.amount.is_zero())
            .collect();
        let adjustments_total: Money = adjustments.iter().map(|a| a.amount).sum();

        let taxable_after = |deduction_base: Money| {
            round_half_up(non_negative(adjusted_income - deduction_base - adjustments_total))
        };
        let taxable_income = taxable_after(deduction.base);

        let sections: Vec<BracketCalculation> = self
            .sections
            .iter()
            .map(|section| {
                let taxable = match &section.deductions {
                    Some(policy) => {
                        taxable_after(DeductionResolver::resolve(params.deductions.as_ref(), policy).base)
                    }
                    None => taxable_income,
                };
                BracketCalculator::calculate_with_parts(taxable, &section.table, section.parts)
            })
            .collect();

        let no_claims = CreditInput::default();
        let inputs = LevyInputs {
            claims: params.credits.as_ref().unwrap_or(&no_claims),
            dependents,
            gross_income,
            adjusted_income,
            taxable_income,
        };
        let levies = self.levies(&inputs, &sections)?;

        let mut reliefs = Vec::new();
        for relief in &self.reliefs {
            reliefs.extend(self.relieve(relief, &inputs, &sections, &levies)?);
        }
        let Levies {
            mut credits,
            surtaxes,
        } = levies;
        credits.extend(reliefs);

        for credit in &credits {
            if credit.limited {
                annotations.push(Annotation::new(
                    AnnotationKind::CreditsLimited,
                    format!("{} exceeds the tax it offsets and was reduced", credit.name),
                ));
            }
            if credit.estimate && !credit.amount.is_zero() {
                annotations.push(Annotation::new(
                    AnnotationKind::SimplifiedRule,
                    format!("{} uses a simplified rule", credit.name),
                ));
            }
        }

        let surtaxes: Vec<NamedAmount> =
            surtaxes.into_iter().filter(|s| !s.amount.is_zero()).collect();

        let mut deduction_items = deduction.itemized;
        deduction_items.extend(adjustments);

        Ok(PlanOutcome {
            taxable_income,
            sections,
            contributions,
            surtaxes,
            deductions: ItemizedAmounts::from_items(deduction_items),
            credits,
            annotations,
        })
    }

    /// Credits, then surtaxes on the sections net of those credits. Surtaxes
    /// line up with `self.surtaxes`, zeros included.
    fn levies(
        &self,
        inputs: &LevyInputs<'_>,
        sections: &[BracketCalculation],
    ) -> Result<Levies, ConfigurationError> {
        let credit_context = CreditContext {
            claims: inputs.claims,
            dependents: inputs.dependents,
            gross_income: inputs.gross_income,
            adjusted_income: inputs.adjusted_income,
            sections,
        };
        let credits = CreditResolver::resolve(&credit_context, &self.credits)?;

        let taxed: Vec<TaxedSection<'_>> = sections
            .iter()
            .zip(&self.sections)
            .map(|(calculation, section)| TaxedSection {
                calculation,
                table: &section.table,
                parts: section.parts,
                credits: section_credits(&credits, &calculation.table),
            })
            .collect();
        let surtax_context = SurtaxContext {
            gross_income: inputs.gross_income,
            taxable_income: inputs.taxable_income,
            sections: &taxed,
        };
        let surtaxes = SurtaxCalculator::calculate(&surtax_context, &self.surtaxes)?;

        Ok(Levies { credits, surtaxes })
    }

    /// The relief credit `relief` grants, if the levy on its section outruns
    /// the income above the nearest threshold.
    fn relieve(
        &self,
        relief: &LevyRelief,
        inputs: &LevyInputs<'_>,
        sections: &[BracketCalculation],
        levies: &Levies,
    ) -> Result<Option<ResolvedCredit>, ConfigurationError> {
        relief.validate()?;
        let Some(index) = sections.iter().position(|s| s.table == relief.section) else {
            return Err(ConfigurationError::InvalidSurtaxRule {
                name: relief.name.clone(),
                reason: format!("no bracket table named '{}'", relief.section),
            });
        };
        let income = sections[index].taxable_income;
        let Some(threshold) = relief.threshold_below(income) else {
            return Ok(None);
        };

        let section = &self.sections[index];
        let mut at_threshold = sections.to_vec();
        at_threshold[index] =
            BracketCalculator::calculate_with_parts(threshold, &section.table, section.parts);
        let threshold_inputs = LevyInputs {
            taxable_income: if index == 0 { threshold } else { inputs.taxable_income },
            ..*inputs
        };
        let levy_at_threshold = self
            .levies(&threshold_inputs, &at_threshold)?
            .on_section(&self.surtaxes, &at_threshold[index]);
        let levy = levies.on_section(&self.surtaxes, &sections[index]);

        let amount = LevyRelief::relief(levy, levy_at_threshold, income, threshold);
        if amount.is_zero() {
            return Ok(None);
        }
        Ok(Some(ResolvedCredit {
            name: relief.name.clone(),
            amount,
            refundable: false,
            section: Some(relief.section.clone()),
            estimate: false,
            limited: false,
        }))
    }
}

/// Caller inputs the credit and surtax steps read besides section results.
#[derive(Debug, Clone, Copy)]
struct LevyInputs<'a> {
    claims: &'a CreditInput,
    dependents: u32,
    gross_income: Money,
    adjusted_income: Money,
    taxable_income: Money,
}

struct Levies {
    credits: Vec<ResolvedCredit>,
    surtaxes: Vec<NamedAmount>,
}

impl Levies {
    /// Tax of `calculation` net of its credits, plus the surtaxes charged on it.
    fn on_section(
        &self,
        rules: &[SurtaxRule],
        calculation: &BracketCalculation,
    ) -> Money {
        let surtaxes: Money = rules
            .iter()
            .zip(&self.surtaxes)
            .filter(|(rule, _)| rule.charges(&calculation.table))
            .map(|(_, surtax)| surtax.amount)
            .sum();
        non_negative(calculation.tax - section_credits(&self.credits, &calculation.table)) + surtaxes
    }
}

fn section_credits(
    credits: &[ResolvedCredit],
    section: &str,
) -> Money {
    credits
        .iter()
        .filter(|c| !c.refundable && c.section.as_deref() == Some(section))
        .map(|c| c.amount)
        .sum()
}

/// One set of tables and rules a taxpayer may be assessed under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegimeProfile {
    pub name: String,
    pub tables: Vec<BracketTable>,
    #[serde(default)]
    pub deductions: DeductionPolicy,
    #[serde(default)]
    pub adjustments: Vec<IncomeAdjustment>,
    #[serde(default)]
    pub contributions: Vec<ContributionRule>,
    #[serde(default)]
    pub credits: Vec<CreditRule>,
    #[serde(default)]
    pub surtaxes: Vec<SurtaxRule>,
    #[serde(default)]
    pub reliefs: Vec<LevyRelief>,
}

impl RegimeProfile {
    pub fn new(
        name: impl Into<String>,
        tables: Vec<BracketTable>,
    ) -> Self {
        Self {
            name: name.into(),
            tables,
            deductions: DeductionPolicy::none(),
            adjustments: Vec::new(),
            contributions: Vec::new(),
            credits: Vec::new(),
            surtaxes: Vec::new(),
            reliefs: Vec::new(),
        }
    }

    pub fn with_deductions(
        mut self,
        deductions: DeductionPolicy,
    ) -> Self {
        self.deductions = deductions;
        self
    }

    pub fn with_adjustment(
        mut self,
        adjustment: IncomeAdjustment,
    ) -> Self {
        self.adjustments.push(adjustment);
        self
    }

    pub fn with_contribution(
        mut self,
        rule: ContributionRule,
    ) -> Self {
        self.contributions.push(rule);
        self
    }

    pub fn with_credit(
        mut self,
        rule: CreditRule,
    ) -> Self {
        self.credits.push(rule);
        self
    }

    pub fn with_surtax(
        mut self,
        rule: SurtaxRule,
    ) -> Self {
        self.surtaxes.push(rule);
        self
    }

    pub fn with_relief(
        mut self,
        relief: LevyRelief,
    ) -> Self {
        self.reliefs.push(relief);
        self
    }

    /// The regime as a plan, every table a section with one part.
    pub fn plan(&self) -> TaxPlan {
        TaxPlan {
            sections: self.tables.iter().cloned().map(PlanSection::new).collect(),
            deductions: self.deductions.clone(),
            adjustments: self.adjustments.clone(),
            contributions: self.contributions.clone(),
            credits: self.credits.clone(),
            surtaxes: self.surtaxes.clone(),
            reliefs: self.reliefs.clone(),
            annotations: Vec::new(),
        }
    }

    /// Primary table, if any.
    pub fn primary_table(&self) -> Option<&BracketTable> {
        self.tables.first()
    }
}

/// Immutable description of one jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JurisdictionProfile {
    pub key: JurisdictionKey,
    pub name: String,
    /// ISO 4217 code; every amount is in this currency.
    pub currency: String,
    /// Year the tables describe; `None` for estimates not tied to a year.
    pub tax_year: Option<i32>,
    /// The first regime is the default.
    pub regimes: Vec<RegimeProfile>,
    pub allows_negative_tax: bool,
    pub simplifications: Vec<String>,
}

impl JurisdictionProfile {
    /// # Errors
    ///
    /// [`ConfigurationError::NoRegimes`] when `regimes` is empty, and
    /// [`ConfigurationError::InvalidBracketTable`] when a regime has no table.
    pub fn new(
        key: JurisdictionKey,
        name: impl Into<String>,
        currency: impl Into<String>,
        tax_year: Option<i32>,
        regimes: Vec<RegimeProfile>,
    ) -> Result<Self, ConfigurationError> {
        let profile = Self {
            key,
            name: name.into(),
            currency: currency.into(),
            tax_year,
            regimes,
            allows_negative_tax: false,
            simplifications: Vec::new(),
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Checks what `new` checks, for profiles assembled field by field.
    ///
    /// # Errors
    ///
    /// As for [`JurisdictionProfile::new`].
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.regimes.is_empty() {
            return Err(ConfigurationError::NoRegimes(self.key.clone()));
        }
        if let Some(regime) = self.regimes.iter().find(|r| r.tables.is_empty()) {
            return Err(ConfigurationError::bracket_table(&regime.name, BracketDefect::Empty));
        }
        Ok(())
    }

    pub fn allowing_negative_tax(mut self) -> Self {
        self.allows_negative_tax = true;
        self
    }

    pub fn with_simplification(
        mut self,
        note: impl Into<String>,
    ) -> Self {
        self.simplifications.push(note.into());
        self
    }

    pub fn default_regime(&self) -> &RegimeProfile {
        // `new` and registration both reject profiles without a regime
        &self.regimes[0]
    }

    /// Regime called `name`, ignoring case.
    pub fn regime(
        &self,
        name: &str,
    ) -> Option<&RegimeProfile> {
        self.regimes
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(name.trim()))
    }

    pub fn regime_names(&self) -> Vec<&str> {
        self.regimes.iter().map(|r| r.name.as_str()).collect()
    }

    /// Whether the taxpayer chooses between regimes.
    pub fn offers_regime_choice(&self) -> bool {
        self.regimes.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::{CreditBasis, SurtaxBase, SurtaxTier};
    use crate::models::DeductionInput;

    fn ten_twenty() -> BracketTable {
        BracketTable::progressive("income", &[(dec!(0), dec!(0.10)), (dec!(10000), dec!(0.20))])
            .unwrap()
    }

    fn params(gross: Money) -> TaxCalculationParams {
        TaxCalculationParams::new(gross, "XX".parse().unwrap(), 2025)
    }

    // =========================================================================
    // adjustment tests
    // =========================================================================

    #[test]
    fn abatement_respects_floor_and_cap() {
        let abatement = IncomeAdjustment::Abatement {
            name: "professional expenses".to_string(),
            rate: dec!(0.10),
            min: dec!(504),
            max: Some(dec!(14171)),
        };

        assert_eq!(abatement.evaluate(dec!(3000), dec!(3000), 0), dec!(504.00));
        assert_eq!(abatement.evaluate(dec!(300), dec!(300), 0), dec!(300.00));
        assert_eq!(abatement.evaluate(dec!(50000), dec!(50000), 0), dec!(5000.00));
        assert_eq!(abatement.evaluate(dec!(500000), dec!(500000), 0), dec!(14171.00));
    }

    #[test]
    fn tapered_allowance_shrinks_above_threshold() {
        let allowance = IncomeAdjustment::TaperedAllowance {
            name: "personal allowance".to_string(),
            amount: dec!(12570),
            threshold: dec!(100000),
            taper_rate: dec!(0.5),
        };

        assert_eq!(allowance.evaluate(dec!(90000), dec!(90000), 0), dec!(12570.00));
        assert_eq!(allowance.evaluate(dec!(110000), dec!(110000), 0), dec!(7570.00));
        assert_eq!(allowance.evaluate(dec!(130000), dec!(130000), 0), dec!(0.00));
    }

    #[test]
    fn employment_schedule_picks_step_by_gross() {
        let schedule = IncomeAdjustment::EmploymentSchedule {
            name: "employment income deduction".to_string(),
            steps: vec![
                ScheduleStep {
                    up_to: Some(dec!(1900000)),
                    rate: dec!(0),
                    fixed: dec!(650000),
                },
                ScheduleStep {
                    up_to: None,
                    rate: dec!(0.30),
                    fixed: dec!(80000),
                },
            ],
        };

        assert_eq!(schedule.evaluate(dec!(500000), dec!(500000), 0), dec!(500000.00));
        assert_eq!(schedule.evaluate(dec!(1000000), dec!(1000000), 0), dec!(650000.00));
        assert_eq!(schedule.evaluate(dec!(3000000), dec!(2500000), 0), dec!(980000.00));
    }

    #[test]
    fn per_dependent_adjustment_scales() {
        let relief = IncomeAdjustment::PerDependent {
            name: "child relief".to_string(),
            amount: dec!(4000),
        };

        assert_eq!(relief.evaluate(dec!(1), dec!(1), 3), dec!(12000.00));
    }

    // =========================================================================
    // execute tests
    // =========================================================================

    #[test]
    fn executes_single_table_plan() {
        let plan = RegimeProfile::new("standard", vec![ten_twenty()]).plan();

        let outcome = plan.execute(&params(dec!(50000))).unwrap();

        assert_eq!(outcome.taxable_income, dec!(50000));
        assert_eq!(outcome.sections[0].tax, dec!(9000.00));
        assert!(outcome.contributions.is_empty());
        assert!(outcome.credits.is_empty());
    }

    #[test]
    fn deductible_contributions_reduce_taxable_income() {
        let plan = RegimeProfile::new("standard", vec![ten_twenty()])
            .with_contribution(ContributionRule::flat("pension", dec!(0.10)).deductible())
            .with_contribution(ContributionRule::flat("levy", dec!(0.01)))
            .plan();

        let outcome = plan.execute(&params(dec!(50000))).unwrap();

        assert_eq!(outcome.taxable_income, dec!(45000.00));
    }

    #[test]
    fn inadmissible_deductions_are_annotated() {
        let plan = RegimeProfile::new("standard", vec![ten_twenty()]).plan();
        let mut params = params(dec!(50000));
        params.deductions = Some(DeductionInput {
            itemized_total: Some(dec!(20000)),
            ..DeductionInput::default()
        });

        let outcome = plan.execute(&params).unwrap();

        assert_eq!(outcome.taxable_income, dec!(50000));
        assert_eq!(outcome.annotations[0].kind, AnnotationKind::InadmissibleDeduction);
    }

    #[test]
    fn section_with_own_deductions_gets_own_taxable_income() {
        let mut plan = RegimeProfile::new("standard", vec![ten_twenty()])
            .with_deductions(DeductionPolicy::standard("standard deduction", dec!(15000)))
            .plan();
        plan.sections.push(
            PlanSection::new(ten_twenty().renamed("state"))
                .with_deductions(DeductionPolicy::standard("state deduction", dec!(5000))),
        );

        let outcome = plan.execute(&params(dec!(50000))).unwrap();

        assert_eq!(outcome.taxable_income, dec!(35000.00));
        assert_eq!(outcome.sections[1].taxable_income, dec!(45000.00));
    }

    #[test]
    fn surtax_sees_tax_net_of_section_credits() {
        let plan = RegimeProfile::new("standard", vec![ten_twenty()])
            .with_credit(
                CreditRule::new("rebate", CreditBasis::IncomeTaxUpTo { cap: dec!(1000) })
                    .against("income"),
            )
            .with_surtax(SurtaxRule::on_tax("cess", dec!(0.04)).on_section("income"))
            .with_surtax(
                SurtaxRule::on_income("levy", dec!(0.02), SurtaxBase::Gross).above(dec!(1000000)),
            )
            .plan();

        let outcome = plan.execute(&params(dec!(50000))).unwrap();

        // (9000 - 1000) * 4%; the levy is zero and left out.
        assert_eq!(outcome.surtaxes, vec![NamedAmount::new("cess", dec!(320.00))]);
    }

    fn surcharged() -> RegimeProfile {
        RegimeProfile::new("standard", vec![ten_twenty()])
            .with_surtax(SurtaxRule::Tiered {
                name: "surcharge".to_string(),
                section: "income".to_string(),
                tiers: vec![SurtaxTier {
                    threshold: dec!(20000),
                    rate: dec!(0.10),
                }],
                marginal_relief: true,
            })
            .with_surtax(SurtaxRule::on_tax("cess", dec!(0.04)).on_section("income").compounding())
    }

    #[test]
    fn levy_relief_caps_cess_on_relieved_surcharge() {
        let plan = surcharged()
            .with_relief(LevyRelief::new("relief", "income", [dec!(20000)]))
            .plan();

        let outcome = plan.execute(&params(dec!(20100))).unwrap();

        // Tax 3020, surcharge relieved to 80, cess 124: 3224 against a levy of
        // 3120 at 20000 plus the 100 above it.
        assert_eq!(outcome.surtaxes[0].amount, dec!(80.00));
        assert_eq!(outcome.surtaxes[1].amount, dec!(124.00));
        assert_eq!(outcome.credits.len(), 1);
        assert_eq!(outcome.credits[0].name, "relief");
        assert_eq!(outcome.credits[0].amount, dec!(4.00));
        assert_eq!(outcome.credits[0].section.as_deref(), Some("income"));
        assert!(!outcome.credits[0].refundable);
    }

    #[test]
    fn levy_relief_is_silent_when_levy_keeps_pace() {
        let plan = surcharged()
            .with_relief(LevyRelief::new("relief", "income", [dec!(20000)]))
            .plan();

        assert!(plan.execute(&params(dec!(20000))).unwrap().credits.is_empty());
        assert!(plan.execute(&params(dec!(40000))).unwrap().credits.is_empty());
    }

    #[test]
    fn levy_relief_needs_a_known_section() {
        let plan = surcharged()
            .with_relief(LevyRelief::new("relief", "state", [dec!(20000)]))
            .plan();

        let result = plan.execute(&params(dec!(30000)));

        assert!(matches!(result, Err(ConfigurationError::InvalidSurtaxRule { .. })));
    }

    // =========================================================================
    // profile tests
    // =========================================================================

    #[test]
    fn profile_requires_a_regime() {
        let key: JurisdictionKey = "ZZ".parse().unwrap();

        let result = JurisdictionProfile::new(key.clone(), "Nowhere", "XXX", None, vec![]);

        assert_eq!(result, Err(ConfigurationError::NoRegimes(key)));
    }

    #[test]
    fn profile_regime_lookup_ignores_case() {
        let profile = JurisdictionProfile::new(
            "ZZ".parse().unwrap(),
            "Somewhere",
            "XXX",
            Some(2025),
            vec![
                RegimeProfile::new("new", vec![ten_twenty()]),
                RegimeProfile::new("old", vec![ten_twenty()]),
            ],
        )
        .unwrap();

        assert_eq!(profile.regime("OLD").map(|r| r.name.as_str()), Some("old"));
        assert!(profile.regime("middle").is_none());
        assert!(profile.offers_regime_choice());
        assert_eq!(profile.default_regime().name, "new");
    }
}
