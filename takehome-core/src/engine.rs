//! The public entry point.
//!
//! [`TaxEngine`] validates a request, resolves the jurisdiction, lets the
//! strategy build a plan, runs it, then applies credits and assembles the
//! [`TaxCalculationResult`]. The engine holds only immutable data and can be
//! shared across threads by reference.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::calculations::ResolvedCredit;
use crate::calculations::common::{non_negative, ratio_or_zero, round_half_up, round_rate};
use crate::config::EngineConfig;
use crate::error::{ConfigurationError, TaxError, ValidationError};
use crate::jurisdictions::{JurisdictionRegistry, JurisdictionStrategy, RegimeProfile, RegistryBuilder};
use crate::models::{
    Annotation, AnnotationKind, Coverage, ItemizedAmounts, Money, NamedAmount, ScenarioComparison,
    ScenarioDelta, ScenarioOutcome, ScenarioVariant, TaxCalculationParams, TaxCalculationResult,
};

/// Credits as applied against the tax they may offset.
struct AppliedCredits {
    items: Vec<NamedAmount>,
    total: Money,
    annotations: Vec<Annotation>,
}

/// Multi-jurisdiction tax calculator.
///
/// ```
/// use rust_decimal_macros::dec;
/// use takehome_core::{EngineConfig, TaxCalculationParams, TaxEngine};
///
/// let engine = TaxEngine::with_built_ins(EngineConfig::default()).unwrap();
/// let params = TaxCalculationParams::new(dec!(60000), "GB".parse().unwrap(), 2025);
///
/// let result = engine.calculate_tax(&params).unwrap();
/// assert_eq!(result.currency, "GBP");
/// assert_eq!(result.take_home_pay, result.gross_income - result.total_tax);
/// ```
#[derive(Debug, Clone)]
pub struct TaxEngine {
    config: EngineConfig,
    registry: JurisdictionRegistry,
}

impl TaxEngine {
    /// Freezes `registrations` into a registry whose Generic fallback uses
    /// the configured rate.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::InvalidEngineConfig`] when `config` does not
    /// validate.
    pub fn new(
        config: EngineConfig,
        registrations: RegistryBuilder,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let registry = registrations.build(config.generic_rate)?;
        Ok(Self { config, registry })
    }

    /// An engine with every built-in jurisdiction.
    pub fn with_built_ins(config: EngineConfig) -> Result<Self, ConfigurationError> {
        Self::new(config, RegistryBuilder::with_built_ins()?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &JurisdictionRegistry {
        &self.registry
    }

    /// Calculates tax and take-home pay for one request.
    ///
    /// # Errors
    ///
    /// [`TaxError::Validation`] for impossible inputs or an unknown regime,
    /// [`TaxError::Configuration`] when the jurisdiction's data is broken.
    /// Nothing is computed when validation fails.
    pub fn calculate_tax(
        &self,
        params: &TaxCalculationParams,
    ) -> Result<TaxCalculationResult, TaxError> {
        self.validate(params)?;

        let resolution = self.registry.resolve(&params.jurisdiction);
        let strategy = resolution.strategy;
        let profile = strategy.profile();
        let mut annotations = Vec::new();

        match resolution.coverage {
            Coverage::Exact => {}
            Coverage::CountryLevel => {
                warn!(
                    requested = %params.jurisdiction,
                    resolved = %profile.key,
                    "Subdivision not registered; using country-level rules"
                );
                annotations.push(Annotation::new(
                    AnnotationKind::CoverageGap,
                    format!(
                        "no rules registered for {}; only {} rules applied",
                        params.jurisdiction, profile.key
                    ),
                ));
            }
            Coverage::Generic => {
                warn!(
                    requested = %params.jurisdiction,
                    rate = %self.config.generic_rate,
                    "Jurisdiction not registered; using generic estimate"
                );
                annotations.push(Annotation::new(
                    AnnotationKind::CoverageGap,
                    format!(
                        "no rules registered for {}; a flat generic estimate applied",
                        params.jurisdiction
                    ),
                ));
            }
        }

        let regime = self.select_regime(strategy, params, &mut annotations)?;

        if let Some(table_year) = profile.tax_year {
            if table_year != params.year {
                annotations.push(Annotation::new(
                    AnnotationKind::TableYearMismatch,
                    format!("{} tables describe {table_year}, not {}", profile.key, params.year),
                ));
            }
        }

        let plan = strategy.plan(params, regime)?;
        let outcome = plan.execute(params)?;
        annotations.extend(outcome.annotations);

        let bracket_tax: Money = outcome.sections.iter().map(|s| s.tax).sum();
        let contributions: Money = outcome.contributions.iter().map(|c| c.amount).sum();
        let surtaxes: Money = outcome.surtaxes.iter().map(|s| s.amount).sum();

        let before_credits = bracket_tax + contributions + surtaxes;
        let credits = self.apply_credits(
            &outcome.credits,
            bracket_tax + surtaxes,
            before_credits,
            profile.allows_negative_tax,
        );
        annotations.extend(credits.annotations);

        let gross_income = params.gross_income;
        let total_tax = round_half_up(before_credits - credits.total);
        let take_home_pay = gross_income - total_tax;
        let effective_rate = round_rate(ratio_or_zero(total_tax, gross_income));
        let marginal_rate = round_rate(outcome.sections.iter().map(|s| s.marginal_rate).sum());
        let is_estimate = annotations.iter().any(|a| a.kind.marks_estimate());

        debug!(
            jurisdiction = %params.jurisdiction,
            resolved = %profile.key,
            regime = %regime.name,
            gross_income = %gross_income,
            taxable_income = %outcome.taxable_income,
            total_tax = %total_tax,
            is_estimate,
            "Calculated tax"
        );

        Ok(TaxCalculationResult {
            jurisdiction: params.jurisdiction.clone(),
            resolved_jurisdiction: profile.key.clone(),
            currency: profile.currency.clone(),
            year: params.year,
            regime: profile.offers_regime_choice().then(|| regime.name.clone()),
            gross_income,
            taxable_income: outcome.taxable_income,
            total_tax,
            take_home_pay,
            effective_rate,
            marginal_rate,
            brackets: outcome
                .sections
                .into_iter()
                .flat_map(|section| section.line_items)
                .collect(),
            payroll_contributions: outcome.contributions.iter().map(NamedAmount::from).collect(),
            surtaxes: outcome.surtaxes,
            deductions: outcome.deductions,
            credits: ItemizedAmounts::from_items(credits.items),
            coverage: resolution.coverage,
            is_estimate,
            annotations,
        })
    }

    /// Calculates `base` and each variant layered over it.
    ///
    /// # Errors
    ///
    /// Fails as a whole on the first failing calculation; a failing variant
    /// is reported as [`TaxError::Scenario`] with its name.
    pub fn compare_scenarios(
        &self,
        base: &TaxCalculationParams,
        variants: &[ScenarioVariant],
    ) -> Result<ScenarioComparison, TaxError> {
        let base_result = self.calculate_tax(base)?;

        let variants = variants
            .iter()
            .map(|variant| {
                let params = variant.overrides.apply(base);
                let result = self.calculate_tax(&params).map_err(|source| TaxError::Scenario {
                    name: variant.name.clone(),
                    source: Box::new(source),
                })?;
                Ok(ScenarioOutcome {
                    name: variant.name.clone(),
                    delta: ScenarioDelta::between(&base_result, &result),
                    result,
                })
            })
            .collect::<Result<Vec<_>, TaxError>>()?;

        Ok(ScenarioComparison {
            base: base_result,
            variants,
        })
    }

    fn validate(
        &self,
        params: &TaxCalculationParams,
    ) -> Result<(), ValidationError> {
        if params.gross_income < Decimal::ZERO {
            return Err(ValidationError::NegativeGrossIncome(params.gross_income));
        }
        if !self.config.supports_year(params.year) {
            return Err(ValidationError::YearOutOfRange {
                year: params.year,
                min: self.config.min_year,
                max: self.config.max_year,
            });
        }
        if let Some(dependents) = params.dependents.filter(|d| *d < 0) {
            return Err(ValidationError::NegativeDependents(dependents));
        }
        Ok(())
    }

    fn select_regime<'a>(
        &self,
        strategy: &'a JurisdictionStrategy,
        params: &TaxCalculationParams,
        annotations: &mut Vec<Annotation>,
    ) -> Result<&'a RegimeProfile, ValidationError> {
        let profile = strategy.profile();
        let Some(requested) = params.regime.as_deref() else {
            return Ok(profile.default_regime());
        };

        if let Some(regime) = profile.regime(requested) {
            return Ok(regime);
        }

        if profile.offers_regime_choice() {
            return Err(ValidationError::UnknownRegime {
                jurisdiction: profile.key.clone(),
                regime: requested.to_string(),
                available: profile.regime_names().join(", "),
            });
        }

        warn!(
            jurisdiction = %profile.key,
            regime = requested,
            "Jurisdiction has no regime choice; ignoring requested regime"
        );
        annotations.push(Annotation::new(
            AnnotationKind::RegimeIgnored,
            format!("{} has no regime '{requested}'; its only rules applied", profile.key),
        ));
        Ok(profile.default_regime())
    }

    /// Non-refundable credits are limited to income tax (bracket tax plus
    /// surtaxes), in rule order. Refundable credits apply in full where the
    /// jurisdiction allows negative tax, otherwise down to the tax floor.
    fn apply_credits(
        &self,
        credits: &[ResolvedCredit],
        income_tax: Money,
        before_credits: Money,
        allows_negative_tax: bool,
    ) -> AppliedCredits {
        let mut items = Vec::new();
        let mut annotations = Vec::new();
        let mut remaining_income_tax = non_negative(income_tax);
        let mut total = Decimal::ZERO;

        for credit in credits.iter().filter(|c| !c.refundable) {
            let applied = credit.amount.min(remaining_income_tax);
            if applied < credit.amount {
                annotations.push(Annotation::new(
                    AnnotationKind::CreditsLimited,
                    format!(
                        "{} limited to {applied} of remaining income tax",
                        credit.name
                    ),
                ));
            }
            remaining_income_tax -= applied;
            total += applied;
            items.push(NamedAmount::new(credit.name.clone(), applied));
        }

        for credit in credits.iter().filter(|c| c.refundable) {
            let applied = if allows_negative_tax {
                credit.amount
            } else {
                let headroom = non_negative(before_credits - total - self.config.tax_floor);
                credit.amount.min(headroom)
            };
            if applied < credit.amount {
                annotations.push(Annotation::new(
                    AnnotationKind::CreditsLimited,
                    format!("{} limited to {applied} by the tax floor", credit.name),
                ));
            }
            total += applied;
            items.push(NamedAmount::new(credit.name.clone(), applied));
        }

        items.retain(|item| !item.amount.is_zero());

        AppliedCredits {
            items,
            total,
            annotations,
        }
    }
}
