//! End-to-end calculations through the public API, including profiles
//! registered from data rather than built in.

use std::thread;

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use takehome_core::calculations::{ContributionRule, CreditBasis, CreditRule};
use takehome_core::{
    AnnotationKind, BracketTable, Coverage, EngineConfig, JurisdictionProfile, JurisdictionStrategy,
    ParamsOverride, RegimeProfile, RegistryBuilder, ScenarioVariant, TaxCalculationParams,
    TaxEngine,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("takehome_core=debug")
        .with_test_writer()
        .try_init();
}

fn profile(
    key: &str,
    regime: RegimeProfile,
) -> JurisdictionProfile {
    JurisdictionProfile::new(key.parse().unwrap(), key, "XTS", Some(2025), vec![regime]).unwrap()
}

fn engine_with(
    config: EngineConfig,
    profiles: Vec<JurisdictionProfile>,
) -> TaxEngine {
    let mut builder = RegistryBuilder::new();
    for profile in profiles {
        builder.register(JurisdictionStrategy::TableDriven(profile)).unwrap();
    }
    TaxEngine::new(config, builder).unwrap()
}

fn ten_twenty() -> RegimeProfile {
    let table =
        BracketTable::progressive("income tax", &[(dec!(0), dec!(0.10)), (dec!(10000), dec!(0.20))])
            .unwrap();
    RegimeProfile::new("standard", vec![table])
}

// =============================================================================
// Reference scenarios
// =============================================================================

#[test]
fn two_bracket_table_at_50k() {
    init_tracing();
    let engine = engine_with(EngineConfig::default(), vec![profile("XT", ten_twenty())]);
    let params = TaxCalculationParams::new(dec!(50000), "XT".parse().unwrap(), 2025);

    let result = engine.calculate_tax(&params).unwrap();

    assert_eq!(result.bracket_tax(), dec!(9000.00));
    assert_eq!(result.total_tax, dec!(9000.00));
    assert_eq!(result.take_home_pay, dec!(41000.00));
    assert_eq!(result.effective_rate, dec!(0.18));
    assert_eq!(result.marginal_rate, dec!(0.20));
    assert_eq!(result.brackets.len(), 2);
    assert_eq!(result.coverage, Coverage::Exact);
    assert!(!result.is_estimate);
}

#[test]
fn capped_contribution_at_80k() {
    let zero = BracketTable::flat("income tax", dec!(0)).unwrap();
    let regime = RegimeProfile::new("standard", vec![zero])
        .with_contribution(ContributionRule::flat("pension", dec!(0.06)).capped_at(dec!(60000)));
    let engine = engine_with(EngineConfig::default(), vec![profile("XT", regime)]);
    let params = TaxCalculationParams::new(dec!(80000), "XT".parse().unwrap(), 2025);

    let result = engine.calculate_tax(&params).unwrap();

    assert_eq!(result.payroll_contributions[0].amount, dec!(3600.00));
    assert_eq!(result.total_tax, dec!(3600.00));
}

// =============================================================================
// Tax floor
// =============================================================================

fn with_refundable_credit() -> RegimeProfile {
    let table = BracketTable::flat("income tax", dec!(0.10)).unwrap();
    RegimeProfile::new("standard", vec![table]).with_credit(
        CreditRule::new("work bonus", CreditBasis::Fixed { amount: dec!(1000) }).refundable(),
    )
}

#[test]
fn refundable_credit_stops_at_zero_by_default() {
    let engine = engine_with(EngineConfig::default(), vec![profile("XT", with_refundable_credit())]);
    let params = TaxCalculationParams::new(dec!(5000), "XT".parse().unwrap(), 2025);

    let result = engine.calculate_tax(&params).unwrap();

    assert_eq!(result.total_tax, dec!(0));
    assert_eq!(result.credits.total, dec!(500.00));
    assert!(result.has_annotation(AnnotationKind::CreditsLimited));
}

#[test]
fn configured_floor_lets_tax_go_negative() {
    let config = EngineConfig {
        tax_floor: dec!(-200),
        ..EngineConfig::default()
    };
    let engine = engine_with(config, vec![profile("XT", with_refundable_credit())]);
    let params = TaxCalculationParams::new(dec!(5000), "XT".parse().unwrap(), 2025);

    let result = engine.calculate_tax(&params).unwrap();

    assert_eq!(result.total_tax, dec!(-200.00));
    assert_eq!(result.take_home_pay, dec!(5200.00));
}

#[test]
fn jurisdiction_allowing_negative_tax_applies_full_credit() {
    let profile = profile("XT", with_refundable_credit()).allowing_negative_tax();
    let engine = engine_with(EngineConfig::default(), vec![profile]);
    let params = TaxCalculationParams::new(dec!(5000), "XT".parse().unwrap(), 2025);

    let result = engine.calculate_tax(&params).unwrap();

    assert_eq!(result.total_tax, dec!(-500.00));
    assert!(!result.has_annotation(AnnotationKind::CreditsLimited));
}

// =============================================================================
// Scenario comparison
// =============================================================================

#[test]
fn regime_comparison_for_indian_salary() {
    let engine = TaxEngine::with_built_ins(EngineConfig::default()).unwrap();
    let base = TaxCalculationParams::new(dec!(1800000), "IN".parse().unwrap(), 2025);
    let variants = vec![ScenarioVariant {
        name: "old regime".to_string(),
        overrides: ParamsOverride {
            regime: Some("old".to_string()),
            ..ParamsOverride::default()
        },
    }];

    let comparison = engine.compare_scenarios(&base, &variants).unwrap();

    assert_eq!(comparison.base.regime.as_deref(), Some("new"));
    assert_eq!(comparison.variants[0].result.regime.as_deref(), Some("old"));
    // Without itemized deductions the old regime costs more.
    assert!(comparison.variants[0].delta.total_tax > dec!(0));
    assert!(comparison.best_variant().is_none());
}

// =============================================================================
// Concurrency
// =============================================================================

#[test]
fn shared_engine_gives_identical_results_across_threads() {
    let engine = TaxEngine::with_built_ins(EngineConfig::default()).unwrap();
    let requests: Vec<TaxCalculationParams> = ["US-CA", "CA-ON", "GB-SCT", "DE", "FR", "IN", "AU", "JP", "SG", "ZZ"]
        .iter()
        .map(|key| TaxCalculationParams::new(dec!(95000), key.parse().unwrap(), 2025))
        .collect();

    let sequential: Vec<_> = requests
        .iter()
        .map(|params| engine.calculate_tax(params).unwrap())
        .collect();

    let parallel: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = requests
            .iter()
            .map(|params| {
                let engine = &engine;
                scope.spawn(move || engine.calculate_tax(params).unwrap())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(parallel, sequential);
}
