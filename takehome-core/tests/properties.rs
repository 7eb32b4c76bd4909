//! Properties every registered jurisdiction must satisfy.

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use takehome_core::calculations::{BracketCalculator, ContributionRule, PayrollContributionCalculator};
use takehome_core::{
    AnnotationKind, BracketTable, Coverage, EngineConfig, JurisdictionKey, Money,
    TaxCalculationParams, TaxCalculationResult, TaxEngine,
};

fn engine() -> TaxEngine {
    TaxEngine::with_built_ins(EngineConfig::default()).unwrap()
}

fn calculate(
    engine: &TaxEngine,
    key: &JurisdictionKey,
    gross: Money,
) -> TaxCalculationResult {
    let params = TaxCalculationParams::new(gross, key.clone(), 2025);
    engine
        .calculate_tax(&params)
        .unwrap_or_else(|e| panic!("{key} at {gross}: {e}"))
}

/// Step between sampled incomes, in the jurisdiction's currency.
fn step_for(key: &JurisdictionKey) -> Money {
    match key.country() {
        "JP" => dec!(250000),
        _ => dec!(2500),
    }
}

// =============================================================================
// Monotonicity
// =============================================================================

#[test]
fn more_gross_never_means_less_tax_or_less_take_home() {
    let engine = engine();

    let keys: Vec<JurisdictionKey> = engine.registry().keys().cloned().collect();

    for key in keys {
        let step = step_for(&key);
        let mut previous = calculate(&engine, &key, Decimal::ZERO);

        for i in 1..=160 {
            let gross = step * Decimal::from(i);
            let current = calculate(&engine, &key, gross);

            assert!(
                current.total_tax >= previous.total_tax,
                "{key}: tax fell from {} to {} at {gross}",
                previous.total_tax,
                current.total_tax
            );
            assert!(
                current.take_home_pay >= previous.take_home_pay,
                "{key}: take-home fell from {} to {} at {gross}",
                previous.take_home_pay,
                current.take_home_pay
            );
            previous = current;
        }
    }
}

#[test]
fn indian_take_home_never_falls_across_relief_thresholds() {
    let engine = engine();
    let key: JurisdictionKey = "IN".parse().unwrap();
    // Gross windows around taxable income of 12 lakh (new regime rebate),
    // 5 lakh (old regime rebate) and 50 lakh (first surcharge tier).
    let windows = [
        ("new", dec!(1260000), dec!(1360000)),
        ("old", dec!(540000), dec!(580000)),
        ("new", dec!(5060000), dec!(5260000)),
        ("old", dec!(5035000), dec!(5235000)),
    ];

    for (regime, from, to) in windows {
        let run = |gross: Money| {
            let mut params = TaxCalculationParams::new(gross, key.clone(), 2025);
            params.regime = Some(regime.to_string());
            engine.calculate_tax(&params).unwrap()
        };
        let mut previous = run(from);
        let mut gross = from + dec!(1000);

        while gross <= to {
            let current = run(gross);
            assert!(
                current.take_home_pay >= previous.take_home_pay,
                "{regime}: take-home fell from {} to {} at {gross}",
                previous.take_home_pay,
                current.take_home_pay
            );
            assert!(
                current.total_tax - previous.total_tax <= dec!(1000),
                "{regime}: tax rose from {} to {} at {gross}",
                previous.total_tax,
                current.total_tax
            );
            previous = current;
            gross += dec!(1000);
        }
    }
}

// =============================================================================
// Zero income
// =============================================================================

#[test]
fn zero_income_owes_nothing_everywhere() {
    let engine = engine();
    let mut keys: Vec<JurisdictionKey> = engine.registry().keys().cloned().collect();
    keys.push("ZZ".parse().unwrap());

    for key in keys {
        let result = calculate(&engine, &key, Decimal::ZERO);

        assert_eq!(result.total_tax, Decimal::ZERO, "{key}");
        assert_eq!(result.take_home_pay, Decimal::ZERO, "{key}");
        assert_eq!(result.effective_rate, Decimal::ZERO, "{key}");
        assert!(result.brackets.is_empty(), "{key}");
    }
}

// =============================================================================
// Conservation
// =============================================================================

#[test]
fn total_is_the_sum_of_its_components() {
    let engine = engine();

    for key in engine.registry().keys() {
        let gross = step_for(key) * dec!(40);
        let result = calculate(&engine, key, gross);

        let line_items: Money = result.brackets.iter().map(|b| b.tax).sum();
        assert_eq!(result.bracket_tax(), line_items, "{key}");
        assert_eq!(
            result.total_tax,
            result.bracket_tax() + result.contributions_total() + result.surtaxes_total()
                - result.credits.total,
            "{key}"
        );
        assert_eq!(result.take_home_pay, gross - result.total_tax, "{key}");
        assert_eq!(result.deductions.total, result.deductions.itemized.iter().map(|d| d.amount).sum::<Money>(), "{key}");
    }
}

// =============================================================================
// Boundary continuity
// =============================================================================

#[test]
fn tax_is_continuous_across_a_bracket_boundary() {
    let table =
        BracketTable::progressive("income", &[(dec!(0), dec!(0.10)), (dec!(10000), dec!(0.20))])
            .unwrap();
    let epsilon = dec!(1);

    let below = BracketCalculator::calculate(dec!(10000) - epsilon, &table).tax;
    let at = BracketCalculator::calculate(dec!(10000), &table).tax;
    let above = BracketCalculator::calculate(dec!(10000) + epsilon, &table).tax;

    assert_eq!(at - below, epsilon * dec!(0.10));
    assert_eq!(above - at, epsilon * dec!(0.20));
}

#[test]
fn federal_tax_is_continuous_at_every_us_boundary() {
    let engine = engine();
    let key: JurisdictionKey = "US-TX".parse().unwrap();
    // 15000 standard deduction shifts each bracket bound
    let bounds = [dec!(11925), dec!(48475), dec!(103350), dec!(197300), dec!(250525), dec!(626350)];

    for bound in bounds {
        let gross = bound + dec!(15000);
        let below = calculate(&engine, &key, gross - dec!(1));
        let at = calculate(&engine, &key, gross);
        let above = calculate(&engine, &key, gross + dec!(1));

        let lower_rate = below.marginal_rate;
        let upper_rate = at.marginal_rate;
        assert!(upper_rate > lower_rate, "{bound}");
        assert_eq!(at.bracket_tax() - below.bracket_tax(), lower_rate, "{bound}");
        assert_eq!(above.bracket_tax() - at.bracket_tax(), upper_rate, "{bound}");
    }
}

// =============================================================================
// Cap saturation
// =============================================================================

#[test]
fn capped_contribution_stops_at_wage_base() {
    let rule = ContributionRule::flat("social security", dec!(0.062)).capped_at(dec!(176100));

    let at_cap = PayrollContributionCalculator::calculate(dec!(176100), &[rule.clone()]).unwrap();
    let above_cap = PayrollContributionCalculator::calculate(dec!(500000), &[rule]).unwrap();

    assert_eq!(at_cap[0].amount, dec!(10918.20));
    assert_eq!(above_cap[0].amount, at_cap[0].amount);
}

#[test]
fn engine_reports_saturated_social_security() {
    let engine = engine();
    let key: JurisdictionKey = "US".parse().unwrap();

    let high = calculate(&engine, &key, dec!(300000));
    let higher = calculate(&engine, &key, dec!(400000));

    let social_security = |result: &TaxCalculationResult| {
        result
            .payroll_contributions
            .iter()
            .find(|c| c.name == "Social Security")
            .map(|c| c.amount)
            .unwrap()
    };
    assert_eq!(social_security(&high), dec!(10918.20));
    assert_eq!(social_security(&higher), social_security(&high));
}

// =============================================================================
// Unknown-jurisdiction fallback
// =============================================================================

#[test]
fn unknown_jurisdiction_is_a_flagged_flat_estimate() {
    let engine = engine();

    let result = calculate(&engine, &"ZZ".parse().unwrap(), dec!(80000));

    assert_eq!(result.coverage, Coverage::Generic);
    assert!(result.is_estimate);
    assert!(result.has_annotation(AnnotationKind::CoverageGap));
    assert_eq!(result.brackets.len(), 1);
    assert_eq!(result.total_tax, dec!(16000.00));
    assert_eq!(result.effective_rate, dec!(0.20));
    assert_eq!(result.marginal_rate, dec!(0.20));
}

#[test]
fn generic_rate_comes_from_config() {
    let config = EngineConfig {
        generic_rate: dec!(0.25),
        ..EngineConfig::default()
    };
    let engine = TaxEngine::with_built_ins(config).unwrap();

    let result = calculate(&engine, &"ZZ".parse().unwrap(), dec!(80000));

    assert_eq!(result.total_tax, dec!(20000.00));
}
