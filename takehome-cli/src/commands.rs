use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use takehome_core::{
    CreditInput, DeductionInput, FilingStatus, FlatResultRecord, JurisdictionKey, Money,
    ScenarioComparison, TaxCalculationParams, TaxCalculationResult, TaxEngine,
};
use tracing::info;

use crate::scenario::ScenarioFile;

/// What a command produced: the value to print and the rows to export.
#[derive(Debug)]
pub struct CommandOutput {
    pub value: Value,
    pub records: Vec<FlatResultRecord>,
}

fn parse_filing_status(s: &str) -> Result<FilingStatus, String> {
    FilingStatus::parse(s).ok_or_else(|| format!("expected one of S, MFJ, MFS, HOH, QSS; got '{s}'"))
}

#[derive(Args, Debug)]
pub struct CalcArgs {
    /// Gross annual income in the jurisdiction's currency
    #[arg(long, allow_negative_numbers = true)]
    pub gross: Money,

    /// Jurisdiction key, e.g. US-CA, GB-SCT, DE
    #[arg(short, long)]
    pub jurisdiction: JurisdictionKey,

    /// Named tax regime where the jurisdiction offers a choice (e.g. IN: new, old)
    #[arg(long)]
    pub regime: Option<String>,

    /// Filing status: S, MFJ, MFS, HOH or QSS
    #[arg(long, value_parser = parse_filing_status)]
    pub filing_status: Option<FilingStatus>,

    #[arg(long, allow_negative_numbers = true)]
    pub dependents: Option<i32>,

    #[arg(short, long, default_value_t = 2025)]
    pub year: i32,

    /// Total itemized deductions
    #[arg(long)]
    pub itemized: Option<Money>,

    /// Pre-tax retirement contributions
    #[arg(long)]
    pub retirement: Option<Money>,

    /// Health savings account contributions
    #[arg(long)]
    pub hsa: Option<Money>,

    #[arg(long)]
    pub student_loan_interest: Option<Money>,

    #[arg(long)]
    pub earned_income_credit: Option<Money>,

    #[arg(long)]
    pub education_credit: Option<Money>,

    #[arg(long)]
    pub other_credit: Option<Money>,
}

impl CalcArgs {
    pub fn to_params(&self) -> TaxCalculationParams {
        let mut params = TaxCalculationParams::new(self.gross, self.jurisdiction.clone(), self.year);
        params.regime = self.regime.clone();
        params.filing_status = self.filing_status;
        params.dependents = self.dependents;

        let deductions = DeductionInput {
            itemized_total: self.itemized,
            retirement_contributions: self.retirement,
            health_savings: self.hsa,
            student_loan_interest: self.student_loan_interest,
            ..DeductionInput::default()
        };
        if deductions != DeductionInput::default() {
            params.deductions = Some(deductions);
        }

        let credits = CreditInput {
            earned_income: self.earned_income_credit,
            education: self.education_credit,
            other: self.other_credit,
            ..CreditInput::default()
        };
        if credits != CreditInput::default() {
            params.credits = Some(credits);
        }

        params
    }
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// TOML file with a [base] scenario and [[variants]]
    #[arg(short, long)]
    pub scenarios: PathBuf,
}

pub fn run_calc(
    engine: &TaxEngine,
    args: &CalcArgs,
) -> Result<CommandOutput> {
    let params = args.to_params();
    let result = engine
        .calculate_tax(&params)
        .with_context(|| format!("Failed to calculate tax for {}", params.jurisdiction))?;

    Ok(CommandOutput {
        value: serde_json::to_value(&result)?,
        records: vec![result.to_flat_record()],
    })
}

/// Runs a scenario file. JSON output carries the full comparison; tabular
/// formats get one summary row per scenario.
pub fn run_compare(
    engine: &TaxEngine,
    args: &CompareArgs,
    summary_only: bool,
) -> Result<CommandOutput> {
    let file = ScenarioFile::load(&args.scenarios)?;
    let comparison = engine
        .compare_scenarios(&file.base, &file.variants)
        .with_context(|| format!("Failed to compare scenarios in {}", args.scenarios.display()))?;

    match comparison.best_variant() {
        Some(best) => info!(
            variant = %best.name,
            take_home_gain = %best.delta.take_home_pay,
            "Best scenario"
        ),
        None => info!("No variant beats the base scenario"),
    }

    let records = std::iter::once(&comparison.base)
        .chain(comparison.variants.iter().map(|v| &v.result))
        .map(TaxCalculationResult::to_flat_record)
        .collect();
    let value = if summary_only {
        comparison_summary(&comparison)
    } else {
        serde_json::to_value(&comparison)?
    };

    Ok(CommandOutput { value, records })
}

fn comparison_summary(comparison: &ScenarioComparison) -> Value {
    let base = &comparison.base;
    let row = |name: &str, result: &TaxCalculationResult, delta: Decimal| {
        json!({
            "scenario": name,
            "regime": result.regime.clone().unwrap_or_default(),
            "total_tax": result.total_tax,
            "take_home_pay": result.take_home_pay,
            "effective_rate": result.effective_rate,
            "take_home_delta": delta,
        })
    };

    let mut rows = vec![row("base", base, Decimal::ZERO)];
    rows.extend(
        comparison
            .variants
            .iter()
            .map(|v| row(&v.name, &v.result, v.delta.take_home_pay)),
    );
    Value::Array(rows)
}

pub fn run_jurisdictions(engine: &TaxEngine) -> Result<CommandOutput> {
    Ok(CommandOutput {
        value: serde_json::to_value(engine.registry().describe())?,
        records: Vec::new(),
    })
}
