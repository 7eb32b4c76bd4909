mod commands;
mod config;
mod logging;
mod output;
mod scenario;

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use takehome_core::{RegistryBuilder, TaxEngine};
use takehome_data::ProfileLoader;
use tracing::{debug, warn};

use commands::{CalcArgs, CompareArgs};
use output::OutputFormat;

/// Income tax and take-home pay across jurisdictions.
///
/// Amounts are in the jurisdiction's own currency. Results for jurisdictions
/// without registered rules are flat estimates and are marked as such.
#[derive(Parser, Debug)]
#[command(name = "takehome")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Engine settings (TOML): min_year, max_year, generic_rate, tax_floor
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Extra table-driven jurisdictions (CSV)
    #[arg(short, long, global = true)]
    brackets: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    format: OutputFormat,

    /// Write results as flat CSV records to this file
    #[arg(short, long, global = true)]
    export: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "takehome_core=trace" (default: RUST_LOG, then info)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate tax and take-home pay for one income
    Calc(CalcArgs),
    /// Compare a base scenario against named variants
    Compare(CompareArgs),
    /// List registered jurisdictions
    Jurisdictions,
}

fn build_engine(
    config: Option<&Path>,
    brackets: Option<&Path>,
) -> Result<TaxEngine> {
    let config = config::load_engine_config(config)?;
    let mut builder =
        RegistryBuilder::with_built_ins().context("Failed to register built-in jurisdictions")?;

    if let Some(path) = brackets {
        let file = File::open(path)
            .with_context(|| format!("Failed to open: {}", path.display()))?;
        let profiles = ProfileLoader::load(file)
            .with_context(|| format!("Failed to load jurisdictions from: {}", path.display()))?;
        ProfileLoader::register(&mut builder, profiles)
            .with_context(|| format!("Failed to register jurisdictions from: {}", path.display()))?;
    }

    let engine = TaxEngine::new(config, builder).context("Invalid engine configuration")?;
    debug!(jurisdictions = engine.registry().len(), "Engine ready");
    Ok(engine)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref())?;

    let engine = build_engine(cli.config.as_deref(), cli.brackets.as_deref())?;

    let output = match &cli.command {
        Command::Calc(args) => commands::run_calc(&engine, args)?,
        Command::Compare(args) => {
            commands::run_compare(&engine, args, cli.format != OutputFormat::Json)?
        }
        Command::Jurisdictions => commands::run_jurisdictions(&engine)?,
    };

    println!("{}", output::render(cli.format, &output.value)?);

    if let Some(path) = &cli.export {
        if output.records.is_empty() {
            warn!(path = %path.display(), "Nothing to export");
        } else {
            output::export::export_records(path, &output.records)?;
        }
    }

    Ok(())
}
