use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};
use serde::Deserialize;
use takehome_core::{ScenarioVariant, TaxCalculationParams};

/// A what-if comparison read from TOML: a `[base]` table of full params and
/// `[[variants]]` entries naming the fields they change.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioFile {
    pub base: TaxCalculationParams,
    #[serde(default)]
    pub variants: Vec<ScenarioVariant>,
}

impl ScenarioFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenarios: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Failed to parse scenarios: {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let file: ScenarioFile = toml::from_str(text)?;
        for (i, variant) in file.variants.iter().enumerate() {
            ensure!(
                !variant.name.trim().is_empty(),
                "variant {} has an empty name",
                i + 1
            );
            if let Some(dup) = file.variants[..i].iter().find(|v| v.name == variant.name) {
                bail!("variant name '{}' is used twice", dup.name);
            }
        }
        Ok(file)
    }
}
