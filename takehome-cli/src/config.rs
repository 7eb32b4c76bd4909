use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use takehome_core::EngineConfig;
use tracing::debug;

/// Reads engine settings from a TOML file, or the defaults when no file is
/// given. Missing keys take their default values.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = parse_engine_config(&text)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;

    debug!(path = %path.display(), ?config, "Loaded engine config");
    Ok(config)
}

fn parse_engine_config(text: &str) -> Result<EngineConfig> {
    Ok(toml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn no_path_gives_defaults() {
        let config = load_engine_config(None).unwrap();

        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = parse_engine_config("generic_rate = \"0.25\"\nmax_year = 2027\n").unwrap();

        assert_eq!(config.generic_rate, dec!(0.25));
        assert_eq!(config.max_year, 2027);
        assert_eq!(config.min_year, 2020);
        assert_eq!(config.tax_floor, dec!(0));
    }

    #[test]
    fn negative_floor_parses_from_number() {
        let config = parse_engine_config("tax_floor = -500").unwrap();

        assert_eq!(config.tax_floor, dec!(-500));
    }

    #[test]
    fn unreadable_file_names_the_path() {
        let err = load_engine_config(Some(Path::new("does/not/exist.toml"))).unwrap_err();

        assert!(err.to_string().contains("does/not/exist.toml"));
    }
}
