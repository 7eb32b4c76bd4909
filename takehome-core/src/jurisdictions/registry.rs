use std::collections::BTreeMap;

use serde::Serialize;

use super::{Generic, JurisdictionStrategy};
use crate::error::ConfigurationError;
use crate::models::{Coverage, JurisdictionKey, Rate};

/// Collects strategies before the registry is frozen.
///
/// Typical lifetime:
/// 1. Create with `RegistryBuilder::new()` or `with_built_ins()`.
/// 2. Call `register` once per additional jurisdiction.
/// 3. Call `build` to obtain an immutable [`JurisdictionRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    strategies: BTreeMap<JurisdictionKey, JurisdictionStrategy>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A builder holding every built-in jurisdiction.
    pub fn with_built_ins() -> Result<Self, ConfigurationError> {
        let mut builder = Self::new();
        for strategy in JurisdictionStrategy::built_in()? {
            builder.register(strategy)?;
        }
        Ok(builder)
    }

    /// Adds `strategy` under its profile key.
    ///
    /// # Errors
    ///
    /// [`ConfigurationError::DuplicateJurisdiction`] when the key is already
    /// registered; the existing registration is kept. A profile without
    /// regimes or with an empty regime fails as it would in
    /// [`JurisdictionProfile::new`](super::JurisdictionProfile::new).
    pub fn register(
        &mut self,
        strategy: JurisdictionStrategy,
    ) -> Result<&mut Self, ConfigurationError> {
        strategy.profile().validate()?;
        let key = strategy.key().clone();
        if self.strategies.contains_key(&key) {
            return Err(ConfigurationError::DuplicateJurisdiction(key));
        }
        self.strategies.insert(key, strategy);
        Ok(self)
    }

    /// Freezes the registrations; unmatched keys resolve to a flat estimate
    /// at `generic_rate`.
    pub fn build(
        self,
        generic_rate: Rate,
    ) -> Result<JurisdictionRegistry, ConfigurationError> {
        Ok(JurisdictionRegistry {
            strategies: self.strategies,
            generic: JurisdictionStrategy::Generic(Generic::new(generic_rate)?),
        })
    }
}

/// The strategy a key resolved to and how closely it matched.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub strategy: &'a JurisdictionStrategy,
    pub coverage: Coverage,
}

/// One registered jurisdiction, for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JurisdictionSummary {
    pub key: JurisdictionKey,
    pub name: String,
    pub currency: String,
    pub tax_year: Option<i32>,
    pub regimes: Vec<String>,
    pub simplifications: Vec<String>,
}

/// Immutable map from jurisdiction key to strategy.
#[derive(Debug, Clone)]
pub struct JurisdictionRegistry {
    strategies: BTreeMap<JurisdictionKey, JurisdictionStrategy>,
    generic: JurisdictionStrategy,
}

impl JurisdictionRegistry {
    /// Every built-in jurisdiction with the given Generic rate.
    pub fn built_in(generic_rate: Rate) -> Result<Self, ConfigurationError> {
        RegistryBuilder::with_built_ins()?.build(generic_rate)
    }

    /// Exact key first, then the country without its subdivision, then the
    /// Generic estimate.
    pub fn resolve(
        &self,
        key: &JurisdictionKey,
    ) -> Resolution<'_> {
        if let Some(strategy) = self.strategies.get(key) {
            return Resolution {
                strategy,
                coverage: Coverage::Exact,
            };
        }

        if key.state().is_some() {
            if let Some(strategy) = self.strategies.get(&key.country_level()) {
                return Resolution {
                    strategy,
                    coverage: Coverage::CountryLevel,
                };
            }
        }

        Resolution {
            strategy: &self.generic,
            coverage: Coverage::Generic,
        }
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &JurisdictionKey> {
        self.strategies.keys()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn describe(&self) -> Vec<JurisdictionSummary> {
        self.strategies
            .values()
            .map(|strategy| {
                let profile = strategy.profile();
                JurisdictionSummary {
                    key: profile.key.clone(),
                    name: profile.name.clone(),
                    currency: profile.currency.clone(),
                    tax_year: profile.tax_year,
                    regimes: profile.regime_names().into_iter().map(str::to_string).collect(),
                    simplifications: profile.simplifications.clone(),
                }
            })
            .collect()
    }
}
