//! Multi-jurisdiction income tax and take-home pay engine.
//!
//! Start with [`TaxEngine`]: build one from an [`EngineConfig`], then call
//! [`TaxEngine::calculate_tax`] with a [`TaxCalculationParams`]. Every amount
//! is computed in the jurisdiction's own currency.

pub mod calculations;
pub mod config;
pub mod engine;
pub mod error;
pub mod jurisdictions;
pub mod models;

pub use config::EngineConfig;
pub use engine::TaxEngine;
pub use error::{BracketDefect, ConfigurationError, TaxError, ValidationError};
pub use jurisdictions::{
    JurisdictionProfile, JurisdictionRegistry, JurisdictionStrategy, JurisdictionSummary,
    RegimeProfile, RegistryBuilder,
};
pub use models::*;
