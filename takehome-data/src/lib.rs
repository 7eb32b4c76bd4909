//! Table-driven jurisdictions loaded from CSV.

mod loader;

pub use loader::{ProfileLoader, ProfileLoaderError, ProfileRecord};
