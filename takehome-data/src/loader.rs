use std::io::Read;

use rust_decimal::Decimal;
use serde::Deserialize;
use takehome_core::jurisdictions::JurisdictionStrategy;
use takehome_core::{
    BracketTable, ConfigurationError, JurisdictionKey, JurisdictionProfile, RegimeProfile,
    RegistryBuilder, TaxBracket, ValidationError,
};
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur when loading jurisdiction data.
#[derive(Debug, Error)]
pub enum ProfileLoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Jurisdiction {jurisdiction} has conflicting {field}: '{first}' and '{second}'")]
    MixedMetadata {
        jurisdiction: String,
        field: &'static str,
        first: String,
        second: String,
    },

    #[error("Invalid jurisdiction: {0}")]
    InvalidJurisdiction(#[from] ValidationError),

    #[error("Invalid jurisdiction data: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl From<csv::Error> for ProfileLoaderError {
    fn from(err: csv::Error) -> Self {
        ProfileLoaderError::CsvParse(err.to_string())
    }
}

/// A single bracket row from a jurisdictions CSV file.
///
/// - `jurisdiction`: key such as `NZ` or `CH-ZH`
/// - `name`, `currency`, `tax_year`: profile metadata, repeated on every row
///   of the jurisdiction (`tax_year` may be empty)
/// - `table`: bracket table the row belongs to; the first table of a
///   jurisdiction is its primary table
/// - `lower_bound`, `upper_bound`: the bracket range (empty upper bound for
///   unlimited)
/// - `rate`: marginal rate as a decimal (e.g., 0.10 for 10%)
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProfileRecord {
    pub jurisdiction: String,
    pub name: String,
    pub currency: String,
    pub tax_year: Option<i32>,
    pub table: String,
    pub lower_bound: Decimal,
    #[serde(deserialize_with = "deserialize_optional_decimal")]
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Rows of one jurisdiction, grouped by table in file order.
struct ProfileGroup<'a> {
    key: JurisdictionKey,
    first: &'a ProfileRecord,
    tables: Vec<(&'a str, Vec<TaxBracket>)>,
}

impl<'a> ProfileGroup<'a> {
    fn new(
        key: JurisdictionKey,
        first: &'a ProfileRecord,
    ) -> Self {
        Self {
            key,
            first,
            tables: Vec::new(),
        }
    }

    fn push(
        &mut self,
        record: &'a ProfileRecord,
    ) -> Result<(), ProfileLoaderError> {
        let mixed = |field: &'static str, first: String, second: String| {
            Err(ProfileLoaderError::MixedMetadata {
                jurisdiction: self.key.to_string(),
                field,
                first,
                second,
            })
        };
        if record.name != self.first.name {
            return mixed("name", self.first.name.clone(), record.name.clone());
        }
        if record.currency != self.first.currency {
            return mixed("currency", self.first.currency.clone(), record.currency.clone());
        }
        if record.tax_year != self.first.tax_year {
            let year = |y: Option<i32>| y.map(|y| y.to_string()).unwrap_or_default();
            return mixed("tax_year", year(self.first.tax_year), year(record.tax_year));
        }

        let bracket = TaxBracket {
            lower_bound: record.lower_bound,
            upper_bound: record.upper_bound,
            rate: record.rate,
        };
        match self.tables.iter_mut().find(|(name, _)| *name == record.table) {
            Some((_, brackets)) => brackets.push(bracket),
            None => self.tables.push((record.table.as_str(), vec![bracket])),
        }
        Ok(())
    }

    fn into_profile(self) -> Result<JurisdictionProfile, ProfileLoaderError> {
        let tables = self
            .tables
            .into_iter()
            .map(|(name, brackets)| BracketTable::new(name, brackets))
            .collect::<Result<Vec<_>, _>>()?;

        let profile = JurisdictionProfile::new(
            self.key,
            self.first.name.clone(),
            self.first.currency.clone(),
            self.first.tax_year,
            vec![RegimeProfile::new("standard", tables)],
        )?
        .with_simplification(
            "bracket tables only; no deductions or contributions; claimed credits apply as entered",
        );

        Ok(profile)
    }
}

/// Loader for table-driven jurisdictions from CSV files.
///
/// Each jurisdiction in the file becomes a [`JurisdictionProfile`] with one
/// regime holding its bracket tables. Profiles run through the same engine as
/// the built-in jurisdictions once registered.
pub struct ProfileLoader;

impl ProfileLoader {
    /// Parse bracket records from a CSV reader.
    ///
    /// The reader can be any type that implements `Read`, such as a file or a
    /// string slice.
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ProfileRecord>, ProfileLoaderError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ProfileRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Group records into validated profiles, in order of first appearance.
    ///
    /// Fails if a jurisdiction's rows disagree on name, currency or year, or
    /// if any resulting bracket table is malformed.
    pub fn build(records: &[ProfileRecord]) -> Result<Vec<JurisdictionProfile>, ProfileLoaderError> {
        let mut groups: Vec<ProfileGroup<'_>> = Vec::new();

        for record in records {
            let key: JurisdictionKey = record.jurisdiction.parse()?;
            let index = match groups.iter().position(|g| g.key == key) {
                Some(index) => index,
                None => {
                    groups.push(ProfileGroup::new(key, record));
                    groups.len() - 1
                }
            };
            groups[index].push(record)?;
        }

        let profiles = groups
            .into_iter()
            .map(ProfileGroup::into_profile)
            .collect::<Result<Vec<_>, _>>()?;

        for profile in &profiles {
            debug!(
                jurisdiction = %profile.key,
                tables = profile.default_regime().tables.len(),
                "Built table-driven profile"
            );
        }

        Ok(profiles)
    }

    /// Parse and build in one step.
    pub fn load<R: Read>(reader: R) -> Result<Vec<JurisdictionProfile>, ProfileLoaderError> {
        let records = Self::parse(reader)?;
        Self::build(&records)
    }

    /// Register profiles as table-driven jurisdictions.
    ///
    /// Returns the number registered. A key that is already registered
    /// (built in or earlier in the list) is a
    /// [`ConfigurationError::DuplicateJurisdiction`].
    pub fn register(
        builder: &mut RegistryBuilder,
        profiles: Vec<JurisdictionProfile>,
    ) -> Result<usize, ProfileLoaderError> {
        let count = profiles.len();
        for profile in profiles {
            builder.register(JurisdictionStrategy::TableDriven(profile))?;
        }
        info!(count, "Registered table-driven jurisdictions");
        Ok(count)
    }
}
