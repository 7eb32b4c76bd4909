use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]{2})(?:[-_:]([A-Za-z0-9]{1,3}))?$").expect("static pattern compiles")
});

/// Identifies a jurisdiction: an ISO 3166-1 alpha-2 country code plus an
/// optional subdivision (state, province, nation).
///
/// Keys are normalised to upper case and written as `US` or `US-CA`.
///
/// ```
/// use takehome_core::JurisdictionKey;
///
/// let key: JurisdictionKey = "us_ca".parse().unwrap();
/// assert_eq!(key.to_string(), "US-CA");
/// assert_eq!(key.country_level().to_string(), "US");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JurisdictionKey {
    country: String,
    state: Option<String>,
}

impl JurisdictionKey {
    /// Builds a key from parts known to be well formed.
    pub(crate) fn from_static(
        country: &'static str,
        state: Option<&'static str>,
    ) -> Self {
        Self {
            country: country.to_ascii_uppercase(),
            state: state.map(str::to_ascii_uppercase),
        }
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    /// The same key without its subdivision.
    pub fn country_level(&self) -> Self {
        Self {
            country: self.country.clone(),
            state: None,
        }
    }

    /// Key of the Generic fallback, reported when no registration matches.
    pub fn generic() -> Self {
        Self::from_static("XX", None)
    }
}

impl FromStr for JurisdictionKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = KEY_PATTERN
            .captures(s.trim())
            .ok_or_else(|| ValidationError::InvalidJurisdictionKey(s.to_string()))?;

        let mut country = captures[1].to_ascii_uppercase();
        if country == "UK" {
            country = "GB".to_string();
        }
        let state = captures.get(2).map(|m| m.as_str().to_ascii_uppercase());

        Ok(Self { country, state })
    }
}

impl TryFrom<String> for JurisdictionKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<JurisdictionKey> for String {
    fn from(key: JurisdictionKey) -> Self {
        key.to_string()
    }
}

impl fmt::Display for JurisdictionKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match &self.state {
            Some(state) => write!(f, "{}-{}", self.country, state),
            None => write!(f, "{}", self.country),
        }
    }
}
