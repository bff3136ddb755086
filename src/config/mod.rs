//! Configuration store: countries, exchange rates, and the segment catalog

mod parameters;
pub mod loader;

pub use parameters::{Parameters, OpexMode, RevenueModel};
pub use loader::DEFAULT_CONFIG_PATH;

use crate::catalog::{CatalogStats, Segment, SegmentLibrary};
use crate::error::{ProjectionError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A market with its local currency
///
/// `exchange_rate` is units of local currency per one reporting-currency unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    /// Unique key (filled from the map key when loaded)
    #[serde(default)]
    pub key: String,
    pub name: String,
    pub currency: String,
    #[serde(default)]
    pub currency_symbol: String,
    pub exchange_rate: f64,
    #[serde(default)]
    pub population: Option<u64>,
}

impl Country {
    pub fn new(key: &str, name: &str, currency: &str, currency_symbol: &str, exchange_rate: f64) -> Self {
        Self {
            key: key.to_string(),
            name: name.to_string(),
            currency: currency.to_string(),
            currency_symbol: currency_symbol.to_string(),
            exchange_rate,
            population: None,
        }
    }

    /// Convert a local-currency amount to the reporting currency
    pub fn to_reporting(&self, local: f64) -> f64 {
        local / self.exchange_rate
    }

    fn validate(&self) -> Result<()> {
        if self.exchange_rate <= 0.0 || !self.exchange_rate.is_finite() {
            return Err(ProjectionError::InvalidExchangeRate {
                country: self.key.clone(),
                rate: self.exchange_rate,
            });
        }
        Ok(())
    }
}

/// Read-only configuration payload consumed by the engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub countries: BTreeMap<String, Country>,

    #[serde(default)]
    pub segment_libraries: SegmentLibrary,
}

impl Configuration {
    /// Build from already-keyed parts, normalising keys onto the records
    pub fn new(countries: Vec<Country>, segments: Vec<Segment>) -> Self {
        let mut config = Self::default();
        for country in countries {
            config.countries.insert(country.key.clone(), country);
        }
        for segment in segments {
            config
                .segment_libraries
                .entry(segment.country.clone())
                .or_default()
                .push(segment);
        }
        config.normalise_keys();
        config
    }

    /// Load configuration from a JSON file
    pub fn from_json_path(path: &Path) -> Result<Self> {
        loader::load_json(path)
    }

    /// Load configuration from any JSON reader
    pub fn from_json_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        loader::load_json_from_reader(reader)
    }

    /// Load from `path`, or fall back to the built-in APAC configuration
    pub fn load_or_fallback(path: &Path) -> Self {
        loader::load_or_fallback(path)
    }

    /// Built-in eight-market configuration with a default catalog
    pub fn fallback() -> Self {
        loader::fallback_config()
    }

    /// Replace the segment catalog (e.g., with one loaded from CSV)
    pub fn with_segment_library(mut self, library: SegmentLibrary) -> Self {
        self.segment_libraries = library;
        self.normalise_keys();
        self
    }

    /// Look up a country by key
    pub fn country(&self, key: &str) -> Result<&Country> {
        self.countries
            .get(key)
            .ok_or_else(|| ProjectionError::UnknownCountry {
                country: key.to_string(),
            })
    }

    /// Segments offered in a country (empty if none are configured)
    pub fn segments_for(&self, key: &str) -> &[Segment] {
        self.segment_libraries
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Catalog quick stats for one country
    pub fn catalog_stats(&self, key: &str) -> Result<CatalogStats> {
        self.country(key)?;
        Ok(CatalogStats::from_segments(self.segments_for(key)))
    }

    /// Country keys in stable order
    pub fn country_keys(&self) -> Vec<&str> {
        self.countries.keys().map(String::as_str).collect()
    }

    /// Validate one country and its segments, returning borrowed views
    pub fn resolve(&self, key: &str) -> Result<(&Country, &[Segment])> {
        let country = self.country(key)?;
        country.validate()?;

        let segments = self.segments_for(key);
        for segment in segments {
            segment.validate()?;
        }

        Ok((country, segments))
    }

    /// Validate every country and segment in the store
    pub fn validate(&self) -> Result<()> {
        for key in self.countries.keys() {
            self.resolve(key)?;
        }

        for key in self.segment_libraries.keys() {
            if !self.countries.contains_key(key) {
                log::warn!("Segment catalog references unknown country '{}'", key);
            }
        }

        Ok(())
    }

    /// Copy map keys onto the records they index
    pub(crate) fn normalise_keys(&mut self) {
        for (key, country) in self.countries.iter_mut() {
            country.key = key.clone();
        }
        for (key, segments) in self.segment_libraries.iter_mut() {
            for segment in segments.iter_mut() {
                segment.country = key.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_country() {
        let config = Configuration::fallback();
        let err = config.country("mars").unwrap_err();
        assert!(matches!(err, ProjectionError::UnknownCountry { ref country } if country == "mars"));
    }

    #[test]
    fn test_invalid_exchange_rate() {
        let config = Configuration::new(
            vec![Country::new("atlantis", "Atlantis", "ATL", "A", 0.0)],
            vec![],
        );
        let err = config.resolve("atlantis").unwrap_err();
        assert!(matches!(err, ProjectionError::InvalidExchangeRate { .. }));
    }

    #[test]
    fn test_new_normalises_segment_keys() {
        let config = Configuration::new(
            vec![Country::new("japan", "Japan", "JPY", "¥", 149.0)],
            vec![Segment::new("japan", "Auth", 10.0, 3.0, 1000.0, 2.0)],
        );
        assert_eq!(config.segments_for("japan").len(), 1);
        assert!(config.segments_for("korea").is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_to_reporting() {
        let country = Country::new("singapore", "Singapore", "SGD", "S$", 1.35);
        assert!((country.to_reporting(135.0) - 100.0).abs() < 1e-9);
    }
}
