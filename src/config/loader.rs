//! JSON configuration loader
//!
//! Loads the country/segment payload from data/model-config.json, with a
//! built-in APAC configuration used when no file is available.

use super::{Configuration, Country};
use crate::catalog::Segment;
use crate::error::Result;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Default path to the configuration payload
pub const DEFAULT_CONFIG_PATH: &str = "data/model-config.json";

/// Reference exchange rate the default catalog prices are quoted against (INR)
const CATALOG_REFERENCE_RATE: f64 = 83.50;

/// Load configuration from a JSON file
pub fn load_json(path: &Path) -> Result<Configuration> {
    let file = File::open(path)?;
    let config = load_json_from_reader(BufReader::new(file))?;
    log::info!(
        "Loaded {} countries from {}",
        config.countries.len(),
        path.display()
    );
    Ok(config)
}

/// Load configuration from any JSON reader
pub fn load_json_from_reader<R: std::io::Read>(reader: R) -> Result<Configuration> {
    let mut config: Configuration = serde_json::from_reader(reader)?;
    config.normalise_keys();
    Ok(config)
}

/// Load from `path`, falling back to the built-in configuration on any error
pub fn load_or_fallback(path: &Path) -> Configuration {
    match load_json(path) {
        Ok(config) => config,
        Err(err) => {
            log::warn!(
                "Could not load {} ({}); using built-in configuration",
                path.display(),
                err
            );
            fallback_config()
        }
    }
}

/// Built-in configuration: eight APAC markets, four segments each
pub fn fallback_config() -> Configuration {
    let countries = vec![
        Country::new("india", "India", "INR", "₹", 83.50),
        Country::new("singapore", "Singapore", "SGD", "S$", 1.35),
        Country::new("australia", "Australia", "AUD", "A$", 1.52),
        Country::new("japan", "Japan", "JPY", "¥", 149.0),
        Country::new("south_korea", "South Korea", "KRW", "₩", 1320.0),
        Country::new("thailand", "Thailand", "THB", "฿", 35.8),
        Country::new("indonesia", "Indonesia", "IDR", "Rp", 15750.0),
        Country::new("philippines", "Philippines", "PHP", "₱", 56.2),
    ];

    let segments = countries
        .iter()
        .flat_map(|country| default_segments(country))
        .collect();

    Configuration::new(countries, segments)
}

/// Default catalog for a country, with INR reference prices rescaled to local currency
fn default_segments(country: &Country) -> Vec<Segment> {
    let fx = country.exchange_rate / CATALOG_REFERENCE_RATE;

    // (name, category, market, price, cost, volume, growth, description)
    let templates = [
        ("Basic Authentication", "authentication", "General", 0.15, 0.05, 10_000_000.0, 8.0, "Basic authentication service"),
        ("eKYC Premium", "kyc", "Financial", 2.50, 0.75, 5_000_000.0, 12.0, "Premium eKYC service"),
        ("Biometric Verification", "biometric", "Government", 0.25, 0.08, 25_000_000.0, 5.0, "Government biometric verification"),
        ("Mobile Authentication", "mobile", "Fintech", 0.50, 0.15, 15_000_000.0, 15.0, "Mobile app authentication"),
    ];

    templates
        .iter()
        .map(|&(name, category, market, price, cost, volume, growth, description)| Segment {
            country: country.key.clone(),
            name: name.to_string(),
            category: category.to_string(),
            market: market.to_string(),
            price_per_transaction: price * fx,
            cost_per_transaction: cost * fx,
            monthly_volume: volume,
            volume_growth: growth,
            description: description.to_string(),
        })
        .collect()
}
