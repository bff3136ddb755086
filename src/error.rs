//! Error types for configuration loading and projection runs

use thiserror::Error;

/// Errors surfaced to callers of the projection engine
///
/// All validation happens before the first row is produced, so a failed
/// projection never returns partial output.
#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("unknown country: {country}")]
    UnknownCountry { country: String },

    #[error("invalid exchange rate {rate} for country {country} (must be > 0)")]
    InvalidExchangeRate { country: String, rate: f64 },

    #[error("invalid horizon: {token}")]
    InvalidHorizon { token: String },

    #[error("unknown seasonality profile: {name}")]
    UnknownSeasonality { name: String },

    #[error("invalid seasonality profile: {reason}")]
    InvalidSeasonality { reason: String },

    #[error("unknown scenario: {name}")]
    UnknownScenario { name: String },

    #[error("invalid scenario {name}: {reason}")]
    InvalidScenario { name: String, reason: String },

    #[error("invalid segment {segment} in {country}: {reason}")]
    InvalidSegment {
        country: String,
        segment: String,
        reason: String,
    },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("invalid aggregation bucket size: {bucket_size}")]
    InvalidAggregation { bucket_size: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ProjectionError>;
