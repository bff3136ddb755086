//! Twelve-month seasonality profiles

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// Names of the built-in profiles
pub const BUILTIN_PROFILES: [&str; 4] = ["none", "retail", "summer", "festival"];

/// Monthly multipliers applied cyclically by period position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalityProfile {
    pub name: String,
    /// Multipliers for calendar-month positions 1-12
    multipliers: [f64; 12],
}

impl SeasonalityProfile {
    /// Flat profile (all 1.0)
    pub fn none() -> Self {
        Self {
            name: "none".to_string(),
            multipliers: [1.0; 12],
        }
    }

    /// Year-end retail peak
    pub fn retail() -> Self {
        Self {
            name: "retail".to_string(),
            multipliers: [0.9, 0.85, 0.9, 0.95, 1.0, 1.05, 1.1, 1.05, 1.0, 1.1, 1.2, 1.3],
        }
    }

    /// Mid-year peak, winter trough
    pub fn summer() -> Self {
        Self {
            name: "summer".to_string(),
            multipliers: [0.8, 0.85, 0.9, 1.0, 1.1, 1.2, 1.3, 1.2, 1.0, 0.9, 0.85, 0.8],
        }
    }

    /// Oct-Dec festival peak with a lean Feb-Apr
    pub fn festival() -> Self {
        Self {
            name: "festival".to_string(),
            multipliers: [1.0, 0.8, 0.8, 0.8, 1.0, 1.0, 1.0, 1.0, 1.0, 1.2, 1.2, 1.2],
        }
    }

    /// Look up a built-in profile by name (case-insensitive)
    pub fn named(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::none()),
            "retail" => Ok(Self::retail()),
            "summer" => Ok(Self::summer()),
            "festival" => Ok(Self::festival()),
            _ => Err(ProjectionError::UnknownSeasonality {
                name: name.to_string(),
            }),
        }
    }

    /// Build a custom profile from exactly twelve positive multipliers
    pub fn custom(name: &str, multipliers: &[f64]) -> Result<Self> {
        let multipliers: [f64; 12] = multipliers.try_into().map_err(|_| {
            ProjectionError::InvalidSeasonality {
                reason: format!("expected 12 multipliers, got {}", multipliers.len()),
            }
        })?;

        if let Some(bad) = multipliers.iter().find(|m| !m.is_finite() || **m <= 0.0) {
            return Err(ProjectionError::InvalidSeasonality {
                reason: format!("multiplier {} must be a positive number", bad),
            });
        }

        Ok(Self {
            name: name.to_string(),
            multipliers,
        })
    }

    /// Multiplier for a 1-based period index: position `(index - 1) mod 12`
    pub fn factor(&self, period_index: u32) -> f64 {
        let idx = (period_index.saturating_sub(1) % 12) as usize;
        self.multipliers[idx]
    }

    pub fn multipliers(&self) -> &[f64; 12] {
        &self.multipliers
    }

    pub fn is_flat(&self) -> bool {
        self.multipliers.iter().all(|&m| m == 1.0)
    }
}

impl Default for SeasonalityProfile {
    fn default() -> Self {
        Self::none()
    }
}
