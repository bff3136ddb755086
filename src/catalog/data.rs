//! Segment records offered by a market

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};

/// A priced, costed transaction service offered in one country
///
/// Prices and costs are in the country's local currency. Cost above price is
/// allowed; negative margins must flow through the projection untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Owning country key (filled from the catalog key when loaded from JSON)
    #[serde(default)]
    pub country: String,

    pub name: String,

    /// Category tag, e.g. "authentication", "kyc"
    #[serde(default)]
    pub category: String,

    /// Market label, e.g. "Financial Services"
    #[serde(default)]
    pub market: String,

    /// Price per transaction (local currency)
    #[serde(rename = "price")]
    pub price_per_transaction: f64,

    /// Cost per transaction (local currency)
    #[serde(rename = "cost")]
    pub cost_per_transaction: f64,

    /// Base monthly transaction volume
    #[serde(rename = "volume")]
    pub monthly_volume: f64,

    /// Monthly volume growth in percent (may be negative)
    #[serde(rename = "growth")]
    pub volume_growth: f64,

    #[serde(default)]
    pub description: String,
}

impl Segment {
    pub fn new(
        country: &str,
        name: &str,
        price_per_transaction: f64,
        cost_per_transaction: f64,
        monthly_volume: f64,
        volume_growth: f64,
    ) -> Self {
        Self {
            country: country.to_string(),
            name: name.to_string(),
            category: String::new(),
            market: String::new(),
            price_per_transaction,
            cost_per_transaction,
            monthly_volume,
            volume_growth,
            description: String::new(),
        }
    }

    /// Builder-style category/market tagging
    pub fn tagged(mut self, category: &str, market: &str) -> Self {
        self.category = category.to_string();
        self.market = market.to_string();
        self
    }

    /// Monthly growth multiplier, e.g. 1.10 for 10%
    pub fn growth_multiplier(&self) -> f64 {
        1.0 + self.volume_growth / 100.0
    }

    /// Unit margin in local currency (negative when cost exceeds price)
    pub fn unit_margin(&self) -> f64 {
        self.price_per_transaction - self.cost_per_transaction
    }

    /// Reject values the engine cannot compound meaningfully
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("price", self.price_per_transaction),
            ("cost", self.cost_per_transaction),
            ("volume", self.monthly_volume),
            ("growth", self.volume_growth),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(self.invalid(format!("{} is not a finite number", field)));
            }
        }

        if self.price_per_transaction < 0.0 {
            return Err(self.invalid("price cannot be negative".to_string()));
        }
        if self.cost_per_transaction < 0.0 {
            return Err(self.invalid("cost cannot be negative".to_string()));
        }
        if self.monthly_volume < 0.0 {
            return Err(self.invalid("volume cannot be negative".to_string()));
        }
        // Below -100% the growth base turns negative and fractional powers become NaN
        if self.volume_growth < -100.0 {
            return Err(self.invalid("growth cannot be below -100%".to_string()));
        }

        Ok(())
    }

    fn invalid(&self, reason: String) -> ProjectionError {
        ProjectionError::InvalidSegment {
            country: self.country.clone(),
            segment: self.name.clone(),
            reason,
        }
    }
}

/// Quick statistics over one country's catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub segment_count: usize,
    pub average_price: f64,
    pub total_base_volume: f64,
}

impl CatalogStats {
    pub fn from_segments(segments: &[Segment]) -> Self {
        let segment_count = segments.len();
        let total_price: f64 = segments.iter().map(|s| s.price_per_transaction).sum();
        let average_price = if segment_count > 0 {
            total_price / segment_count as f64
        } else {
            0.0
        };

        Self {
            segment_count,
            average_price,
            total_base_volume: segments.iter().map(|s| s.monthly_volume).sum(),
        }
    }
}
