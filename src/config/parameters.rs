//! Model parameters shared by every projection in a run

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};
use crate::period::Horizon;

/// How operating expenses are charged each period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OpexMode {
    /// Flat amount per month (scaled to a day in daily mode)
    #[default]
    Fixed,
    /// Percentage of the period's revenue
    #[serde(alias = "percentage")]
    PercentOfRevenue,
    /// Fixed amount plus percentage of revenue
    Hybrid,
}

impl std::str::FromStr for OpexMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" => Ok(OpexMode::Fixed),
            "percent-of-revenue" | "percentage" | "percent" => Ok(OpexMode::PercentOfRevenue),
            "hybrid" => Ok(OpexMode::Hybrid),
            other => Err(format!("unknown operating expense mode: {}", other)),
        }
    }
}

/// Where period revenue comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RevenueModel {
    /// Sum of the country's segment contributions
    #[default]
    Segments,
    /// Legacy mode: start revenue grown at the global rate, COGS as a cost percentage
    Simple,
}

/// Run-wide assumptions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Parameters {
    /// Base revenue for the simple model (local currency per month)
    pub start_revenue: f64,

    /// Global monthly growth rate in percent (simple model)
    pub growth_rate: f64,

    /// Horizon length in monthly periods
    pub horizon_periods: i64,

    /// COGS as a percentage of revenue (simple model)
    pub cost_percentage: f64,

    /// Monthly operating expense amount (local currency)
    pub operating_expense: f64,

    pub operating_expense_mode: OpexMode,

    /// Operating expense as a percentage of revenue
    pub operating_expense_percentage: f64,

    /// Seasonality profile name ("none", "retail", "summer", "festival")
    pub seasonality: String,

    pub revenue_model: RevenueModel,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            start_revenue: 0.0,
            growth_rate: 4.0,
            horizon_periods: 12,
            cost_percentage: 35.0,
            operating_expense: 0.0,
            operating_expense_mode: OpexMode::Fixed,
            operating_expense_percentage: 15.0,
            seasonality: "none".to_string(),
            revenue_model: RevenueModel::Segments,
        }
    }
}

impl Parameters {
    /// Horizon implied by `horizon_periods`
    pub fn horizon(&self) -> Result<Horizon> {
        Horizon::from_length(self.horizon_periods)
    }

    /// Operating expense for one period, before the scenario multiplier
    ///
    /// `daily_scale` is 1/30 for daily periods and 1 otherwise; it applies to
    /// the fixed part only since revenue is already daily-scaled.
    pub fn base_opex(&self, local_revenue: f64, daily_scale: f64) -> f64 {
        let fixed = self.operating_expense * daily_scale;
        let variable = local_revenue * self.operating_expense_percentage / 100.0;

        match self.operating_expense_mode {
            OpexMode::Fixed => fixed,
            OpexMode::PercentOfRevenue => variable,
            OpexMode::Hybrid => fixed + variable,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.horizon()?;

        let numeric = [
            ("startRevenue", self.start_revenue),
            ("growthRate", self.growth_rate),
            ("costPercentage", self.cost_percentage),
            ("operatingExpense", self.operating_expense),
            ("operatingExpensePercentage", self.operating_expense_percentage),
        ];
        for (name, value) in numeric {
            if !value.is_finite() {
                return Err(invalid_parameter(name, format!("must be finite, got {}", value)));
            }
        }

        if self.growth_rate < -100.0 {
            return Err(invalid_parameter(
                "growthRate",
                format!("must be at least -100, got {}", self.growth_rate),
            ));
        }
        if self.start_revenue < 0.0 {
            return Err(invalid_parameter(
                "startRevenue",
                format!("must not be negative, got {}", self.start_revenue),
            ));
        }
        Ok(())
    }
}

fn invalid_parameter(name: &str, reason: String) -> ProjectionError {
    ProjectionError::InvalidParameter {
        name: name.to_string(),
        reason,
    }
}
