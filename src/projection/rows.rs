//! Projection output structures

use serde::{Deserialize, Serialize};

/// One period of projection output for one country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRow {
    // Timing
    pub country: String,
    pub period_index: u32,
    pub period_label: String,
    pub is_daily: bool,

    // Revenue and costs (local currency)
    pub revenue_local: f64,
    pub cogs_local: f64,
    pub gross_profit_local: f64,
    pub opex_local: f64,
    pub net_profit_local: f64,

    // Reporting currency
    pub revenue_reporting: f64,
    pub cogs_reporting: f64,
    pub opex_reporting: f64,
    pub net_profit_reporting: f64,

    /// Net profit / revenue as a fraction; 0 when revenue is 0
    pub profit_margin: f64,
    pub transaction_volume: f64,

    // Factors applied
    pub seasonality_factor: f64,
    pub growth_factor: f64,

    // Running totals
    pub cumulative_revenue_local: f64,
    pub cumulative_revenue_reporting: f64,
}

impl ProjectionRow {
    /// Create a zeroed row for a period
    pub fn new(country: &str, period_index: u32, period_label: &str, is_daily: bool) -> Self {
        Self {
            country: country.to_string(),
            period_index,
            period_label: period_label.to_string(),
            is_daily,
            revenue_local: 0.0,
            cogs_local: 0.0,
            gross_profit_local: 0.0,
            opex_local: 0.0,
            net_profit_local: 0.0,
            revenue_reporting: 0.0,
            cogs_reporting: 0.0,
            opex_reporting: 0.0,
            net_profit_reporting: 0.0,
            profit_margin: 0.0,
            transaction_volume: 0.0,
            seasonality_factor: 1.0,
            growth_factor: 1.0,
            cumulative_revenue_local: 0.0,
            cumulative_revenue_reporting: 0.0,
        }
    }
}

/// One segment's contribution in one period (local currency)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentPeriod {
    pub period_index: u32,
    pub volume: f64,
    pub revenue: f64,
    pub cost: f64,
    pub gross_profit: f64,
    /// Gross margin as a fraction; 0 when revenue is 0
    pub margin: f64,
}

impl SegmentPeriod {
    pub fn new(period_index: u32, volume: f64, revenue: f64, cost: f64) -> Self {
        let gross_profit = revenue - cost;
        Self {
            period_index,
            volume,
            revenue,
            cost,
            gross_profit,
            margin: margin(gross_profit, revenue),
        }
    }
}

/// Per-period breakdown for one segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentProjection {
    pub name: String,
    pub category: String,
    pub market: String,
    pub periods: Vec<SegmentPeriod>,
}

impl SegmentProjection {
    pub fn totals(&self) -> SegmentTotals {
        let revenue: f64 = self.periods.iter().map(|p| p.revenue).sum();
        let cost: f64 = self.periods.iter().map(|p| p.cost).sum();
        let volume: f64 = self.periods.iter().map(|p| p.volume).sum();

        SegmentTotals {
            name: self.name.clone(),
            volume,
            revenue,
            cost,
            gross_profit: revenue - cost,
            margin: margin(revenue - cost, revenue),
        }
    }
}

/// Totals for one segment over the whole horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentTotals {
    pub name: String,
    pub volume: f64,
    pub revenue: f64,
    pub cost: f64,
    pub gross_profit: f64,
    pub margin: f64,
}

/// Complete projection for one (country, scenario)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub country: String,
    pub scenario: String,
    pub currency: String,
    pub exchange_rate: f64,

    /// Period rows in index order
    pub rows: Vec<ProjectionRow>,

    /// Per-segment breakdown, in catalog order
    pub segments: Vec<SegmentProjection>,

    /// Non-fatal conditions met while projecting
    #[serde(default)]
    pub warnings: Vec<ProjectionWarning>,
}

impl ProjectionResult {
    pub fn new(country: &str, scenario: &str, currency: &str, exchange_rate: f64) -> Self {
        Self {
            country: country.to_string(),
            scenario: scenario.to_string(),
            currency: currency.to_string(),
            exchange_rate,
            rows: Vec::new(),
            segments: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add a projection row
    pub fn add_row(&mut self, row: ProjectionRow) {
        self.rows.push(row);
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_revenue_local: f64 = self.rows.iter().map(|r| r.revenue_local).sum();
        let total_cogs_local: f64 = self.rows.iter().map(|r| r.cogs_local).sum();
        let total_opex_local: f64 = self.rows.iter().map(|r| r.opex_local).sum();
        let total_net_profit_local: f64 = self.rows.iter().map(|r| r.net_profit_local).sum();
        let total_revenue_reporting: f64 = self.rows.iter().map(|r| r.revenue_reporting).sum();
        let total_net_profit_reporting: f64 = self.rows.iter().map(|r| r.net_profit_reporting).sum();
        let total_volume: f64 = self.rows.iter().map(|r| r.transaction_volume).sum();

        let periods = self.rows.len();
        let average_period_revenue_local = if periods > 0 {
            total_revenue_local / periods as f64
        } else {
            0.0
        };

        ProjectionSummary {
            periods: periods as u32,
            total_revenue_local,
            total_cogs_local,
            total_opex_local,
            total_net_profit_local,
            total_revenue_reporting,
            total_net_profit_reporting,
            total_volume,
            average_period_revenue_local,
            average_margin: margin(total_net_profit_local, total_revenue_local),
            final_cumulative_revenue_reporting: self
                .rows
                .last()
                .map(|r| r.cumulative_revenue_reporting)
                .unwrap_or(0.0),
        }
    }
}

/// Conditions that don't stop a projection but leave it degenerate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ProjectionWarning {
    /// The country has no segments; revenue and COGS are zero
    EmptySegmentCatalog { country: String },
}

impl std::fmt::Display for ProjectionWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectionWarning::EmptySegmentCatalog { country } => {
                write!(f, "country '{}' has an empty segment catalog; projecting zero revenue", country)
            }
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub periods: u32,
    pub total_revenue_local: f64,
    pub total_cogs_local: f64,
    pub total_opex_local: f64,
    pub total_net_profit_local: f64,
    pub total_revenue_reporting: f64,
    pub total_net_profit_reporting: f64,
    pub total_volume: f64,
    pub average_period_revenue_local: f64,
    /// Total net profit / total revenue; 0 when revenue is 0
    pub average_margin: f64,
    pub final_cumulative_revenue_reporting: f64,
}

/// Profit over revenue, defined as 0 when there is no revenue
pub fn margin(profit: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        profit / revenue
    } else {
        0.0
    }
}
