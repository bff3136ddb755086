//! Running state carried between periods of one projection

/// State of a projection between periods
///
/// Cumulative revenue is a prefix sum, so periods must be fed in index order.
#[derive(Debug, Clone, Default)]
pub struct ProjectionState {
    /// Index of the last period accumulated (0 before the first period)
    pub period_index: u32,

    /// Revenue to date in local currency
    pub cumulative_revenue_local: f64,

    /// Revenue to date in reporting currency
    pub cumulative_revenue_reporting: f64,
}

impl ProjectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one period's revenue into the running totals
    ///
    /// Returns the cumulative (local, reporting) revenue including this period.
    pub fn accumulate(&mut self, period_index: u32, revenue_local: f64, revenue_reporting: f64) -> (f64, f64) {
        debug_assert!(
            period_index > self.period_index,
            "periods must be accumulated in index order"
        );
        self.period_index = period_index;
        self.cumulative_revenue_local += revenue_local;
        self.cumulative_revenue_reporting += revenue_reporting;
        (self.cumulative_revenue_local, self.cumulative_revenue_reporting)
    }
}
