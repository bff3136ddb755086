//! Headline performance indicators over a projection's rows
//!
//! Growth compares the second half-year window (periods 7-12) against the
//! first (periods 1-6). Growth is 0% when either window is empty or the first
//! window has no revenue, and the trend is only `Improving` when a second
//! window exists.

use serde::{Deserialize, Serialize};

use super::rows::{margin, ProjectionRow};

const WINDOW: usize = 6;

/// Direction of the profit margin between the two windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProfitTrend {
    Improving,
    Declining,
}

/// Summary KPIs for one projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceIndicators {
    /// Revenue growth between windows, percent
    pub revenue_growth_pct: f64,
    /// Transaction volume growth between windows, percent
    pub volume_growth_pct: f64,
    pub profit_trend: ProfitTrend,
    /// Total net profit over total revenue, percent
    pub overall_margin_pct: f64,
    pub peak_revenue_period: Option<String>,
    pub break_even_period: Option<String>,
}

/// Compute indicators for rows in period order
pub fn indicators(rows: &[ProjectionRow]) -> PerformanceIndicators {
    let (first, second) = windows(rows);
    let comparable = !second.is_empty();

    let revenue = |w: &[ProjectionRow]| w.iter().map(|r| r.revenue_local).sum::<f64>();
    let volume = |w: &[ProjectionRow]| w.iter().map(|r| r.transaction_volume).sum::<f64>();

    // Without a second window there is nothing to improve on
    let profit_trend = if comparable && mean_margin(second) > mean_margin(first) {
        ProfitTrend::Improving
    } else {
        ProfitTrend::Declining
    };

    let total_revenue: f64 = rows.iter().map(|r| r.revenue_local).sum();
    let total_profit: f64 = rows.iter().map(|r| r.net_profit_local).sum();

    let peak_revenue_period = rows
        .iter()
        .fold(None::<&ProjectionRow>, |best, row| match best {
            Some(b) if b.revenue_local >= row.revenue_local => Some(b),
            _ => Some(row),
        })
        .map(|r| r.period_label.clone());

    let break_even_period = rows
        .iter()
        .find(|r| r.net_profit_local > 0.0)
        .map(|r| r.period_label.clone());

    PerformanceIndicators {
        revenue_growth_pct: if comparable { growth_pct(revenue(first), revenue(second)) } else { 0.0 },
        volume_growth_pct: if comparable { growth_pct(volume(first), volume(second)) } else { 0.0 },
        profit_trend,
        overall_margin_pct: margin(total_profit, total_revenue) * 100.0,
        peak_revenue_period,
        break_even_period,
    }
}

fn windows(rows: &[ProjectionRow]) -> (&[ProjectionRow], &[ProjectionRow]) {
    let first_end = rows.len().min(WINDOW);
    let second_end = rows.len().min(2 * WINDOW);
    (&rows[..first_end], &rows[first_end..second_end])
}

fn growth_pct(before: f64, after: f64) -> f64 {
    if before > 0.0 {
        (after - before) / before * 100.0
    } else {
        0.0
    }
}

fn mean_margin(rows: &[ProjectionRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().map(|r| r.profit_margin).sum::<f64>() / rows.len() as f64
}
