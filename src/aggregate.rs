//! Roll per-period rows up into yearly (or coarser) summaries

use serde::{Deserialize, Serialize};

use crate::error::{ProjectionError, Result};
use crate::projection::ProjectionRow;

pub const PERIODS_PER_YEAR: usize = 12;

/// Totals for one bucket of consecutive periods
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlySummary {
    /// Calendar label: base year + year offset
    pub year: i32,
    /// 0-based bucket number
    pub year_offset: u32,
    pub country: String,
    pub period_count: u32,
    pub first_period: u32,
    pub last_period: u32,

    pub revenue_local: f64,
    pub cogs_local: f64,
    pub opex_local: f64,
    pub net_profit_local: f64,

    pub revenue_reporting: f64,
    pub cogs_reporting: f64,
    pub opex_reporting: f64,
    pub net_profit_reporting: f64,

    /// Arithmetic mean of the periods' profit margins
    pub avg_profit_margin: f64,
    pub transaction_volume: f64,
}

impl YearlySummary {
    fn from_bucket(year: i32, year_offset: u32, rows: &[ProjectionRow]) -> Self {
        let count = rows.len();

        Self {
            year,
            year_offset,
            country: rows.first().map(|r| r.country.clone()).unwrap_or_default(),
            period_count: count as u32,
            first_period: rows.first().map(|r| r.period_index).unwrap_or(0),
            last_period: rows.last().map(|r| r.period_index).unwrap_or(0),
            revenue_local: total(rows, |r| r.revenue_local),
            cogs_local: total(rows, |r| r.cogs_local),
            opex_local: total(rows, |r| r.opex_local),
            net_profit_local: total(rows, |r| r.net_profit_local),
            revenue_reporting: total(rows, |r| r.revenue_reporting),
            cogs_reporting: total(rows, |r| r.cogs_reporting),
            opex_reporting: total(rows, |r| r.opex_reporting),
            net_profit_reporting: total(rows, |r| r.net_profit_reporting),
            avg_profit_margin: if count > 0 {
                total(rows, |r| r.profit_margin) / count as f64
            } else {
                0.0
            },
            transaction_volume: total(rows, |r| r.transaction_volume),
        }
    }
}

fn total(rows: &[ProjectionRow], field: impl Fn(&ProjectionRow) -> f64) -> f64 {
    rows.iter().map(field).sum()
}

/// Partitions ordered rows into fixed-size buckets
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    bucket_size: usize,
    base_year: i32,
}

impl Aggregator {
    pub fn new(bucket_size: usize, base_year: i32) -> Result<Self> {
        if bucket_size == 0 {
            return Err(ProjectionError::InvalidAggregation { bucket_size });
        }
        Ok(Self {
            bucket_size,
            base_year,
        })
    }

    /// Twelve-period buckets labelled from `base_year`
    pub fn yearly(base_year: i32) -> Self {
        Self {
            bucket_size: PERIODS_PER_YEAR,
            base_year,
        }
    }

    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Summarise rows already in period-index order
    ///
    /// The final bucket is shorter when the row count is not a multiple of
    /// the bucket size.
    pub fn aggregate(&self, rows: &[ProjectionRow]) -> Vec<YearlySummary> {
        rows.chunks(self.bucket_size)
            .enumerate()
            .map(|(offset, bucket)| {
                let offset = offset as u32;
                YearlySummary::from_bucket(self.base_year + offset as i32, offset, bucket)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rows(count: u32) -> Vec<ProjectionRow> {
        (1..=count)
            .map(|i| {
                let mut row = ProjectionRow::new("japan", i, &format!("P{}", i), false);
                row.revenue_local = 1000.0 * i as f64;
                row.revenue_reporting = row.revenue_local / 149.0;
                row.cogs_local = 300.0 * i as f64;
                row.net_profit_local = 700.0 * i as f64 - 100.0;
                row.opex_local = 100.0;
                row.profit_margin = row.net_profit_local / row.revenue_local;
                row.transaction_volume = 10.0;
                row
            })
            .collect()
    }

    #[test]
    fn test_partition_with_partial_final_bucket() {
        let rows = rows(30);
        let summaries = Aggregator::yearly(2025).aggregate(&rows);

        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].year, 2025);
        assert_eq!(summaries[2].year, 2027);
        assert_eq!(summaries[2].year_offset, 2);
        assert_eq!(summaries[2].period_count, 6);
        assert_eq!(summaries[2].first_period, 25);
        assert_eq!(summaries[2].last_period, 30);

        let counted: u32 = summaries.iter().map(|s| s.period_count).sum();
        assert_eq!(counted as usize, rows.len());
    }

    #[test]
    fn test_sums_and_mean_margin() {
        let rows = rows(12);
        let summary = &Aggregator::yearly(2030).aggregate(&rows)[0];

        let revenue: f64 = rows.iter().map(|r| r.revenue_local).sum();
        assert_relative_eq!(summary.revenue_local, revenue);
        assert_relative_eq!(summary.opex_local, 1200.0);
        assert_relative_eq!(summary.transaction_volume, 120.0);

        let mean_margin = rows.iter().map(|r| r.profit_margin).sum::<f64>() / 12.0;
        assert_relative_eq!(summary.avg_profit_margin, mean_margin);
        assert_eq!(summary.country, "japan");
    }

    #[test]
    fn test_custom_bucket_size() {
        let quarterly = Aggregator::new(3, 2025).unwrap();
        assert_eq!(quarterly.aggregate(&rows(12)).len(), 4);
        assert!(matches!(
            Aggregator::new(0, 2025),
            Err(ProjectionError::InvalidAggregation { bucket_size: 0 })
        ));
    }

    #[test]
    fn test_empty_rows() {
        assert!(Aggregator::yearly(2025).aggregate(&[]).is_empty());
    }
}
