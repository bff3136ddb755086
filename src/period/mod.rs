//! Period resolution: horizon tokens to concrete calculation periods

mod seasonality;

pub use seasonality::{SeasonalityProfile, BUILTIN_PROFILES};

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProjectionError, Result};

/// Length of the reference month used for daily compounding and scaling
pub const DAYS_PER_REFERENCE_MONTH: f64 = 30.0;

/// Requested projection length and granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Horizon {
    /// `1M`: one calendar month of daily periods
    Month,
    /// `NY`: N years of monthly periods
    Years(u32),
    /// Explicit number of monthly periods
    Periods(u32),
}

impl Horizon {
    /// Horizon from an explicit period count
    pub fn from_length(length: i64) -> Result<Self> {
        match u32::try_from(length) {
            Ok(n) if n > 0 => Ok(Horizon::Periods(n)),
            _ => Err(ProjectionError::InvalidHorizon {
                token: length.to_string(),
            }),
        }
    }

    pub fn is_daily(&self) -> bool {
        matches!(self, Horizon::Month)
    }

    /// Number of monthly periods, or `None` for the daily horizon
    pub fn monthly_periods(&self) -> Option<u32> {
        match self {
            Horizon::Month => None,
            Horizon::Years(years) => Some(years * 12),
            Horizon::Periods(n) => Some(*n),
        }
    }
}

impl FromStr for Horizon {
    type Err = ProjectionError;

    fn from_str(token: &str) -> Result<Self> {
        let invalid = || ProjectionError::InvalidHorizon {
            token: token.to_string(),
        };
        let trimmed = token.trim().to_ascii_uppercase();

        if trimmed == "1M" {
            return Ok(Horizon::Month);
        }

        if let Some(years) = trimmed.strip_suffix('Y') {
            return match years.parse::<u32>() {
                Ok(n) if n > 0 => Ok(Horizon::Years(n)),
                _ => Err(invalid()),
            };
        }

        match trimmed.parse::<i64>() {
            Ok(n) => Horizon::from_length(n).map_err(|_| invalid()),
            Err(_) => Err(invalid()),
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Horizon::Month => write!(f, "1M"),
            Horizon::Years(n) => write!(f, "{}Y", n),
            Horizon::Periods(n) => write!(f, "{}", n),
        }
    }
}

/// A single calculation period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// 1-based period index
    pub index: u32,

    /// Canonical label ("Jan 05" daily, "2025 Jan" monthly)
    pub label: String,

    pub is_daily: bool,

    /// Calendar date the period starts on
    pub date: NaiveDate,
}

impl Period {
    /// Growth exponent: `n/30` for daily periods, `n-1` for monthly
    pub fn growth_exponent(&self) -> f64 {
        if self.is_daily {
            self.index as f64 / DAYS_PER_REFERENCE_MONTH
        } else {
            self.index as f64 - 1.0
        }
    }

    /// Converts a monthly run rate into this period's rate
    pub fn daily_scale(&self) -> f64 {
        if self.is_daily {
            1.0 / DAYS_PER_REFERENCE_MONTH
        } else {
            1.0
        }
    }
}

/// Maps horizons to period lists relative to a start date
#[derive(Debug, Clone)]
pub struct PeriodResolver {
    start_date: NaiveDate,
}

impl PeriodResolver {
    pub fn new(start_date: NaiveDate) -> Self {
        Self { start_date }
    }

    /// Resolver anchored at today's local date
    pub fn today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Resolve a horizon token such as `1M`, `5Y`, or `18`
    pub fn resolve_token(&self, token: &str) -> Result<Vec<Period>> {
        let horizon: Horizon = token.parse()?;
        self.resolve(&horizon)
    }

    /// Resolve a horizon into its ordered periods
    pub fn resolve(&self, horizon: &Horizon) -> Result<Vec<Period>> {
        match horizon.monthly_periods() {
            None => self.daily_periods(horizon),
            Some(count) => self.monthly_periods(horizon, count),
        }
    }

    fn daily_periods(&self, horizon: &Horizon) -> Result<Vec<Period>> {
        let days = days_in_month(self.start_date).ok_or_else(|| invalid(horizon))?;

        (1..=days)
            .map(|index| -> Result<Period> {
                let date = self
                    .start_date
                    .checked_add_days(Days::new(u64::from(index - 1)))
                    .ok_or_else(|| invalid(horizon))?;
                Ok(Period {
                    index,
                    label: date.format("%b %d").to_string(),
                    is_daily: true,
                    date,
                })
            })
            .collect()
    }

    fn monthly_periods(&self, horizon: &Horizon, count: u32) -> Result<Vec<Period>> {
        let first = self.start_date.with_day(1).ok_or_else(|| invalid(horizon))?;

        (1..=count)
            .map(|index| -> Result<Period> {
                let date = first
                    .checked_add_months(Months::new(index - 1))
                    .ok_or_else(|| invalid(horizon))?;
                Ok(Period {
                    index,
                    label: date.format("%Y %b").to_string(),
                    is_daily: false,
                    date,
                })
            })
            .collect()
    }
}

fn invalid(horizon: &Horizon) -> ProjectionError {
    ProjectionError::InvalidHorizon {
        token: horizon.to_string(),
    }
}

/// Days in the calendar month containing `date`
pub fn days_in_month(date: NaiveDate) -> Option<u32> {
    let first = date.with_day(1)?;
    let next = first.checked_add_months(Months::new(1))?;
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!("1M".parse::<Horizon>().unwrap(), Horizon::Month);
        assert_eq!("1Y".parse::<Horizon>().unwrap(), Horizon::Years(1));
        assert_eq!("10y".parse::<Horizon>().unwrap(), Horizon::Years(10));
        assert_eq!("18".parse::<Horizon>().unwrap(), Horizon::Periods(18));

        for bad in ["3Q", "2M", "0Y", "-4", "", "Y"] {
            assert!(
                matches!(bad.parse::<Horizon>(), Err(ProjectionError::InvalidHorizon { .. })),
                "token {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_from_length() {
        assert_eq!(Horizon::from_length(24).unwrap(), Horizon::Periods(24));
        assert!(Horizon::from_length(-1).is_err());
        assert!(Horizon::from_length(0).is_err());
    }

    #[test]
    fn test_monthly_resolution() {
        let resolver = PeriodResolver::new(date(2025, 11, 17));
        let periods = resolver.resolve_token("2Y").unwrap();

        assert_eq!(periods.len(), 24);
        assert_eq!(periods[0].index, 1);
        assert_eq!(periods[0].label, "2025 Nov");
        assert_eq!(periods[2].label, "2026 Jan");
        assert!(periods.iter().all(|p| !p.is_daily));
        assert_eq!(periods[23].index, 24);
    }

    #[test]
    fn test_daily_resolution_uses_days_in_month() {
        let resolver = PeriodResolver::new(date(2024, 2, 10));
        let periods = resolver.resolve(&Horizon::Month).unwrap();

        assert_eq!(periods.len(), 29);
        assert!(periods.iter().all(|p| p.is_daily));
        assert_eq!(periods[0].label, "Feb 10");
        assert_eq!(periods[28].label, "Mar 09");
    }

    #[test]
    fn test_growth_exponent_asymmetry() {
        let resolver = PeriodResolver::new(date(2025, 6, 1));
        let daily = resolver.resolve(&Horizon::Month).unwrap();
        let monthly = resolver.resolve(&Horizon::Years(1)).unwrap();

        assert_relative_eq!(daily[0].growth_exponent(), 1.0 / 30.0);
        assert_relative_eq!(daily[14].growth_exponent(), 0.5);
        assert_relative_eq!(daily[0].daily_scale(), 1.0 / 30.0);

        assert_eq!(monthly[0].growth_exponent(), 0.0);
        assert_eq!(monthly[1].growth_exponent(), 1.0);
        assert_eq!(monthly[0].daily_scale(), 1.0);
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(date(2025, 4, 30)), Some(30));
        assert_eq!(days_in_month(date(2025, 12, 31)), Some(31));
        assert_eq!(days_in_month(date(2023, 2, 1)), Some(28));
    }
}
