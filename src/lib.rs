//! Revenue Projection - multi-market revenue, cost and profit projection engine
//!
//! This library provides:
//! - Country and segment configuration with a built-in fallback
//! - Horizon resolution into daily or monthly periods, with seasonality
//! - Per-period projections with compounding growth and dual-currency reporting
//! - Scenario multipliers and parallel multi-scenario runs
//! - Yearly (or coarser) aggregation of projection rows

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod error;
pub mod period;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use aggregate::{Aggregator, YearlySummary};
pub use catalog::{CatalogStats, Segment};
pub use config::{Configuration, Country, OpexMode, Parameters, RevenueModel};
pub use error::{ProjectionError, Result};
pub use period::{Horizon, Period, PeriodResolver, SeasonalityProfile};
pub use projection::{ProjectionEngine, ProjectionResult, ProjectionRow, ProjectionSummary};
pub use scenario::{Scenario, ScenarioAdjuster, ScenarioComparison, ScenarioRunner};
