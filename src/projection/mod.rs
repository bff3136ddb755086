//! Projection engine for per-country revenue and profit projections

mod state;
mod engine;
mod rows;
mod indicators;

pub use state::ProjectionState;
pub use engine::ProjectionEngine;
pub use rows::{
    margin, ProjectionResult, ProjectionRow, ProjectionSummary, ProjectionWarning, SegmentPeriod,
    SegmentProjection, SegmentTotals,
};
pub use indicators::{indicators, PerformanceIndicators, ProfitTrend};
