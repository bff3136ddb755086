//! Core projection engine for per-period revenue, cost and profit

use crate::catalog::Segment;
use crate::config::{Configuration, Country, Parameters, RevenueModel};
use crate::error::{ProjectionError, Result};
use crate::period::{Horizon, Period, PeriodResolver, SeasonalityProfile};
use crate::scenario::{Figures, Scenario, ScenarioAdjuster};
use super::rows::{
    margin, ProjectionResult, ProjectionRow, ProjectionWarning, SegmentPeriod, SegmentProjection,
};
use super::state::ProjectionState;

/// Local-currency totals for one period before opex
#[derive(Debug, Clone, Copy, Default)]
struct PeriodTotals {
    revenue: f64,
    cogs: f64,
    volume: f64,
    growth_factor: f64,
}

/// Main projection engine
///
/// Borrows the configuration store and parameters; every call produces a
/// freshly owned `ProjectionResult`, so one engine can be shared across threads.
pub struct ProjectionEngine<'a> {
    config: &'a Configuration,
    parameters: &'a Parameters,
    seasonality: Option<SeasonalityProfile>,
}

impl<'a> ProjectionEngine<'a> {
    /// Create a new projection engine over a configuration and parameters
    pub fn new(config: &'a Configuration, parameters: &'a Parameters) -> Self {
        Self {
            config,
            parameters,
            seasonality: None,
        }
    }

    /// Use an explicit seasonality profile instead of the one named in the parameters
    pub fn with_seasonality(mut self, profile: SeasonalityProfile) -> Self {
        self.seasonality = Some(profile);
        self
    }

    pub fn parameters(&self) -> &Parameters {
        self.parameters
    }

    pub fn config(&self) -> &Configuration {
        self.config
    }

    /// Run a projection for one country under a scenario
    pub fn project(&self, country_key: &str, scenario: &Scenario, periods: &[Period]) -> Result<ProjectionResult> {
        scenario.validate()?;
        self.project_with(country_key, &ScenarioAdjuster::new(scenario), periods)
    }

    /// Run a projection with scenario adjustment switched off
    pub fn project_unadjusted(&self, country_key: &str, periods: &[Period]) -> Result<ProjectionResult> {
        self.project_with(country_key, &ScenarioAdjuster::disabled(), periods)
    }

    /// Resolve a horizon and run the projection over it
    pub fn project_horizon(
        &self,
        country_key: &str,
        scenario: &Scenario,
        resolver: &PeriodResolver,
        horizon: &Horizon,
    ) -> Result<ProjectionResult> {
        let periods = resolver.resolve(horizon)?;
        self.project(country_key, scenario, &periods)
    }

    /// Run a projection with an explicit adjuster
    ///
    /// All inputs are validated before the first row is computed.
    pub fn project_with(
        &self,
        country_key: &str,
        adjuster: &ScenarioAdjuster,
        periods: &[Period],
    ) -> Result<ProjectionResult> {
        self.parameters.validate()?;
        let (country, segments) = self.config.resolve(country_key)?;
        let seasonality = self.seasonality_profile()?;
        validate_period_order(periods)?;

        let use_segments = self.parameters.revenue_model == RevenueModel::Segments;
        let mut warnings = Vec::new();
        if use_segments && segments.is_empty() {
            let warning = ProjectionWarning::EmptySegmentCatalog {
                country: country.key.clone(),
            };
            log::warn!("{}", warning);
            warnings.push(warning);
        }

        log::debug!(
            "Projecting {} over {} periods ({} segments, scenario '{}')",
            country.key,
            periods.len(),
            segments.len(),
            adjuster.name()
        );

        let mut result = ProjectionResult::new(
            &country.key,
            adjuster.name(),
            &country.currency,
            country.exchange_rate,
        );
        result.warnings = warnings;
        if use_segments {
            result.segments = segments
                .iter()
                .map(|s| SegmentProjection {
                    name: s.name.clone(),
                    category: s.category.clone(),
                    market: s.market.clone(),
                    periods: Vec::with_capacity(periods.len()),
                })
                .collect();
        }

        let mut state = ProjectionState::new();
        for period in periods {
            let row = self.calculate_period(
                country,
                segments,
                &seasonality,
                adjuster,
                period,
                &mut state,
                &mut result.segments,
            );
            result.add_row(row);
        }

        log::debug!(
            "Finished {}: cumulative revenue {:.2} {}",
            country.key,
            state.cumulative_revenue_local,
            country.currency
        );

        Ok(result)
    }

    fn seasonality_profile(&self) -> Result<SeasonalityProfile> {
        match &self.seasonality {
            Some(profile) => Ok(profile.clone()),
            None => SeasonalityProfile::named(&self.parameters.seasonality),
        }
    }

    /// Calculate one period's row
    #[allow(clippy::too_many_arguments)]
    fn calculate_period(
        &self,
        country: &Country,
        segments: &[Segment],
        seasonality: &SeasonalityProfile,
        adjuster: &ScenarioAdjuster,
        period: &Period,
        state: &mut ProjectionState,
        breakdown: &mut [SegmentProjection],
    ) -> ProjectionRow {
        let mut row = ProjectionRow::new(&country.key, period.index, &period.label, period.is_daily);
        let season = seasonality.factor(period.index);
        row.seasonality_factor = season;

        let totals = match self.parameters.revenue_model {
            RevenueModel::Segments => segment_totals(segments, adjuster, period, season, breakdown),
            RevenueModel::Simple => self.simple_totals(adjuster, period, season),
        };

        // Revenue, then COGS, then opex, then net
        row.revenue_local = totals.revenue;
        row.cogs_local = totals.cogs;
        row.gross_profit_local = totals.revenue - totals.cogs;
        row.transaction_volume = totals.volume;
        row.growth_factor = totals.growth_factor;

        let base_opex = self.parameters.base_opex(totals.revenue, period.daily_scale());
        row.opex_local = adjuster
            .adjust(Figures {
                opex: base_opex,
                ..Figures::default()
            })
            .opex;

        row.net_profit_local = row.revenue_local - row.cogs_local - row.opex_local;
        row.profit_margin = margin(row.net_profit_local, row.revenue_local);

        // Currency conversion
        row.revenue_reporting = country.to_reporting(row.revenue_local);
        row.cogs_reporting = country.to_reporting(row.cogs_local);
        row.opex_reporting = country.to_reporting(row.opex_local);
        row.net_profit_reporting = country.to_reporting(row.net_profit_local);

        let (cumulative_local, cumulative_reporting) =
            state.accumulate(period.index, row.revenue_local, row.revenue_reporting);
        row.cumulative_revenue_local = cumulative_local;
        row.cumulative_revenue_reporting = cumulative_reporting;

        row
    }

    /// Legacy single-line model: start revenue grown at the global rate
    fn simple_totals(&self, adjuster: &ScenarioAdjuster, period: &Period, season: f64) -> PeriodTotals {
        let growth_factor = (1.0 + self.parameters.growth_rate / 100.0).powf(period.growth_exponent());
        let base = self.parameters.start_revenue * growth_factor * season * period.daily_scale();

        let adjusted = adjuster.adjust(Figures {
            volume: base,
            price: 1.0,
            cost: self.parameters.cost_percentage / 100.0,
            opex: 0.0,
        });

        PeriodTotals {
            revenue: adjusted.volume * adjusted.price,
            cogs: adjusted.volume * adjusted.cost,
            volume: 0.0,
            growth_factor,
        }
    }
}

/// Sum compounded segment contributions for one period
fn segment_totals(
    segments: &[Segment],
    adjuster: &ScenarioAdjuster,
    period: &Period,
    season: f64,
    breakdown: &mut [SegmentProjection],
) -> PeriodTotals {
    let exponent = period.growth_exponent();
    let daily_scale = period.daily_scale();
    let mut totals = PeriodTotals::default();
    let mut growth_sum = 0.0;

    for (segment, projection) in segments.iter().zip(breakdown.iter_mut()) {
        let growth = segment.growth_multiplier().powf(exponent);
        let compounded = segment.monthly_volume * growth;

        let adjusted = adjuster.adjust(Figures {
            volume: compounded * season,
            price: segment.price_per_transaction,
            cost: segment.cost_per_transaction,
            opex: 0.0,
        });

        let volume = adjusted.volume * daily_scale;
        let revenue = volume * adjusted.price;
        let cost = volume * adjusted.cost;

        totals.revenue += revenue;
        totals.cogs += cost;
        totals.volume += volume;
        growth_sum += growth;

        projection
            .periods
            .push(SegmentPeriod::new(period.index, volume, revenue, cost));
    }

    totals.growth_factor = if segments.is_empty() {
        1.0
    } else {
        growth_sum / segments.len() as f64
    };

    totals
}

/// Periods must be 1-based and strictly increasing
fn validate_period_order(periods: &[Period]) -> Result<()> {
    let mut previous = 0;
    for period in periods {
        if period.index <= previous {
            return Err(ProjectionError::InvalidHorizon {
                token: format!("period {} out of order", period.index),
            });
        }
        previous = period.index;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OpexMode;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use chrono::NaiveDate;

    fn singapore_config() -> Configuration {
        Configuration::new(
            vec![Country::new("singapore", "Singapore", "SGD", "S$", 1.35)],
            vec![Segment::new("singapore", "eKYC", 1.0, 0.3, 1_000_000.0, 10.0)],
        )
    }

    fn resolver() -> PeriodResolver {
        PeriodResolver::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    #[test]
    fn test_monthly_compounding() {
        let config = singapore_config();
        let params = Parameters::default();
        let engine = ProjectionEngine::new(&config, &params);

        let result = engine
            .project_horizon("singapore", &Scenario::base_case(), &resolver(), &Horizon::Years(1))
            .unwrap();

        assert_eq!(result.rows.len(), 12);
        let p1 = &result.rows[0];
        let p2 = &result.rows[1];
        assert_relative_eq!(p1.transaction_volume, 1_000_000.0, max_relative = 1e-12);
        assert_relative_eq!(p1.revenue_local, 1_000_000.0, max_relative = 1e-12);
        assert_relative_eq!(p2.transaction_volume, 1_100_000.0, max_relative = 1e-12);
        assert_relative_eq!(p2.revenue_local, 1_100_000.0, max_relative = 1e-12);
        assert_relative_eq!(p2.cumulative_revenue_local, 2_100_000.0, max_relative = 1e-12);
        assert_relative_eq!(p1.cogs_local, 300_000.0, max_relative = 1e-12);
        assert_relative_eq!(p1.profit_margin, 0.7, max_relative = 1e-12);
        assert_relative_eq!(p2.growth_factor, 1.1, max_relative = 1e-12);
    }

    #[test]
    fn test_daily_fractional_compounding() {
        let config = singapore_config();
        let params = Parameters::default();
        let engine = ProjectionEngine::new(&config, &params);

        let result = engine
            .project_horizon("singapore", &Scenario::base_case(), &resolver(), &Horizon::Month)
            .unwrap();

        assert_eq!(result.rows.len(), 30);
        let day_15 = &result.rows[14];
        let expected = 1_000_000.0 * 1.1_f64.powf(0.5) * (1.0 / 30.0);
        assert_relative_eq!(day_15.transaction_volume, expected, max_relative = 1e-12);
        assert!(day_15.is_daily);
    }

    #[test]
    fn test_fixed_opex_is_daily_scaled() {
        let config = singapore_config();
        let params = Parameters {
            operating_expense: 30_000.0,
            ..Default::default()
        };
        let engine = ProjectionEngine::new(&config, &params);

        let daily = engine
            .project_horizon("singapore", &Scenario::base_case(), &resolver(), &Horizon::Month)
            .unwrap();
        assert_relative_eq!(daily.rows[0].opex_local, 1_000.0, max_relative = 1e-12);

        let monthly = engine
            .project_horizon("singapore", &Scenario::base_case(), &resolver(), &Horizon::Years(1))
            .unwrap();
        let row = &monthly.rows[0];
        assert_relative_eq!(row.opex_local, 30_000.0);
        assert_relative_eq!(row.net_profit_local, 1_000_000.0 - 300_000.0 - 30_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_percent_opex_applies_scenario_multiplier() {
        let config = singapore_config();
        let params = Parameters {
            operating_expense_mode: OpexMode::PercentOfRevenue,
            operating_expense_percentage: 10.0,
            ..Default::default()
        };
        let engine = ProjectionEngine::new(&config, &params);
        let scenario = Scenario::custom("Heavy OpEx", 1.0, 1.0, 1.0, 2.0).unwrap();
        let periods = resolver().resolve(&Horizon::Periods(1)).unwrap();

        let result = engine.project("singapore", &scenario, &periods).unwrap();
        assert_relative_eq!(result.rows[0].opex_local, 200_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_negative_margin_representable() {
        let config = Configuration::new(
            vec![Country::new("india", "India", "INR", "₹", 83.5)],
            vec![Segment::new("india", "Loss Leader", 1.0, 1.5, 1_000.0, 0.0)],
        );
        let params = Parameters::default();
        let engine = ProjectionEngine::new(&config, &params);
        let periods = resolver().resolve(&Horizon::Periods(3)).unwrap();

        let result = engine.project("india", &Scenario::base_case(), &periods).unwrap();
        for row in &result.rows {
            assert_relative_eq!(row.profit_margin, -0.5, max_relative = 1e-12);
            assert!(row.net_profit_local < 0.0);
        }
    }

    #[test]
    fn test_empty_catalog_yields_zero_rows() {
        let config = Configuration::new(
            vec![Country::new("thailand", "Thailand", "THB", "฿", 35.8)],
            vec![],
        );
        let params = Parameters {
            operating_expense: 500.0,
            ..Default::default()
        };
        let engine = ProjectionEngine::new(&config, &params);
        let periods = resolver().resolve(&Horizon::Periods(12)).unwrap();

        let result = engine.project("thailand", &Scenario::base_case(), &periods).unwrap();
        assert_eq!(
            result.warnings,
            vec![ProjectionWarning::EmptySegmentCatalog {
                country: "thailand".to_string()
            }]
        );
        assert_eq!(result.rows.len(), 12);
        for row in &result.rows {
            assert_eq!(row.revenue_local, 0.0);
            assert_eq!(row.cogs_local, 0.0);
            assert_eq!(row.profit_margin, 0.0);
            assert_relative_eq!(row.net_profit_local, -500.0);
        }
    }

    #[test]
    fn test_simple_revenue_model() {
        let config = singapore_config();
        let params = Parameters {
            revenue_model: RevenueModel::Simple,
            start_revenue: 100_000.0,
            growth_rate: 5.0,
            cost_percentage: 40.0,
            ..Default::default()
        };
        let engine = ProjectionEngine::new(&config, &params);
        let periods = resolver().resolve(&Horizon::Periods(2)).unwrap();

        let result = engine.project("singapore", &Scenario::base_case(), &periods).unwrap();
        assert_relative_eq!(result.rows[0].revenue_local, 100_000.0);
        assert_relative_eq!(result.rows[1].revenue_local, 105_000.0, max_relative = 1e-12);
        assert_relative_eq!(result.rows[1].cogs_local, 42_000.0, max_relative = 1e-12);
        assert_eq!(result.rows[0].transaction_volume, 0.0);
        assert!(result.segments.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_seasonality_override() {
        let config = singapore_config();
        let params = Parameters {
            seasonality: "retail".to_string(),
            ..Default::default()
        };
        let engine = ProjectionEngine::new(&config, &params);
        let periods = resolver().resolve(&Horizon::Periods(1)).unwrap();

        let retail = engine.project("singapore", &Scenario::base_case(), &periods).unwrap();
        assert_relative_eq!(retail.rows[0].seasonality_factor, 0.9);
        assert_relative_eq!(retail.rows[0].revenue_local, 900_000.0, max_relative = 1e-12);

        let engine = engine.with_seasonality(SeasonalityProfile::custom("flat", &[2.0; 12]).unwrap());
        let custom = engine.project("singapore", &Scenario::base_case(), &periods).unwrap();
        assert_relative_eq!(custom.rows[0].revenue_local, 2_000_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_fails_fast_on_bad_inputs() {
        let config = singapore_config();
        let params = Parameters {
            seasonality: "monsoon".to_string(),
            ..Default::default()
        };
        let engine = ProjectionEngine::new(&config, &params);
        let periods = resolver().resolve(&Horizon::Periods(3)).unwrap();

        assert!(matches!(
            engine.project("singapore", &Scenario::base_case(), &periods),
            Err(ProjectionError::UnknownSeasonality { .. })
        ));

        let params = Parameters::default();
        let engine = ProjectionEngine::new(&config, &params);

        // Public fields let callers bypass Scenario::custom
        let broken = Scenario {
            name: "Broken".to_string(),
            volume: -1.0,
            opex: f64::NAN,
            ..Scenario::base_case()
        };
        assert!(matches!(
            engine.project("singapore", &broken, &periods),
            Err(ProjectionError::InvalidScenario { .. })
        ));

        let reversed: Vec<Period> = periods.iter().rev().cloned().collect();
        assert!(matches!(
            engine.project("singapore", &Scenario::base_case(), &reversed),
            Err(ProjectionError::InvalidHorizon { .. })
        ));
    }

    #[test]
    fn test_currency_conversion() {
        let config = singapore_config();
        let params = Parameters::default();
        let engine = ProjectionEngine::new(&config, &params);
        let periods = resolver().resolve(&Horizon::Years(2)).unwrap();

        let result = engine.project("singapore", &Scenario::optimistic(), &periods).unwrap();
        for row in &result.rows {
            assert_abs_diff_eq!(row.revenue_reporting * 1.35, row.revenue_local, epsilon = 1e-6);
            assert_abs_diff_eq!(row.net_profit_reporting * 1.35, row.net_profit_local, epsilon = 1e-6);
        }
    }
}
