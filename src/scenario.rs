//! Scenario multipliers and the batch scenario runner
//!
//! A scenario scales volume, price, cost and operating expense on top of the
//! base assumptions. The runner holds one configuration and parameter set and
//! runs many (country, scenario) projections over it, in parallel when asked.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{Configuration, Parameters};
use crate::error::{ProjectionError, Result};
use crate::period::Period;
use crate::projection::{margin, ProjectionEngine, ProjectionResult};

pub const BASE_CASE: &str = "Base Case";

/// Named multiplier set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub volume: f64,
    pub price: f64,
    pub cost: f64,
    pub opex: f64,
}

impl Scenario {
    pub fn conservative() -> Self {
        Self::preset_unchecked("Conservative", 0.7, 0.9, 1.1, 1.0)
    }

    /// Identity multipliers
    pub fn base_case() -> Self {
        Self::preset_unchecked(BASE_CASE, 1.0, 1.0, 1.0, 1.0)
    }

    pub fn optimistic() -> Self {
        Self::preset_unchecked("Optimistic", 1.5, 1.1, 0.9, 1.0)
    }

    /// The three standard presets, worst to best
    pub fn presets() -> Vec<Self> {
        vec![Self::conservative(), Self::base_case(), Self::optimistic()]
    }

    /// Look up a preset by name (case-insensitive)
    pub fn preset(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "conservative" => Ok(Self::conservative()),
            "base case" | "base" | "base-case" | "base_case" => Ok(Self::base_case()),
            "optimistic" => Ok(Self::optimistic()),
            _ => Err(ProjectionError::UnknownScenario {
                name: name.to_string(),
            }),
        }
    }

    /// Caller-supplied multipliers; each must be a positive finite number
    pub fn custom(name: &str, volume: f64, price: f64, cost: f64, opex: f64) -> Result<Self> {
        let scenario = Self::preset_unchecked(name, volume, price, cost, opex);
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn validate(&self) -> Result<()> {
        let multipliers = [
            ("volume", self.volume),
            ("price", self.price),
            ("cost", self.cost),
            ("opex", self.opex),
        ];
        for (field, value) in multipliers {
            if !value.is_finite() || value <= 0.0 {
                return Err(ProjectionError::InvalidScenario {
                    name: self.name.clone(),
                    reason: format!("{} multiplier must be positive, got {}", field, value),
                });
            }
        }
        Ok(())
    }

    pub fn is_identity(&self) -> bool {
        self.volume == 1.0 && self.price == 1.0 && self.cost == 1.0 && self.opex == 1.0
    }

    fn preset_unchecked(name: &str, volume: f64, price: f64, cost: f64, opex: f64) -> Self {
        Self {
            name: name.to_string(),
            volume,
            price,
            cost,
            opex,
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::base_case()
    }
}

/// Raw or adjusted (volume, price, cost, opex) figures
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Figures {
    pub volume: f64,
    pub price: f64,
    pub cost: f64,
    pub opex: f64,
}

/// Applies a scenario's multipliers to raw figures
///
/// A disabled adjuster returns figures untouched. Multiplying by exactly 1.0
/// is exact in IEEE-754, so Base Case and disabled produce identical bits.
#[derive(Debug, Clone)]
pub struct ScenarioAdjuster {
    scenario: Option<Scenario>,
}

impl ScenarioAdjuster {
    pub fn new(scenario: &Scenario) -> Self {
        Self {
            scenario: Some(scenario.clone()),
        }
    }

    /// Identity adjuster
    pub fn disabled() -> Self {
        Self { scenario: None }
    }

    /// Scenario name reported on results
    pub fn name(&self) -> &str {
        self.scenario.as_ref().map(|s| s.name.as_str()).unwrap_or(BASE_CASE)
    }

    pub fn adjust(&self, figures: Figures) -> Figures {
        match &self.scenario {
            None => figures,
            Some(s) => Figures {
                volume: figures.volume * s.volume,
                price: figures.price * s.price,
                cost: figures.cost * s.cost,
                opex: figures.opex * s.opex,
            },
        }
    }
}

/// Totals for one scenario, as laid out on the scenario comparison view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub scenario: String,
    pub total_revenue_local: f64,
    pub total_revenue_reporting: f64,
    pub total_profit_local: f64,
    pub total_profit_reporting: f64,
    /// Net profit as a percentage of revenue
    pub profit_margin_pct: f64,
    pub average_period_revenue_local: f64,
}

impl ScenarioComparison {
    pub fn from_result(result: &ProjectionResult) -> Self {
        let summary = result.summary();
        Self {
            scenario: result.scenario.clone(),
            total_revenue_local: summary.total_revenue_local,
            total_revenue_reporting: summary.total_revenue_reporting,
            total_profit_local: summary.total_net_profit_local,
            total_profit_reporting: summary.total_net_profit_reporting,
            profit_margin_pct: margin(summary.total_net_profit_local, summary.total_revenue_local) * 100.0,
            average_period_revenue_local: summary.average_period_revenue_local,
        }
    }
}

/// Pre-loaded runner for batch projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(Configuration::fallback(), Parameters::default());
/// let periods = PeriodResolver::today().resolve_token("5Y")?;
///
/// for scenario in Scenario::presets() {
///     let result = runner.run("india", &scenario, &periods)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    config: Configuration,
    parameters: Parameters,
}

impl ScenarioRunner {
    pub fn new(config: Configuration, parameters: Parameters) -> Self {
        Self { config, parameters }
    }

    /// Runner over the built-in configuration with default parameters
    pub fn with_fallback() -> Self {
        Self::new(Configuration::fallback(), Parameters::default())
    }

    fn engine(&self) -> ProjectionEngine<'_> {
        ProjectionEngine::new(&self.config, &self.parameters)
    }

    /// Run a single projection
    pub fn run(&self, country: &str, scenario: &Scenario, periods: &[Period]) -> Result<ProjectionResult> {
        self.engine().project(country, scenario, periods)
    }

    /// Run several scenarios for one country
    pub fn run_scenarios(
        &self,
        country: &str,
        scenarios: &[Scenario],
        periods: &[Period],
    ) -> Result<Vec<ProjectionResult>> {
        let engine = self.engine();
        scenarios
            .iter()
            .map(|scenario| engine.project(country, scenario, periods))
            .collect()
    }

    /// Run every (country, scenario) pair in parallel
    ///
    /// Results come back ordered by country, then scenario. Any invalid input
    /// fails the whole batch.
    pub fn run_matrix(
        &self,
        countries: &[&str],
        scenarios: &[Scenario],
        periods: &[Period],
    ) -> Result<Vec<ProjectionResult>> {
        let pairs: Vec<(&str, &Scenario)> = countries
            .iter()
            .flat_map(|&country| scenarios.iter().map(move |scenario| (country, scenario)))
            .collect();

        let engine = self.engine();
        pairs
            .par_iter()
            .map(|(country, scenario)| engine.project(country, scenario, periods))
            .collect()
    }

    /// Compare scenarios for one country
    pub fn compare(
        &self,
        country: &str,
        scenarios: &[Scenario],
        periods: &[Period],
    ) -> Result<Vec<ScenarioComparison>> {
        Ok(self
            .run_scenarios(country, scenarios, periods)?
            .iter()
            .map(ScenarioComparison::from_result)
            .collect())
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Mutable parameters for sensitivity runs
    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::period::{Horizon, PeriodResolver};
    use chrono::NaiveDate;

    fn periods() -> Vec<Period> {
        PeriodResolver::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
            .resolve(&Horizon::Years(1))
            .unwrap()
    }

    #[test]
    fn test_preset_values() {
        let c = Scenario::preset("Conservative").unwrap();
        assert_eq!((c.volume, c.price, c.cost, c.opex), (0.7, 0.9, 1.1, 1.0));
        let o = Scenario::preset("optimistic").unwrap();
        assert_eq!((o.volume, o.price, o.cost, o.opex), (1.5, 1.1, 0.9, 1.0));
        assert!(Scenario::preset("BASE CASE").unwrap().is_identity());
        assert!(matches!(
            Scenario::preset("apocalyptic"),
            Err(ProjectionError::UnknownScenario { .. })
        ));
    }

    #[test]
    fn test_custom_rejects_non_positive() {
        assert!(Scenario::custom("zero", 0.0, 1.0, 1.0, 1.0).is_err());
        assert!(Scenario::custom("neg", 1.0, -1.0, 1.0, 1.0).is_err());
        assert!(Scenario::custom("nan", 1.0, 1.0, f64::NAN, 1.0).is_err());
        assert!(Scenario::custom("ok", 1.2, 0.8, 1.0, 1.3).is_ok());
    }

    #[test]
    fn test_adjust_multiplies_each_figure() {
        let adjuster = ScenarioAdjuster::new(&Scenario::optimistic());
        let adjusted = adjuster.adjust(Figures {
            volume: 100.0,
            price: 2.0,
            cost: 1.0,
            opex: 50.0,
        });
        assert_eq!(adjusted.volume, 150.0);
        assert!((adjusted.price - 2.2).abs() < 1e-12);
        assert!((adjusted.cost - 0.9).abs() < 1e-12);
        assert_eq!(adjusted.opex, 50.0);
    }

    #[test]
    fn test_base_case_is_bitwise_identity() {
        let base = ScenarioAdjuster::new(&Scenario::base_case());
        let disabled = ScenarioAdjuster::disabled();
        let raw = Figures {
            volume: 1_234_567.891,
            price: 0.1 + 0.2,
            cost: 1.0 / 3.0,
            opex: 98_765.4321,
        };
        assert_eq!(base.adjust(raw), disabled.adjust(raw));
        assert_eq!(disabled.adjust(raw), raw);
    }

    #[test]
    fn test_run_matrix_orders_results() {
        let runner = ScenarioRunner::with_fallback();
        let countries = ["india", "japan"];
        let results = runner
            .run_matrix(&countries, &Scenario::presets(), &periods())
            .unwrap();

        assert_eq!(results.len(), 6);
        assert_eq!(results[0].country, "india");
        assert_eq!(results[0].scenario, "Conservative");
        assert_eq!(results[4].country, "japan");
        assert_eq!(results[4].scenario, BASE_CASE);
    }

    #[test]
    fn test_run_matrix_fails_on_unknown_country() {
        let runner = ScenarioRunner::with_fallback();
        let err = runner
            .run_matrix(&["india", "mars"], &Scenario::presets(), &periods())
            .unwrap_err();
        assert!(matches!(err, ProjectionError::UnknownCountry { .. }));
    }

    #[test]
    fn test_run_rejects_invalid_multipliers() {
        let runner = ScenarioRunner::with_fallback();
        let negative = Scenario {
            volume: -1.0,
            ..Scenario::optimistic()
        };

        assert!(matches!(
            runner.run("india", &negative, &periods()),
            Err(ProjectionError::InvalidScenario { .. })
        ));
        assert!(matches!(
            runner.run_matrix(&["india"], &[Scenario::base_case(), negative], &periods()),
            Err(ProjectionError::InvalidScenario { .. })
        ));
    }

    #[test]
    fn test_compare_orders_by_outcome() {
        let runner = ScenarioRunner::with_fallback();
        let comparison = runner
            .compare("singapore", &Scenario::presets(), &periods())
            .unwrap();

        assert_eq!(comparison.len(), 3);
        assert!(comparison[0].total_revenue_local < comparison[1].total_revenue_local);
        assert!(comparison[1].total_revenue_local < comparison[2].total_revenue_local);
        assert!(comparison[2].profit_margin_pct > comparison[0].profit_margin_pct);
        assert!(
            (comparison[1].average_period_revenue_local * 12.0 - comparison[1].total_revenue_local).abs()
                < 1e-3
        );
    }
}
