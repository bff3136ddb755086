//! AWS Lambda handler for revenue projections
//!
//! Accepts a projection request as JSON and returns period rows, yearly
//! summaries, a scenario comparison and headline indicators.
//!
//! Invoked directly the payload is the request itself. Behind a Function URL
//! or API Gateway the request arrives as a JSON string in `body`.

use chrono::{Datelike, NaiveDate};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use revenue_projection::{
    projection::{
        indicators, PerformanceIndicators, ProjectionSummary, ProjectionWarning, SegmentTotals,
    },
    Aggregator, Configuration, Parameters, PeriodResolver, ProjectionEngine, ProjectionError,
    ProjectionRow, Scenario, ScenarioComparison, ScenarioRunner, YearlySummary,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Input for one projection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRequest {
    pub country: String,

    /// Horizon token (default: 1Y)
    #[serde(default = "default_horizon")]
    pub horizon: String,

    /// Preset scenario name (default: Base Case)
    #[serde(default = "default_scenario")]
    pub scenario: String,

    /// Explicit multipliers; takes precedence over `scenario`
    #[serde(default)]
    pub custom_scenario: Option<Scenario>,

    #[serde(default)]
    pub parameters: Parameters,

    /// First period's date (default: today)
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Label of the first yearly bucket (default: start date's year)
    #[serde(default)]
    pub base_year: Option<i32>,

    /// Inline configuration (default: built-in markets)
    #[serde(default)]
    pub config: Option<Value>,

    /// Also run all presets for the comparison table
    #[serde(default = "default_true")]
    pub compare_scenarios: bool,
}

fn default_horizon() -> String { "1Y".to_string() }
fn default_scenario() -> String { "Base Case".to_string() }
fn default_true() -> bool { true }

/// Output from the projection
#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    pub country: String,
    pub scenario: String,
    pub currency: String,
    pub exchange_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ProjectionSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indicators: Option<PerformanceIndicators>,
    pub rows: Vec<ProjectionRow>,
    pub yearly: Vec<YearlySummary>,
    pub segments: Vec<SegmentTotals>,
    pub scenario_comparison: Vec<ScenarioComparison>,
    pub warnings: Vec<ProjectionWarning>,
    pub execution_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Unwrap an HTTP-style envelope if present
fn request_payload(event: Value) -> Result<ProjectionRequest, serde_json::Error> {
    match event.get("body") {
        Some(Value::String(body)) => serde_json::from_str(body),
        _ => serde_json::from_value(event),
    }
}

fn load_config(inline: Option<Value>) -> Result<Configuration, ProjectionError> {
    match inline {
        Some(value) => Configuration::from_json_reader(serde_json::to_vec(&value)?.as_slice()),
        None => Ok(Configuration::fallback()),
    }
}

fn project(request: ProjectionRequest) -> Result<ProjectionResponse, ProjectionError> {
    let config = load_config(request.config)?;
    let scenario = match request.custom_scenario {
        Some(custom) => custom,
        None => Scenario::preset(&request.scenario)?,
    };

    let start_date = request
        .start_date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let periods = PeriodResolver::new(start_date).resolve_token(&request.horizon)?;

    let engine = ProjectionEngine::new(&config, &request.parameters);
    let result = engine.project(&request.country, &scenario, &periods)?;

    let is_daily = periods.first().map(|p| p.is_daily).unwrap_or(false);
    let yearly = if is_daily {
        Vec::new()
    } else {
        let base_year = request.base_year.unwrap_or_else(|| start_date.year());
        Aggregator::yearly(base_year).aggregate(&result.rows)
    };

    let scenario_comparison = if request.compare_scenarios {
        let runner = ScenarioRunner::new(config.clone(), request.parameters.clone());
        runner.compare(&request.country, &Scenario::presets(), &periods)?
    } else {
        Vec::new()
    };

    Ok(ProjectionResponse {
        summary: Some(result.summary()),
        indicators: Some(indicators(&result.rows)),
        segments: result.segments.iter().map(|s| s.totals()).collect(),
        yearly,
        scenario_comparison,
        country: result.country,
        scenario: result.scenario,
        currency: result.currency,
        exchange_rate: result.exchange_rate,
        rows: result.rows,
        warnings: result.warnings,
        execution_time_ms: 0,
        error: None,
    })
}

fn error_response(message: String) -> ProjectionResponse {
    ProjectionResponse {
        error: Some(message),
        ..Default::default()
    }
}

/// Lambda handler function
async fn handler(event: LambdaEvent<Value>) -> Result<ProjectionResponse, Error> {
    let start = std::time::Instant::now();

    let request = match request_payload(event.payload) {
        Ok(r) => r,
        Err(e) => return Ok(error_response(format!("Invalid JSON: {}", e))),
    };
    log::info!("Projecting {} over {}", request.country, request.horizon);

    let mut response = match project(request) {
        Ok(response) => response,
        Err(e) => {
            log::warn!("Projection failed: {}", e);
            error_response(e.to_string())
        }
    };
    response.execution_time_ms = start.elapsed().as_millis() as u64;

    Ok(response)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    run(service_fn(handler)).await
}
