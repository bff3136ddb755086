//! Run every country under every preset scenario
//!
//! Projections run in parallel; the output is one CSV with a row per
//! (country, scenario, period), plus a console summary per pair.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use revenue_projection::config::{Configuration, Parameters, DEFAULT_CONFIG_PATH};
use revenue_projection::period::{Horizon, PeriodResolver};
use revenue_projection::scenario::{Scenario, ScenarioRunner};
use revenue_projection::ProjectionResult;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about = "Project all countries under all preset scenarios", long_about = None)]
struct Cli {
    /// JSON model configuration (falls back to the built-in markets)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Horizon token
    #[arg(long, default_value = "5Y")]
    horizon: Horizon,

    /// First period's date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    start_date: Option<String>,

    /// Output CSV path
    #[arg(short, long, default_value = "scenario_matrix.csv")]
    output: PathBuf,
}

/// One output line of the matrix
#[derive(Debug, Serialize)]
struct MatrixRow<'a> {
    country: &'a str,
    scenario: &'a str,
    currency: &'a str,
    period: u32,
    label: &'a str,
    revenue_local: f64,
    cogs_local: f64,
    opex_local: f64,
    net_profit_local: f64,
    revenue_reporting: f64,
    net_profit_reporting: f64,
    profit_margin: f64,
    cumulative_revenue_reporting: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Configuration::from_json_path(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::load_or_fallback(Path::new(DEFAULT_CONFIG_PATH)),
    };
    let start_date = match &cli.start_date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid start date: {}", s))?,
        None => chrono::Local::now().date_naive(),
    };

    let periods = PeriodResolver::new(start_date).resolve(&cli.horizon)?;
    let runner = ScenarioRunner::new(config, Parameters::default());
    let countries: Vec<String> = runner
        .config()
        .country_keys()
        .into_iter()
        .map(String::from)
        .collect();
    let country_refs: Vec<&str> = countries.iter().map(String::as_str).collect();
    let scenarios = Scenario::presets();

    println!(
        "Running {} countries x {} scenarios over {} ({} periods)...",
        countries.len(),
        scenarios.len(),
        cli.horizon,
        periods.len()
    );
    let start = Instant::now();
    let results = runner.run_matrix(&country_refs, &scenarios, &periods)?;
    println!("Projections complete in {:?}", start.elapsed());

    write_matrix(&cli.output, &results)?;
    println!("Results written to: {}", cli.output.display());

    println!(
        "\n{:<14} {:<14} {:>20} {:>20} {:>10}",
        "Country", "Scenario", "Revenue (rpt)", "Net Profit (rpt)", "Margin"
    );
    println!("{}", "-".repeat(82));
    for result in &results {
        let summary = result.summary();
        println!(
            "{:<14} {:<14} {:>20.2} {:>20.2} {:>9.2}%",
            result.country,
            result.scenario,
            summary.total_revenue_reporting,
            summary.total_net_profit_reporting,
            summary.average_margin * 100.0
        );
    }

    Ok(())
}

fn write_matrix(path: &Path, results: &[ProjectionResult]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("unable to create {}", path.display()))?;

    for result in results {
        for row in &result.rows {
            writer.serialize(MatrixRow {
                country: &result.country,
                scenario: &result.scenario,
                currency: &result.currency,
                period: row.period_index,
                label: &row.period_label,
                revenue_local: row.revenue_local,
                cogs_local: row.cogs_local,
                opex_local: row.opex_local,
                net_profit_local: row.net_profit_local,
                revenue_reporting: row.revenue_reporting,
                net_profit_reporting: row.net_profit_reporting,
                profit_margin: row.profit_margin,
                cumulative_revenue_reporting: row.cumulative_revenue_reporting,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}
