//! Revenue Projection CLI
//!
//! Runs a projection for one country and scenario, prints a preview, and
//! optionally writes period and yearly rows to CSV.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use clap::Parser;
use log::info;
use revenue_projection::aggregate::Aggregator;
use revenue_projection::catalog::load_segments;
use revenue_projection::config::{Configuration, OpexMode, Parameters, DEFAULT_CONFIG_PATH};
use revenue_projection::period::{Horizon, PeriodResolver};
use revenue_projection::projection::{
    indicators, PerformanceIndicators, ProjectionEngine, ProjectionResult, ProjectionSummary,
};
use revenue_projection::scenario::Scenario;
use revenue_projection::YearlySummary;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about = "Multi-market revenue and profit projections", long_about = None)]
struct Cli {
    /// JSON model configuration (falls back to the built-in markets)
    #[arg(long)]
    config: Option<PathBuf>,

    /// CSV segment catalog overriding the configuration's segments
    #[arg(long)]
    segments_csv: Option<PathBuf>,

    /// Country key
    #[arg(short, long, default_value = "india")]
    country: String,

    /// Horizon token: 1M (daily), NY (years of months) or a period count
    #[arg(long)]
    horizon: Option<Horizon>,

    /// Scenario preset (conservative, base, optimistic)
    #[arg(short, long, default_value = "Base Case")]
    scenario: String,

    /// Seasonality profile (none, retail, summer, festival)
    #[arg(long)]
    seasonality: Option<String>,

    /// Monthly operating expense in local currency
    #[arg(long)]
    opex: Option<f64>,

    /// Operating expense mode (fixed, percent-of-revenue, hybrid)
    #[arg(long)]
    opex_mode: Option<OpexMode>,

    /// Operating expense as a percentage of revenue
    #[arg(long)]
    opex_percentage: Option<f64>,

    /// First period's date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    start_date: Option<String>,

    /// Label of the first yearly bucket; defaults to the start date's year
    #[arg(long)]
    base_year: Option<i32>,

    /// Write period rows to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write yearly summaries to this CSV file
    #[arg(long)]
    yearly: Option<PathBuf>,

    /// Print the full result as JSON instead of the preview table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    result: &'a ProjectionResult,
    summary: ProjectionSummary,
    yearly: &'a [YearlySummary],
    indicators: PerformanceIndicators,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_configuration(&cli)?;
    let parameters = build_parameters(&cli);

    let start_date = match &cli.start_date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("invalid start date: {}", s))?,
        None => chrono::Local::now().date_naive(),
    };
    let horizon = match cli.horizon {
        Some(h) => h,
        None => parameters.horizon()?,
    };
    let scenario = Scenario::preset(&cli.scenario)?;

    info!(
        "Projecting {} over {} from {} ({})",
        cli.country, horizon, start_date, scenario.name
    );

    let engine = ProjectionEngine::new(&config, &parameters);
    let resolver = PeriodResolver::new(start_date);
    let result = engine.project_horizon(&cli.country, &scenario, &resolver, &horizon)?;

    let base_year = cli.base_year.unwrap_or_else(|| start_date.year());
    // Daily periods don't roll up into years
    let yearly = if horizon.is_daily() {
        Vec::new()
    } else {
        Aggregator::yearly(base_year).aggregate(&result.rows)
    };

    if let Some(path) = &cli.output {
        write_csv(path, &result.rows)?;
        println!("Period rows written to: {}", path.display());
    }
    if let Some(path) = &cli.yearly {
        write_csv(path, &yearly)?;
        println!("Yearly summaries written to: {}", path.display());
    }

    if cli.json {
        let report = JsonReport {
            result: &result,
            summary: result.summary(),
            yearly: &yearly,
            indicators: indicators(&result.rows),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_preview(&result, &yearly);
    }

    Ok(())
}

fn load_configuration(cli: &Cli) -> Result<Configuration> {
    let config = match &cli.config {
        Some(path) => Configuration::from_json_path(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => Configuration::load_or_fallback(Path::new(DEFAULT_CONFIG_PATH)),
    };

    match &cli.segments_csv {
        Some(path) => {
            let library = load_segments(path)
                .with_context(|| format!("failed to load segments from {}", path.display()))?;
            info!("Loaded segments for {} countries from {}", library.len(), path.display());
            Ok(config.with_segment_library(library))
        }
        None => Ok(config),
    }
}

fn build_parameters(cli: &Cli) -> Parameters {
    let mut parameters = Parameters::default();
    if let Some(name) = &cli.seasonality {
        parameters.seasonality = name.clone();
    }
    if let Some(opex) = cli.opex {
        parameters.operating_expense = opex;
    }
    if let Some(mode) = cli.opex_mode {
        parameters.operating_expense_mode = mode;
    }
    if let Some(pct) = cli.opex_percentage {
        parameters.operating_expense_percentage = pct;
    }
    parameters
}

fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("unable to create {}", path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_preview(result: &ProjectionResult, yearly: &[YearlySummary]) {
    println!(
        "Revenue Projection: {} ({}), {}",
        result.country, result.currency, result.scenario
    );
    println!("{}", "=".repeat(96));
    println!(
        "{:>4} {:>10} {:>16} {:>16} {:>14} {:>16} {:>8} {:>14}",
        "#", "Period", "Revenue", "COGS", "Opex", "Net Profit", "Margin", "Revenue (rpt)"
    );
    println!("{}", "-".repeat(96));

    for row in result.rows.iter().take(24) {
        println!(
            "{:>4} {:>10} {:>16.2} {:>16.2} {:>14.2} {:>16.2} {:>7.1}% {:>14.2}",
            row.period_index,
            row.period_label,
            row.revenue_local,
            row.cogs_local,
            row.opex_local,
            row.net_profit_local,
            row.profit_margin * 100.0,
            row.revenue_reporting,
        );
    }
    if result.rows.len() > 24 {
        println!("... ({} more periods)", result.rows.len() - 24);
    }

    if !yearly.is_empty() {
        println!("\nYearly:");
        for year in yearly {
            println!(
                "  {} ({:>2} periods): revenue {:.2}, net profit {:.2}, avg margin {:.1}%",
                year.year,
                year.period_count,
                year.revenue_local,
                year.net_profit_local,
                year.avg_profit_margin * 100.0
            );
        }
    }

    let summary = result.summary();
    let kpis = indicators(&result.rows);
    println!("\nSummary:");
    println!("  Periods: {}", summary.periods);
    println!("  Total Revenue: {:.2} {}", summary.total_revenue_local, result.currency);
    println!("  Total Net Profit: {:.2} {}", summary.total_net_profit_local, result.currency);
    println!("  Total Revenue (reporting): {:.2}", summary.total_revenue_reporting);
    println!("  Average Margin: {:.2}%", summary.average_margin * 100.0);
    println!("  Revenue Growth (H2 vs H1): {:.2}%", kpis.revenue_growth_pct);
    println!("  Profit Trend: {:?}", kpis.profit_trend);
    if let Some(label) = &kpis.break_even_period {
        println!("  Break-even Period: {}", label);
    }
}
