//! County Health Dashboard - percentile & trend charts over yearly CSV data
//!
//! Without a subcommand the interactive dashboard opens. The `percentile` and
//! `trend` subcommands run the same analytics headless and print the results.

mod gui;

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use county_health_dashboard::charts::ChartRenderer;
use county_health_dashboard::stats::{AnalyticsEngine, AttributePercentiles};
use county_health_dashboard::{DashboardConfig, DatasetAccessor, Selection};
use eframe::egui;
use gui::DashboardApp;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "county_health_dashboard",
    about = "County Health Rankings percentile and trend dashboard"
)]
struct Cli {
    /// Directory holding the yearly `chr<year>.csv` files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Rank the selected counties within each selected attribute
    Percentile(QueryArgs),
    /// Follow one attribute for the selected counties across all years
    Trend(QueryArgs),
}

#[derive(Args)]
struct QueryArgs {
    /// Saved filters file to start from
    #[arg(long)]
    filters: Option<PathBuf>,

    /// Year to query; overrides the filters file
    #[arg(long)]
    year: Option<i32>,

    /// County to include (repeatable); replaces the filters file's counties
    #[arg(long = "county")]
    counties: Vec<String>,

    /// Attribute to include (repeatable); replaces the filters file's attributes
    #[arg(long = "attribute")]
    attributes: Vec<String>,

    /// Also write PNG charts into this directory
    #[arg(long)]
    png_dir: Option<PathBuf>,
}

impl QueryArgs {
    /// Build the selection from the filters file and the explicit flags.
    fn selection(&self, default_year: i32) -> anyhow::Result<Selection> {
        let mut selection = match &self.filters {
            Some(path) => Selection::load(path)
                .with_context(|| format!("Error loading filters from {}", path.display()))?,
            None => Selection::new(default_year),
        };
        if let Some(year) = self.year {
            selection.year = year;
        }
        if !self.counties.is_empty() {
            selection.entities = self.counties.clone();
        }
        if !self.attributes.is_empty() {
            selection.attributes = self.attributes.clone();
        }
        Ok(selection)
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let mut config = DashboardConfig::from_env();
    if let Some(dir) = cli.data_dir {
        config = config.with_data_dir(dir);
    }
    log::info!(
        "Reading {}<year>.csv from {}",
        config.file_prefix,
        config.data_dir.display()
    );

    let accessor = Arc::new(DatasetAccessor::from_config(&config));

    match cli.command {
        Some(Command::Percentile(args)) => run_percentile(&accessor, &config, &args),
        Some(Command::Trend(args)) => run_trend(&accessor, &config, &args),
        None => run_dashboard(accessor, &config),
    }
}

fn run_dashboard(accessor: Arc<DatasetAccessor>, config: &DashboardConfig) -> anyhow::Result<()> {
    let window = config.year_window();
    let selection = Selection::new(window.last());

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("County Health Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "County Health Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, accessor, window, selection)))),
    )
    .map_err(|e| anyhow!("Dashboard failed: {}", e))
}

fn run_percentile(
    accessor: &DatasetAccessor,
    config: &DashboardConfig,
    args: &QueryArgs,
) -> anyhow::Result<()> {
    let selection = args.selection(config.year_window().last())?;
    let table = accessor.load_year(selection.year)?;
    if table.is_empty() {
        println!("Data file for year {} not found.", selection.year);
        return Ok(());
    }

    let outcomes = AnalyticsEngine::percentiles(&table, &selection)?;
    for outcome in &outcomes {
        match outcome {
            AttributePercentiles::Ranked(result) => {
                println!();
                println!("{} ({})", result.attribute, result.year);
                println!("{:<30} {:>14} {:>12}", "County", "Value", "Percentile");
                for point in &result.points {
                    println!(
                        "{:<30} {:>14.3} {:>12.2}",
                        point.entity, point.value, point.percentile
                    );
                }
                if !result.excluded.is_empty() {
                    println!("No value for: {}", result.excluded.join(", "));
                }
                let q = &result.summary.quartiles;
                println!(
                    "{} counties · min {:.3} · Q1 {:.3} · median {:.3} · Q3 {:.3} · max {:.3}",
                    result.distribution_size(),
                    q[0],
                    q[1],
                    q[2],
                    q[3],
                    q[4]
                );

                if let Some(dir) = &args.png_dir {
                    let path = ChartRenderer::write_percentile_chart(result, dir)?;
                    println!("Chart written to {}", path.display());
                }
            }
            AttributePercentiles::NoData { attribute } => {
                println!();
                println!("No data available for the attribute: {}", attribute);
            }
            AttributePercentiles::UnknownAttribute { attribute } => {
                println!();
                println!("'{}' is not part of the {} data.", attribute, selection.year);
            }
        }
    }

    Ok(())
}

fn run_trend(
    accessor: &DatasetAccessor,
    config: &DashboardConfig,
    args: &QueryArgs,
) -> anyhow::Result<()> {
    let window = config.year_window();
    let selection = args.selection(window.last())?;
    let result = AnalyticsEngine::assemble_series(accessor, &selection, window)?;

    println!("{} ({}-{})", result.attribute, window.first(), window.last());
    print!("{:<30}", "County");
    for year in &result.years {
        print!(" {:>10}", year);
    }
    println!();

    for series in &result.series {
        print!("{:<30}", series.entity);
        for value in &series.values {
            match value {
                Some(v) => print!(" {:>10.3}", v),
                None => print!(" {:>10}", "-"),
            }
        }
        println!();
    }

    if result.is_all_missing() {
        println!("No data available for the attribute: {}", result.attribute);
    } else if !result.years_without_data.is_empty() {
        let years: Vec<String> = result.years_without_data.iter().map(i32::to_string).collect();
        println!("No data for: {}", years.join(", "));
    }

    if let Some(dir) = &args.png_dir {
        let path = ChartRenderer::write_trend_chart(&result, dir)?;
        println!("Chart written to {}", path.display());
    }

    Ok(())
}
