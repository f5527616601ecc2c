//! Vahan CLI binary.
//!
//! Provides command-line interface for ingesting vehicle registration exports
//! and reporting time-aligned growth.

mod config;

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use config::AppConfig;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use vahan::data::calendar::{month_end, parse_date};
use vahan::data::{
    DatasetCache, IngestOptions, SampleConfig, SampleGenerator, TidyRecord, ingest_dir, write_tidy,
};
use vahan::growth::{GroupBy, GrowthRecord, Query, compute_growth, latest_snapshot};
use vahan::output::{ExportFormat, Exporter, GrowthTable, format_count, kpi_block};
use vahan::{Dashboard, DashboardView, level_rows};

type CliResult<T> = Result<T, Box<dyn Error>>;

const DEFAULT_SAMPLE_START: &str = "2023-01";

#[derive(Parser)]
#[command(name = "vahan")]
#[command(about = "Vahan: vehicle registration growth analytics", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: <config dir>/vahan/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data directory holding raw/ and processed/
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log filter such as "debug" or "vahan_growth=trace" (default: RUST_LOG, then info)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize raw portal exports into the tidy dataset
    Process {
        /// Directory with category_monthly.csv and/or manufacturer_monthly.csv
        #[arg(long)]
        raw_dir: Option<PathBuf>,

        /// Output path (default: <data dir>/processed/registrations_tidy.csv)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Region tag for ingested rows
        #[arg(long)]
        state: Option<String>,
    },

    /// Generate a synthetic tidy dataset
    Sample {
        /// First month (YYYY-MM)
        #[arg(long, default_value = DEFAULT_SAMPLE_START)]
        start: String,

        /// Last month (YYYY-MM, default: current month)
        #[arg(long)]
        end: Option<String>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Catalog JSON (default: built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output path (default: <data dir>/processed/registrations_tidy.csv)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Compute YoY and QoQ growth per series
    Growth {
        /// Comma-separated group fields (state, category, manufacturer) or "total"
        #[arg(long, default_value = "category")]
        by: String,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        dataset: DatasetArgs,

        /// Output format (text, markdown, csv, json or pretty-json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Show the latest growth record of every series
    Snapshot {
        /// Comma-separated group fields (state, category, manufacturer) or "total"
        #[arg(long, default_value = "manufacturer")]
        by: String,

        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        dataset: DatasetArgs,

        /// Output format (text, markdown, csv, json or pretty-json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// KPI block, category trends and manufacturer league table
    Dashboard {
        #[command(flatten)]
        filters: FilterArgs,

        #[command(flatten)]
        dataset: DatasetArgs,

        /// Output format (text, markdown, json or pretty-json)
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Print the category and manufacturer catalog
    Catalog {
        /// Catalog JSON (default: configured or built-in catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// First month of the range (YYYY-MM or YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// Last month of the range (YYYY-MM or YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Keep only this category (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Keep only this manufacturer (repeatable)
    #[arg(long = "manufacturer")]
    manufacturers: Vec<String>,
}

impl FilterArgs {
    /// Build the query; an open bound defaults to the dataset's first or last month.
    fn query(&self, records: &[TidyRecord]) -> CliResult<Query> {
        let mut query = Query::new()
            .with_categories(self.categories.iter().cloned())
            .with_manufacturers(self.manufacturers.iter().cloned());

        let start = self
            .from
            .as_deref()
            .map(parse_month)
            .transpose()?
            .or_else(|| records.iter().map(|r| r.date).min());
        let end = self
            .to
            .as_deref()
            .map(parse_month)
            .transpose()?
            .or_else(|| records.iter().map(|r| r.date).max());

        if (self.from.is_some() || self.to.is_some())
            && let (Some(start), Some(end)) = (start, end)
        {
            query = query.with_date_range(start, end)?;
        }
        Ok(query)
    }
}

#[derive(Args)]
struct DatasetArgs {
    /// Tidy dataset (default: <data dir>/processed/registrations_tidy.csv)
    #[arg(long)]
    dataset: Option<PathBuf>,

    /// Fail instead of generating sample data when the dataset is missing
    #[arg(long)]
    no_sample: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rendering {
    Text,
    Markdown,
    Export(ExportFormat),
}

fn parse_rendering(value: &str) -> CliResult<Rendering> {
    match value.trim().to_lowercase().as_str() {
        "text" => Ok(Rendering::Text),
        "markdown" | "md" => Ok(Rendering::Markdown),
        other => Ok(Rendering::Export(other.parse()?)),
    }
}

fn parse_month(value: &str) -> CliResult<NaiveDate> {
    parse_date(value).ok_or_else(|| {
        Box::<dyn Error>::from(format!(
            "invalid month '{value}', expected YYYY-MM or YYYY-MM-DD"
        ))
    })
}

fn init_tracing(level: Option<&str>) {
    let filter = level.map_or_else(
        || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        EnvFilter::new,
    );

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    if let Err(e) = run(cli) {
        error!("{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    match cli.command {
        Commands::Process {
            raw_dir,
            out,
            state,
        } => {
            if let Some(state) = state {
                config.state = state;
            }
            process_raw(&config, raw_dir, out)?;
        }
        Commands::Sample {
            start,
            end,
            seed,
            catalog,
            out,
        } => {
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if catalog.is_some() {
                config.catalog = catalog;
            }
            let start = parse_month(&start)?;
            let end = end.as_deref().map_or_else(|| Ok(current_month()), parse_month)?;
            let out = out.unwrap_or_else(|| config.tidy_path());
            let records = generate_sample(&config, start, end)?;
            write_tidy(&out, &records)?;
            println!(
                "Wrote {} with {} rows.",
                out.display(),
                format_count(records.len() as u64)
            );
        }
        Commands::Growth {
            by,
            filters,
            dataset,
            format,
            output,
        } => {
            let records = load_dataset(&config, &dataset)?;
            let query = filters.query(&records)?;
            let group_by: GroupBy = by.parse()?;
            let growth = growth_for(&records, &query, &group_by);
            let title = format!("Growth by {group_by}");
            let content = render_growth(&title, &growth, parse_rendering(&format)?)?;
            emit(&content, output.as_deref())?;
        }
        Commands::Snapshot {
            by,
            filters,
            dataset,
            format,
            output,
        } => {
            let records = load_dataset(&config, &dataset)?;
            let query = filters.query(&records)?;
            let group_by: GroupBy = by.parse()?;
            let growth = growth_for(&records, &query, &group_by);
            let latest: Vec<GrowthRecord> = latest_snapshot(&growth, query.as_of())
                .into_values()
                .flatten()
                .collect();
            let title = format!("Latest month by {group_by}");
            let content = render_growth(&title, &latest, parse_rendering(&format)?)?;
            emit(&content, output.as_deref())?;
        }
        Commands::Dashboard {
            filters,
            dataset,
            format,
            output,
        } => {
            let records = load_dataset(&config, &dataset)?;
            let query = filters.query(&records)?;
            let view = Dashboard::build(&records, &query);
            let content = render_dashboard(&view, parse_rendering(&format)?)?;
            emit(&content, output.as_deref())?;
        }
        Commands::Catalog { catalog, format } => {
            if catalog.is_some() {
                config.catalog = catalog;
            }
            print_catalog(&config, &format)?;
        }
    }

    Ok(())
}

fn current_month() -> NaiveDate {
    month_end(Local::now().date_naive())
}

fn process_raw(
    config: &AppConfig,
    raw_dir: Option<PathBuf>,
    out: Option<PathBuf>,
) -> CliResult<()> {
    let raw_dir = raw_dir.unwrap_or_else(|| config.raw_dir());
    let out = out.unwrap_or_else(|| config.tidy_path());
    let options = IngestOptions {
        state: config.state.clone(),
    };

    let records = ingest_dir(&raw_dir, &options)?;
    write_tidy(&out, &records)?;
    println!(
        "Wrote {} with {} rows.",
        out.display(),
        format_count(records.len() as u64)
    );
    Ok(())
}

fn generate_sample(
    config: &AppConfig,
    start: NaiveDate,
    end: NaiveDate,
) -> CliResult<Vec<TidyRecord>> {
    let mut sample = SampleConfig::new(start, end);
    sample.state = config.state.clone();
    sample.seed = config.seed;

    Ok(SampleGenerator::new(config.catalog()?, sample).generate()?)
}

/// Load the tidy dataset, generating sample data first when it is missing.
fn load_dataset(config: &AppConfig, args: &DatasetArgs) -> CliResult<Arc<[TidyRecord]>> {
    let path = args.dataset.clone().unwrap_or_else(|| config.tidy_path());

    if !path.exists() {
        if args.no_sample {
            return Err(format!(
                "no dataset at {}; run `vahan process` or `vahan sample` first",
                path.display()
            )
            .into());
        }
        warn!(path = %path.display(), "No tidy dataset found, generating sample data");
        let records = generate_sample(config, parse_month(DEFAULT_SAMPLE_START)?, current_month())?;
        write_tidy(&path, &records)?;
    }

    let mut cache = DatasetCache::new(path);
    let records = cache.load()?;
    info!(rows = records.len(), path = %cache.path().display(), "Loaded dataset");
    Ok(records)
}

fn growth_for(records: &[TidyRecord], query: &Query, group_by: &GroupBy) -> Vec<GrowthRecord> {
    let view = query.apply(records);
    compute_growth(&level_rows(&view, group_by), group_by)
}

fn render_growth(title: &str, growth: &[GrowthRecord], rendering: Rendering) -> CliResult<String> {
    let table = GrowthTable::new(title, growth);
    Ok(match rendering {
        Rendering::Text => table.to_ascii_table(),
        Rendering::Markdown => table.to_markdown(),
        Rendering::Export(format) => growth.export_to_string(format)?,
    })
}

fn render_dashboard(view: &DashboardView, rendering: Rendering) -> CliResult<String> {
    let categories = GrowthTable::new("Category trends", &view.category_trends);
    let league = GrowthTable::new("Manufacturers, latest month", &view.league);

    match rendering {
        Rendering::Text => Ok(format!(
            "{}{}{}",
            kpi_block(view.kpi.as_ref()),
            categories.to_ascii_table(),
            league.to_ascii_table()
        )),
        Rendering::Markdown => Ok(format!(
            "# Vehicle registrations\n\n```\n{}```\n\n{}\n{}",
            kpi_block(view.kpi.as_ref()),
            categories.to_markdown(),
            league.to_markdown()
        )),
        Rendering::Export(ExportFormat::Json) => Ok(serde_json::to_string(view)?),
        Rendering::Export(ExportFormat::PrettyJson) => Ok(serde_json::to_string_pretty(view)?),
        Rendering::Export(ExportFormat::Csv) => {
            Err("dashboard output supports text, markdown, json or pretty-json".into())
        }
    }
}

fn print_catalog(config: &AppConfig, format: &str) -> CliResult<()> {
    let catalog = config.catalog()?;

    if format.trim().eq_ignore_ascii_case("json") {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    println!("\n{:<10} {:>14}  Manufacturers", "Category", "Base volume");
    println!("{}", "─".repeat(72));
    for category in &catalog.categories {
        let manufacturers: Vec<&str> = catalog
            .manufacturers_in(&category.name)
            .map(|m| m.name.as_str())
            .collect();
        println!(
            "{:<10} {:>14}  {}",
            category.name,
            format_count(category.base_volume),
            manufacturers.join(", ")
        );
    }
    println!();
    Ok(())
}

fn emit(content: &str, output: Option<&Path>) -> CliResult<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            info!(path = %path.display(), bytes = content.len(), "Wrote output");
        }
        None => print!("{content}"),
    }
    Ok(())
}
