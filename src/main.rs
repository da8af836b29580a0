//! Workload - recurring workload analysis per role
//!
//! A CLI tool that reads a task table, converts each recurring task
//! into monthly hours and flags roles (or categories) that are over
//! their limits or sitting idle.
//!
//! Exit codes:
//!   0 - Success (no overload, or no --fail-on-overload set)
//!   1 - Runtime error (missing column, bad config, unreadable file, etc.)
//!   2 - A group is above its monthly limit and --fail-on-overload is set

mod analysis;
mod cli;
mod config;
mod error;
mod ingest;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use ingest::{ColumnMap, TableReader};
use models::{LoadSummary, Report, ReportMetadata};
use std::path::Path;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("workload v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run_analysis(&args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .workload.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(config::DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  .workload.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .workload.toml")?;

    println!("✅ Created .workload.toml with default settings.");
    println!("   Edit it to set limits, idleness criterion and column names.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the complete analysis. Returns exit code (0 or 2).
fn run_analysis(args: &Args) -> Result<i32> {
    // Load configuration
    let mut config = load_config(args)?;
    config.merge_with_args(args);
    config.validate().context("Invalid limits")?;

    let thresholds = config.thresholds();
    let input = args
        .input
        .as_deref()
        .context("An input file is required")?;

    // Step 1: Load the task table
    println!("📥 Loading tasks: {}", input.display());
    let reader = TableReader::new(ColumnMap::from(&config));
    let records = reader
        .load(input)
        .with_context(|| format!("Failed to load tasks from {}", input.display()))?;

    let selection = args.row_selection();
    let records = selection.apply(records);
    if !selection.is_empty() {
        info!("{} row(s) match the row filters", records.len());
    }
    let rows_read = records.len();

    // Step 2: Aggregate and classify
    println!("🔬 Aggregating workload by {}...", config.report.group_by);
    let output = analysis::analyze(records, &thresholds);

    // Step 3: Build the report
    let summary = LoadSummary::from_rollups(&output.rollups);
    let metadata = ReportMetadata {
        input: input.display().to_string(),
        analysis_date: Utc::now(),
        group_by: config.report.group_by,
        rows_read,
        rows_aggregated: output.tasks.len(),
        rows_excluded: output.excluded.len(),
        status_filter: config.report.status,
        hide_zero: config.report.hide_zero,
    };

    let report = Report {
        metadata,
        thresholds,
        summary: summary.clone(),
        rollups: output.displayed(config.report.status, config.report.hide_zero),
        excluded: output.excluded.clone(),
        overloaded_tasks: output.overloaded_tasks(),
        idle_tasks: output.idle_tasks(),
        unrecognized_frequencies: output.unrecognized_frequencies.clone(),
    };

    // Step 4: Render and save
    let rendered = match args.format {
        OutputFormat::Markdown => report::generate_markdown_report(&report),
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Csv => report::generate_csv_report(&report)?,
    };

    let output_path = config.output_path(args.format);
    std::fs::write(&output_path, &rendered)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    if let Some(ref dir) = args.export_dir {
        report::write_exports(dir, &report)?;
    }

    // Print summary
    println!("\n📊 Workload Summary:");
    println!("   Groups: {}", summary.groups);
    println!(
        "   Rows aggregated: {} | without frequency: {}",
        report.metadata.rows_aggregated, report.metadata.rows_excluded
    );
    println!(
        "   ⚠️  Over monthly limit: {} | 🟢 Idle: {}",
        summary.overloaded_monthly, summary.idle
    );
    println!("   Total load: {:.1}h/month", summary.total_monthly_hours);
    if !report.unrecognized_frequencies.is_empty() {
        println!(
            "   ❓ Unrecognized frequency labels: {}",
            report.unrecognized_frequencies.len()
        );
    }
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        output_path.display()
    );

    // Check --fail-on-overload gate
    if args.fail_on_overload && output.has_overload() {
        eprintln!(
            "\n⛔ {} group(s) above the monthly limit. Failing (exit code 2).",
            summary.overloaded_monthly
        );
        return Ok(2);
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", config::DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
