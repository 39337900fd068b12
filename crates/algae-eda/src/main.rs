//! CLI entry point for the algae exploratory analysis.

use algae_eda::{
    AlgaeBundle, AnalysisConfig, AnalysisReport, CentralValue, ColumnPlots, ColumnSummary,
    DataProfiler, Dataset, DatasetSummary, FilterMode, FilterOutcome, ReportWriter,
    StatisticalImputer, filter_sparse_rows,
};
use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// CLI-compatible central value enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCentralValue {
    /// Use the mean of non-null values
    Mean,
    /// Use the median of non-null values
    Median,
}

impl From<CliCentralValue> for CentralValue {
    fn from(cli: CliCentralValue) -> Self {
        match cli {
            CliCentralValue::Mean => CentralValue::Mean,
            CliCentralValue::Median => CentralValue::Median,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "algae-eda",
    version,
    about = "Exploratory analysis of river water-quality and algae samples",
    long_about = "Exploratory analysis of river water-quality samples and algae frequencies.\n\n\
                  Missing cells are written as NA or XXXXXXX in the input files.\n\n\
                  EXAMPLES:\n  \
                  # Descriptive statistics of the training table\n  \
                  algae-eda --data-dir data/ summary\n\n  \
                  # Rows with at least 20% of their cells missing\n  \
                  algae-eda --data-dir data/ filter --prop 0.2 --indices\n\n  \
                  # Fill Chla with its median and write the table as CSV\n  \
                  algae-eda -i data/analysis.csv impute --column Chla --method median\n\n  \
                  # mxPH against size, one panel per quartile of mnO2\n  \
                  algae-eda --data-dir data/ plots --column mxPH --y size --facet mnO2\n\n  \
                  # Full workflow report written to the output directory\n  \
                  algae-eda --data-dir data/ report --emit-report"
)]
struct Cli {
    /// Directory holding analysis.csv and, optionally, the evaluation tables
    #[arg(short, long, global = true, conflicts_with = "input")]
    data_dir: Option<PathBuf>,

    /// A single CSV file to analyse instead of a directory
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    /// JSON file with analysis settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output directory for reports (overrides the config file)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable text
    ///
    /// Disables all progress logs.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Descriptive statistics and frequency tables
    Summary,

    /// Flag or drop rows with too many missing cells
    Filter(FilterArgs),

    /// Fill the missing cells of a numeric column and print the table as CSV
    Impute(ImputeArgs),

    /// Plot-ready data for a numeric column, as JSON
    Plots(PlotsArgs),

    /// Run the whole exploratory workflow
    Report(ReportArgs),
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Missing-cell ratio at or above which a row is flagged (0.0 - 1.0)
    ///
    /// Defaults to missing_row_threshold from the configuration
    #[arg(short, long)]
    prop: Option<f64>,

    /// Print the 0-based indices of flagged rows instead of the filtered table
    #[arg(long)]
    indices: bool,
}

#[derive(Args, Debug)]
struct ImputeArgs {
    /// Numeric column to fill
    #[arg(long)]
    column: String,

    /// Statistic written into the missing cells
    #[arg(long, value_enum, default_value = "median")]
    method: CliCentralValue,
}

#[derive(Args, Debug)]
struct PlotsArgs {
    /// Numeric column to plot
    #[arg(long)]
    column: String,

    /// Categorical column for grouped box and violin plots
    #[arg(long)]
    group: Option<String>,

    /// Column plotted against --column in the faceted scatter plot
    #[arg(long, requires = "facet")]
    y: Option<String>,

    /// Numeric column whose quantile intervals split the scatter plot into
    /// panels (cut points from quantile_probs in the configuration)
    #[arg(long, requires = "y")]
    facet: Option<String>,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Write the JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Data loaded from the command line sources.
struct Source {
    dataset: Dataset,
    bundle: Option<AlgaeBundle>,
    /// Base name for written reports
    stem: String,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    // stdout carries the CSV and JSON output
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.quiet, cli.json);

    let config = load_config(&cli)?;
    let source = load_source(&cli)?;
    debug!("Loaded {:?} table as '{}'", source.dataset.shape(), source.stem);

    match &cli.command {
        Commands::Summary => run_summary(&cli, &source),
        Commands::Filter(args) => run_filter(&cli, &source, &config, args),
        Commands::Impute(args) => run_impute(&source, args),
        Commands::Plots(args) => run_plots(&source, &config, args),
        Commands::Report(args) => run_report(&cli, &source, &config, args),
    }
}

/// Read the configuration file, if any, and apply command line overrides.
fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            AnalysisConfig::from_json_file(path)?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    Ok(config)
}

fn load_source(cli: &Cli) -> Result<Source> {
    match (&cli.data_dir, &cli.input) {
        (Some(dir), _) => {
            let bundle = AlgaeBundle::load_dir(dir)?;
            Ok(Source {
                dataset: bundle.training.clone(),
                bundle: Some(bundle),
                stem: "analysis".to_string(),
            })
        }
        (None, Some(input)) => {
            if !input.exists() {
                return Err(anyhow!("Input file not found: {}", input.display()));
            }
            info!("Loading dataset from: {}", input.display());
            let dataset = Dataset::from_csv(input)?;
            info!("Dataset loaded successfully: {:?}", dataset.shape());
            Ok(Source {
                dataset,
                bundle: None,
                stem: extract_file_stem(input),
            })
        }
        (None, None) => Err(anyhow!("Either --data-dir or --input is required")),
    }
}

fn run_summary(cli: &Cli, source: &Source) -> Result<()> {
    let summary = DataProfiler::summarize(&source.dataset)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn run_filter(
    cli: &Cli,
    source: &Source,
    config: &AnalysisConfig,
    args: &FilterArgs,
) -> Result<()> {
    let prop = args.prop.unwrap_or(config.missing_row_threshold);
    let mode = if args.indices {
        FilterMode::Indices
    } else {
        FilterMode::Filtered
    };

    match filter_sparse_rows(&source.dataset, prop, mode)? {
        FilterOutcome::Indices(indices) => {
            info!("{} row(s) at or above {:.0}% missing", indices.len(), prop * 100.0);
            if cli.json {
                println!("{}", serde_json::to_string(&indices)?);
            } else {
                for index in indices {
                    println!("{}", index);
                }
            }
        }
        FilterOutcome::Filtered(kept) => {
            info!(
                "Kept {} of {} rows below {:.0}% missing",
                kept.height(),
                source.dataset.height(),
                prop * 100.0
            );
            write_csv(kept)?;
        }
    }
    Ok(())
}

fn run_impute(source: &Source, args: &ImputeArgs) -> Result<()> {
    let imputed =
        StatisticalImputer::impute_column(&source.dataset, &args.column, args.method.into())?;
    info!("{}", imputed.describe());
    write_csv(imputed.dataset)
}

fn run_plots(source: &Source, config: &AnalysisConfig, args: &PlotsArgs) -> Result<()> {
    let mut plots =
        ColumnPlots::build(&source.dataset, &args.column, args.group.as_deref(), config)?;
    if let (Some(y), Some(facet)) = (&args.y, &args.facet) {
        plots = plots.with_faceted_scatter(&source.dataset, y, facet, config)?;
    }
    println!("{}", serde_json::to_string_pretty(&plots)?);
    Ok(())
}

/// Output behavior:
/// - Default: Print human-readable summary to stdout
/// - `--json`: Print JSON to stdout only (no logs)
/// - `--emit-report`: Write JSON report to file
fn run_report(
    cli: &Cli,
    source: &Source,
    config: &AnalysisConfig,
    args: &ReportArgs,
) -> Result<()> {
    let report = match &source.bundle {
        Some(bundle) => AnalysisReport::from_bundle(bundle, config)?,
        None => {
            let report = AnalysisReport::build(&source.dataset, config)?;
            match &cli.input {
                Some(input) => report.with_source(input),
                None => report,
            }
        }
    };

    if args.emit_report {
        let writer = ReportWriter::from_config(config);
        let report_path = writer.write_report_to_file(&report, &source.stem)?;
        info!("Report written to: {}", report_path.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    Ok(())
}

/// Write a table as CSV to stdout.
fn write_csv(dataset: Dataset) -> Result<()> {
    let mut frame = dataset.into_frame();
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    CsvWriter::new(&mut handle)
        .include_header(true)
        .with_separator(b',')
        .with_null_value("NA".to_string())
        .finish(&mut frame)?;
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.2}", v))
        .unwrap_or_else(|| "-".to_string())
}

/// Print descriptive statistics as tables.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn print_summary(summary: &DatasetSummary) {
    println!("\n{}", "=".repeat(80));
    println!("DATASET SUMMARY");
    println!("{}\n", "=".repeat(80));

    println!("  Rows: {}", summary.rows);
    println!("  Columns: {}", summary.columns);
    println!("  Missing cells: {}", summary.missing_cells);
    println!("  Complete rows: {}", summary.complete_rows);
    println!();

    println!("NUMERIC COLUMNS");
    println!("{}", "-".repeat(40));
    println!(
        "{:<10} {:>6} {:>5} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "Column", "n", "NA", "Mean", "Std", "Min", "Median", "Q3", "Max"
    );
    println!("{}", "-".repeat(80));
    for column in &summary.column_summaries {
        if let ColumnSummary::Numeric { name, stats } = column {
            println!(
                "{:<10} {:>6} {:>5} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
                truncate_str(name, 10),
                stats.count,
                stats.missing,
                fmt_opt(stats.mean),
                fmt_opt(stats.std),
                fmt_opt(stats.min),
                fmt_opt(stats.median),
                fmt_opt(stats.q3),
                fmt_opt(stats.max)
            );
        }
    }
    println!();

    println!("CATEGORICAL COLUMNS");
    println!("{}", "-".repeat(40));
    for column in &summary.column_summaries {
        if let ColumnSummary::Categorical { name, table } = column {
            let levels: Vec<String> = table
                .levels
                .iter()
                .map(|l| format!("{}: {}", l.level, l.count))
                .collect();
            println!("  {:<10} {}  (NA: {})", name, levels.join(", "), table.missing);
        }
    }
    println!();
}

/// Print a human-readable version of the workflow report.
fn print_report(report: &AnalysisReport) {
    print_summary(&report.summary);

    println!("TABLES");
    println!("{}", "-".repeat(40));
    for table in &report.tables {
        println!(
            "  {:<16} {} rows x {} columns, {} missing cells",
            table.name, table.rows, table.columns, table.missing_cells
        );
    }
    println!();

    let missing = &report.missing_values;
    println!("MISSING VALUES");
    println!("{}", "-".repeat(40));
    println!(
        "  Drop incomplete rows: {} -> {} rows",
        report.shape.0, missing.rows_after_deletion
    );
    println!(
        "  Drop rows >= {:.0}% missing: {} -> {} rows {:?}",
        missing.threshold * 100.0,
        report.shape.0,
        missing.rows_after_filter,
        missing.sparse_rows
    );
    for preview in &missing.imputations {
        println!(
            "  Fill '{}' with {}: {:.4} ({} cells)",
            preview.column, preview.method, preview.fill_value, preview.filled
        );
    }
    println!();

    if let Some(correlations) = &report.correlations {
        println!("STRONG CORRELATIONS (|r| >= 0.7)");
        println!("{}", "-".repeat(40));
        let pairs = correlations.strong_pairs(0.7);
        if pairs.is_empty() {
            println!("  None over {} complete rows", correlations.observations);
        }
        for (a, b, r) in pairs {
            println!("  {:<8} ~ {:<8} r = {:+.3}", a, b, r);
        }
        println!();
    }

    if !report.warnings.is_empty() {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
        println!();
    }

    println!("Generated at {}", report.generated_at);
}
