//! CLI entry point for the song virality pipeline.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use dotenv::dotenv;
use polars::prelude::*;
use song_virality::config::DEFAULT_OUTPUT_NAME;
use song_virality::{
    AnalysisReport, Pipeline, PipelineConfig, PipelineResult, ReportGenerator, ViralityError,
    clean, io,
};
use song_virality::io::CsvFormat;
use std::path::Path;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Song dataset cleaning and virality analysis",
    long_about = "Cleans a song dataset, labels songs as viral by popularity and \
                  reports how audio features differ between viral and non-viral songs.\n\n\
                  EXAMPLES:\n  \
                  # Basic usage\n  \
                  song-virality -i spotify.csv\n\n  \
                  # Custom threshold and output location\n  \
                  song-virality -i spotify.csv --viral-threshold 75 -o results/\n\n  \
                  # Preview what cleaning would remove\n  \
                  song-virality -i spotify.csv --dry-run\n\n  \
                  # Machine-readable report\n  \
                  song-virality -i spotify.csv --json"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long)]
    input: String,

    /// Output directory for results
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Output file name for the cleaned dataset (without extension)
    #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
    output_name: String,

    /// Field separator of the input and output files
    #[arg(long, default_value = ",")]
    separator: char,

    /// Songs with popularity at or above this value are labeled viral
    #[arg(long, default_value = "80")]
    viral_threshold: f64,

    /// Number of genres to list in the viral genre ranking
    #[arg(long, default_value = "10")]
    top_genres: usize,

    /// Keep exact duplicate rows instead of removing them
    #[arg(long)]
    keep_duplicates: bool,

    /// Preview what cleaning would remove without writing any files
    #[arg(long)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output the analysis report as JSON to stdout
    ///
    /// Disables all logs; only the final JSON report is printed.
    /// Useful for piping to other tools: `... --json | jq .statistics.top_viral_genres`
    #[arg(long)]
    json: bool,

    /// Write the analysis report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled so stdout
/// carries only the JSON report.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load .env first so RUST_LOG set there reaches the filter
    dotenv().ok();

    init_logging(&args.log_level, args.quiet, args.json);

    let separator = separator_byte(args.separator)?;

    let config = PipelineConfig::builder()
        .viral_threshold(args.viral_threshold)
        .top_genres(args.top_genres)
        .remove_duplicates(!args.keep_duplicates)
        .output_dir(&args.output)
        .output_name(&args.output_name)
        .build()?;

    info!("Loading dataset from: {}", args.input);
    let format = CsvFormat::for_config(&config, separator);
    let data = io::load_csv_with_format(&args.input, &format)
        .with_context(|| format!("Failed to load {}", args.input))?;

    if args.dry_run {
        return run_dry_run(&args, &config, data);
    }

    let pipeline = build_pipeline(&args, config)?;
    run_pipeline(pipeline, &args, data, separator)
}

fn separator_byte(separator: char) -> Result<u8> {
    if !separator.is_ascii() {
        bail!("Separator must be a single ASCII character, got {:?}", separator);
    }
    Ok(separator as u8)
}

fn build_pipeline(args: &Args, config: PipelineConfig) -> Result<Pipeline> {
    let mut builder = Pipeline::builder().config(config);

    if !args.quiet {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Run dry-run mode: clean in memory and show what would be removed.
///
/// Uses `println!` for user-facing output, which stays visible regardless of
/// the log level.
fn run_dry_run(args: &Args, config: &PipelineConfig, data: DataFrame) -> Result<()> {
    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of cleaning actions");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", args.input);
    println!("  Rows: {}", data.height());
    println!("  Columns: {}", data.width());
    println!();

    println!("REQUIRED COLUMNS");
    println!("{}", "-".repeat(40));
    println!("{:<20} {:<12} {:<10}", "Column", "Type", "Missing");
    println!("{}", "-".repeat(44));
    for name in &config.required_columns {
        match data.column(name) {
            Ok(column) => println!(
                "{:<20} {:<12} {:<10}",
                truncate_str(name, 19),
                column.dtype().to_string(),
                column.null_count()
            ),
            Err(_) => println!("{:<20} {:<12}", truncate_str(name, 19), "MISSING"),
        }
    }
    println!();

    println!("CLEANING PREVIEW");
    println!("{}", "-".repeat(40));
    let (cleaned, report) = clean(data, config).map_err(|e| {
        println!("  Cleaning would fail: {}", e);
        pipeline_error(e)
    })?;
    for action in &report.actions {
        println!("  - {}", action);
    }
    println!(
        "  Rows: {} -> {} ({:.1}% removed)",
        report.rows_before,
        report.rows_after,
        report.rows_removed_percentage()
    );
    println!(
        "  Viral: {}  Non-viral: {}",
        report.viral_count,
        report.non_viral_count()
    );
    println!("  Columns after cleaning: {}", cleaned.width());
    println!();

    println!("OUTPUT FILES (will be created)");
    println!("{}", "-".repeat(40));
    println!("  - {}", config.output_path().display());
    if args.emit_report {
        println!(
            "  - {}/{}_report.json",
            args.output,
            extract_file_stem(&args.input)
        );
    }
    println!();

    println!("{}", "=".repeat(80));
    println!("To execute the cleaning, run without --dry-run");
    if !args.emit_report {
        println!("Add --emit-report to save a detailed JSON report");
    }
    println!("{}", "=".repeat(80));

    Ok(())
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

/// Run pipeline, export the cleaned dataset and print results
fn run_pipeline(pipeline: Pipeline, args: &Args, data: DataFrame, separator: u8) -> Result<()> {
    info!("{}", "=".repeat(80));
    info!("Starting song cleaning pipeline...");
    info!("{}", "=".repeat(80));

    let original_shape = data.shape();
    let mut result = pipeline.process(data).map_err(pipeline_error)?;

    let output_path = pipeline.config().output_path();
    io::write_csv(&mut result.data, &output_path, separator)
        .with_context(|| format!("Failed to write {}", output_path.display()))?;
    let output_file = output_path.to_string_lossy().to_string();

    let report = ReportGenerator::build_analysis_report(
        &args.input,
        Some(&output_file),
        &result,
        pipeline.config(),
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let input_stem = extract_file_stem(&args.input);
        let generator = ReportGenerator::new(&args.output);
        let report_path = generator.write_report_to_file(&report, &input_stem)?;
        info!("Report written to: {}", report_path.display());
    }

    print_human_readable_summary(&report, &result, original_shape);

    Ok(())
}

/// Input problems point at the dataset; anything else is a pipeline failure.
fn pipeline_error(e: ViralityError) -> anyhow::Error {
    let message = if e.is_input_error() {
        format!("Input dataset is not usable: {}", e)
    } else {
        format!("Pipeline failed: {}", e)
    };
    error!("{}", message);
    anyhow!(message)
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Print a human-readable summary of the cleaning and analysis results.
fn print_human_readable_summary(
    report: &AnalysisReport,
    result: &PipelineResult,
    original_shape: (usize, usize),
) {
    let cleaning = &report.cleaning;
    let stats = &report.statistics;

    println!();
    println!("{}", "=".repeat(80));
    println!("DATA CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input_file, original_shape.0, original_shape.1
    );
    if let Some(ref output_file) = report.output_file {
        println!(
            "Output: {} ({} rows x {} columns)",
            output_file,
            result.data.height(),
            result.data.width()
        );
    }
    println!();

    println!("Data Cleaning Summary:");
    for action in &cleaning.actions {
        println!("  - {}", action);
    }
    println!(
        "  Rows: {} -> {} ({} removed) in {}ms",
        cleaning.rows_before,
        cleaning.rows_after,
        cleaning.rows_removed(),
        report.duration_ms
    );
    println!(
        "  Viral: {}  Non-viral: {}",
        stats.viral_rows, stats.non_viral_rows
    );
    println!();

    println!("Cleaned Data Head:");
    println!("{}", result.data.head(Some(5)));
    println!();

    println!("Feature Means (viral vs non-viral):");
    for dist in &stats.distributions {
        println!(
            "  {:<20} {:>10} {:>10}",
            truncate_str(&dist.feature, 19),
            format_mean(dist.viral.mean),
            format_mean(dist.non_viral.mean)
        );
    }
    println!();

    match &stats.top_viral_genres {
        Some(genres) if genres.is_empty() => {
            println!(
                "No viral songs found to analyze genres or 'Genre' column has no data for viral songs."
            );
        }
        Some(genres) => {
            println!("Top {} Genres Among Viral Songs:", genres.len());
            for (rank, genre) in genres.iter().enumerate() {
                println!("  {:>2}. {:<30} {}", rank + 1, genre.genre, genre.count);
            }
        }
        None => {
            println!("Warning: 'Genre' column not found in the dataset. Skipping genre analysis.");
        }
    }
    println!();

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save detailed JSON report");
    println!("{}", "=".repeat(80));
}

fn format_mean(mean: Option<f64>) -> String {
    mean.map(|m| format!("{:.3}", m))
        .unwrap_or_else(|| "-".to_string())
}
