//! crm-columns CLI - CRM export column detector

use clap::Parser;
use crm_columns::{ColumnDetector, ColumnType, Importance, SampleSize, UploadSummary};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Semantic column-type detector for CRM exports.
///
/// Reads CSV or XLSX customer exports and reports which columns hold
/// customer ids, emails, revenue, purchase dates and other CRM fields.
#[derive(Parser, Debug)]
#[command(name = "crm-columns")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input export file(s) to inspect
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Number of rows sampled per column (default: 10)
    #[arg(short = 'n', long, default_value = "10")]
    sample_rows: usize,

    /// Sample every row instead of the leading ones
    #[arg(short = 'a', long)]
    all: bool,

    /// Number of preview rows included in JSON output (default: 100)
    #[arg(short = 'p', long, default_value = "100")]
    preview: usize,

    /// Worksheet to read from workbook exports (default: first sheet)
    #[arg(long)]
    sheet: Option<String>,

    /// Force specific delimiter for delimited exports (single character)
    #[arg(short = 'd', long)]
    delimiter: Option<char>,

    /// Output format: text (default) or json
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let detector = match build_detector(&args) {
        Ok(detector) => detector,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Files are detected in parallel; results are reported in argument order.
    let results: Vec<_> = args
        .files
        .par_iter()
        .map(|path| detector.detect_path(path))
        .collect();

    let mut exit_code = ExitCode::SUCCESS;

    for (path, result) in args.files.iter().zip(results) {
        match result {
            Ok(summary) => match args.format {
                OutputFormat::Text => print_text_output(path, &summary),
                OutputFormat::Json => {
                    if let Err(e) = print_json_output(&summary) {
                        eprintln!("Error writing {}: {}", path.display(), e);
                        exit_code = ExitCode::FAILURE;
                    }
                }
            },
            Err(e) => {
                eprintln!("Error processing {}: {}", path.display(), e);
                exit_code = ExitCode::FAILURE;
            }
        }
    }

    exit_code
}

/// Route `tracing` events to stderr. `RUST_LOG` overrides the `-v` level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("crm_columns={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_detector(args: &Args) -> Result<ColumnDetector, String> {
    let mut detector = ColumnDetector::new();

    if args.all {
        detector.sample_size(SampleSize::All);
    } else {
        detector.sample_size(SampleSize::Rows(args.sample_rows));
    }

    detector.preview_rows(args.preview);

    if let Some(ref sheet) = args.sheet {
        detector.sheet(sheet.clone());
    }

    if let Some(delim) = args.delimiter {
        if !delim.is_ascii() {
            return Err(format!("delimiter must be a single ASCII character: {delim:?}"));
        }
        detector.delimiter(delim as u8);
    }

    Ok(detector)
}

fn print_text_output(path: &Path, summary: &UploadSummary) {
    println!("File: {}", path.display());
    println!("  Kind: {}", summary.kind);
    println!("  Rows: {}", summary.row_count);
    println!(
        "  Columns: {} ({} mapped)",
        summary.columns.len(),
        summary.mapping.mapped_count()
    );

    let width = summary
        .columns
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0);

    for column in &summary.columns {
        let column_type = summary.mapping.column_type(column);
        println!(
            "    {column:<width$}  {}{}",
            column_type.label(),
            importance_marker(column_type)
        );
    }

    if !summary.mapping.unmapped.is_empty() {
        println!("  Unmapped: {}", summary.mapping.unmapped.join(", "));
    }

    println!();
}

fn importance_marker(column_type: ColumnType) -> &'static str {
    if column_type.is_unknown() {
        return "";
    }
    match column_type.importance() {
        Importance::High => " [high]",
        Importance::Medium => " [medium]",
        Importance::Low => "",
    }
}

fn print_json_output(summary: &UploadSummary) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string(summary)?);
    Ok(())
}
