//! schema-profile: Report field frequencies across heterogeneous JSON documents
//!
//! Usage:
//!   # One document per .json file, comma-delimited report
//!   schema-profile scan-dir ./payloads -o schema_report.csv
//!
//!   # Only the first 500 files
//!   schema-profile scan-dir ./payloads --limit 500
//!
//!   # JSON cells of a CSV export, rows whose source column mentions spotify
//!   schema-profile scan-csv export.csv --target musicGenre --target workoutTypes
//!
//! Exits non-zero when the input is missing, the report cannot be written,
//! or no document could be processed.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use schema_profiler::{
    scan_csv, scan_directory, CsvSourceConfig, DirectorySourceConfig, ScanOptions,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "schema-profile")]
#[command(
    about = "Report field frequencies across heterogeneous JSON documents",
    long_about = None
)]
struct Cli {
    /// Log every absorbed document
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Maximum nesting depth before a document is rejected (default: 64)
    #[arg(long, global = true)]
    max_depth: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Profile a directory with one JSON document per file
    ScanDir {
        /// Directory containing .json files (not searched recursively)
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Report file
        #[arg(long, short = 'o', default_value = "schema_report.csv")]
        output: PathBuf,

        /// Only read the first N files
        #[arg(long)]
        limit: Option<usize>,

        #[command(flatten)]
        format: FormatArgs,
    },

    /// Profile JSON documents embedded in a CSV column
    ScanCsv {
        /// CSV file with a header row
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        /// Report file
        #[arg(long, short = 'o', default_value = "schema_report_csv.txt")]
        output: PathBuf,

        /// Zero-based column holding the JSON payload
        #[arg(long, default_value_t = 7)]
        json_column: usize,

        /// Zero-based column holding the source marker
        #[arg(long, default_value_t = 11)]
        marker_column: usize,

        /// Case-insensitive substring the marker must contain
        #[arg(long, default_value = "spotify")]
        marker: String,

        /// Number of most frequent values listed per path
        #[arg(long, default_value_t = 100)]
        top_values: usize,

        /// Path suffix whose values are counted separately (repeatable)
        #[arg(long = "target", value_name = "FIELD")]
        targets: Vec<String>,

        /// Write the target-field counts as JSON to this file
        #[arg(long)]
        targets_output: Option<PathBuf>,

        #[command(flatten)]
        format: FormatArgs,
    },
}

#[derive(Args, Debug)]
struct FormatArgs {
    /// Single-character field delimiter (default: "," for scan-dir, "*" for scan-csv)
    #[arg(long)]
    delimiter: Option<char>,
}

impl FormatArgs {
    fn apply(&self, options: &mut ScanOptions) -> Result<()> {
        if let Some(c) = self.delimiter {
            if !c.is_ascii() {
                bail!("delimiter must be a single ASCII character, got {:?}", c);
            }
            options.report.delimiter = c as u8;
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::ScanDir {
            dir,
            output,
            limit,
            format,
        } => {
            let mut options = ScanOptions::directory(output);
            if let Some(depth) = args.max_depth {
                options.profile.max_depth = depth;
            }
            format.apply(&mut options)?;

            let source = DirectorySourceConfig { dir, limit };
            scan_directory(&source, &options)?;
        }
        Command::ScanCsv {
            csv,
            output,
            json_column,
            marker_column,
            marker,
            top_values,
            targets,
            targets_output,
            format,
        } => {
            let mut options = ScanOptions::csv(output);
            if let Some(depth) = args.max_depth {
                options.profile.max_depth = depth;
            }
            options.profile.target_fields = targets;
            options.report.top_values = top_values;
            options.targets_output = targets_output;
            format.apply(&mut options)?;

            let source = CsvSourceConfig {
                path: csv,
                json_column,
                marker_column,
                marker,
            };
            scan_csv(&source, &options)?;
        }
    }

    Ok(())
}
