//! # Schema Profiler - JSON field frequency reports
//!
//! Scans a corpus of semi-structured JSON documents and reports, for every
//! dotted leaf path, how often it appears, how often it carries a meaningful
//! value and which primitive types were seen there.
//!
//! ## Modules
//!
//! - **source**: read documents from a directory of `.json` files or from JSON
//!   cells of a CSV export
//! - **profile**: flatten, classify, aggregate and report
//!
//! ## Quick Start
//!
//! ```rust
//! use schema_profiler::profile::{Aggregator, DocumentId, ProfileConfig};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut aggregator = Aggregator::new(ProfileConfig::default());
//! aggregator.absorb(
//!     &DocumentId::File("a.json".into()),
//!     &json!({"title": "Row", "stats": {"views": 10}}),
//! )?;
//!
//! let stats = aggregator.stats();
//! assert_eq!(stats.get("stats.views").unwrap().occurrences, 1);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

pub mod error;
pub mod profile;
pub mod source;

pub use error::ProfileError;
pub use profile::{
    Aggregator, CorpusStats, DocumentId, ProfileConfig, ReportConfig, ReportWriter,
};
pub use source::{
    CsvSource, CsvSourceConfig, DirectorySource, DirectorySourceConfig, SourceItem,
};

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub documents: usize,
    pub skipped: usize,
    pub paths: usize,
}

/// Where and how a scan writes its results
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub output: PathBuf,
    pub profile: ProfileConfig,
    pub report: ReportConfig,

    /// Optional JSON dump of the target-field side counters
    pub targets_output: Option<PathBuf>,
}

impl ScanOptions {
    /// Comma-delimited report without a value histogram
    pub fn directory(output: impl Into<PathBuf>) -> Self {
        ScanOptions {
            output: output.into(),
            profile: ProfileConfig::default(),
            report: ReportConfig::directory(),
            targets_output: None,
        }
    }

    /// `*`-delimited report with the most frequent values per path
    pub fn csv(output: impl Into<PathBuf>) -> Self {
        ScanOptions {
            output: output.into(),
            profile: ProfileConfig {
                value_histogram: true,
                ..Default::default()
            },
            report: ReportConfig::csv(),
            targets_output: None,
        }
    }
}

/// Feed every item of `source` into `aggregator`.
///
/// Per-document failures are logged and counted as skipped. The caller may
/// stop early by bounding the iterator; the aggregator stays consistent.
pub fn profile_documents<I>(source: I, aggregator: &mut Aggregator) -> RunSummary
where
    I: IntoIterator<Item = SourceItem>,
{
    let mut summary = RunSummary::default();

    for (id, parsed) in source {
        let outcome = parsed.and_then(|document| aggregator.absorb(&id, &document));
        match outcome {
            Ok(()) => summary.documents += 1,
            Err(e) => {
                debug_assert!(e.is_per_document(), "fatal error from a document source: {}", e);
                warn!(document = %id, error = %e, "skipping document");
                summary.skipped += 1;
            }
        }
    }

    summary.paths = aggregator.stats().paths.len();
    summary
}

/// Profile a directory of `.json` files and write the report
pub fn scan_directory(
    source: &DirectorySourceConfig,
    options: &ScanOptions,
) -> Result<RunSummary> {
    let documents = DirectorySource::open(source)?;
    let mut aggregator = Aggregator::new(options.profile.clone());
    let summary = profile_documents(documents, &mut aggregator);
    finish(aggregator, summary, options)
}

/// Profile the JSON cells of a CSV export and write the report
pub fn scan_csv(source: &CsvSourceConfig, options: &ScanOptions) -> Result<RunSummary> {
    let documents = CsvSource::open(source)?;
    let mut aggregator = Aggregator::new(options.profile.clone());
    let summary = profile_documents(documents, &mut aggregator);
    finish(aggregator, summary, options)
}

fn finish(
    aggregator: Aggregator,
    summary: RunSummary,
    options: &ScanOptions,
) -> Result<RunSummary> {
    if summary.documents == 0 {
        return Err(ProfileError::NoDocuments {
            skipped: summary.skipped,
        }
        .into());
    }

    let stats = aggregator.into_stats();
    for (target, counts) in &stats.target_counts {
        let ranked = profile::rank_counts(counts);
        info!(target_field = %target, values = ?ranked, "target field counts");
    }

    // Both outputs are rendered before either is written
    let report = ReportWriter::new(options.report.clone()).render(&stats)?;
    let targets = match &options.targets_output {
        Some(path) => Some((path, render_target_counts(&stats)?)),
        None => None,
    };

    profile::write_output(&options.output, &report)?;
    if let Some((path, json)) = targets {
        if let Err(e) = profile::write_output(path, json.as_bytes()) {
            // Discard the report so a failed run leaves no partial results
            if let Err(remove_err) = std::fs::remove_file(&options.output) {
                warn!(
                    output = %options.output.display(),
                    error = %remove_err,
                    "failed to remove report"
                );
            }
            return Err(e.into());
        }
    }

    info!(
        documents = summary.documents,
        skipped = summary.skipped,
        paths = summary.paths,
        output = %options.output.display(),
        "profile complete"
    );
    Ok(summary)
}

/// Render the side counters as pretty JSON, values by descending count
fn render_target_counts(stats: &CorpusStats) -> Result<String> {
    let ranked: BTreeMap<&str, Vec<(&str, usize)>> = stats
        .target_counts
        .iter()
        .map(|(target, counts)| (target.as_str(), profile::rank_counts(counts)))
        .collect();
    serde_json::to_string_pretty(&ranked).context("Failed to serialize target counts")
}
