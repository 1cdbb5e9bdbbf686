use crate::error::ProfileError;
use crate::profile::types::CorpusStats;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

/// Layout of the delimited report
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Field delimiter
    pub delimiter: u8,

    /// Emit the `most frequent values` column
    pub include_values: bool,

    /// Maximum entries listed in the `most frequent values` column
    pub top_values: usize,
}

impl ReportConfig {
    /// Comma-delimited, no value column
    pub fn directory() -> Self {
        ReportConfig {
            delimiter: b',',
            include_values: false,
            top_values: 100,
        }
    }

    /// `*`-delimited, with the value column
    pub fn csv() -> Self {
        ReportConfig {
            delimiter: b'*',
            include_values: true,
            top_values: 100,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig::directory()
    }
}

/// Renders [`CorpusStats`] as one row per leaf path, sorted by path
pub struct ReportWriter {
    config: ReportConfig,
}

impl ReportWriter {
    pub fn new(config: ReportConfig) -> Self {
        ReportWriter { config }
    }

    /// Write the header and all rows to `writer`
    pub fn write<W: Write>(&self, stats: &CorpusStats, writer: W) -> Result<()> {
        let mut out = csv::WriterBuilder::new()
            .delimiter(self.config.delimiter)
            .from_writer(writer);

        let mut header = vec!["", "field count", "non empty count", "data types"];
        if self.config.include_values {
            header.push("most frequent values");
        }
        out.write_record(&header).context("Failed to write report header")?;

        // BTreeMap iteration is already sorted by path
        for (path, path_stats) in &stats.paths {
            let mut row = vec![
                path.clone(),
                path_stats.occurrences.to_string(),
                path_stats.meaningful_occurrences.to_string(),
                path_stats.type_names().join(", "),
            ];
            if self.config.include_values {
                let values: Vec<String> = path_stats
                    .top_values(self.config.top_values)
                    .into_iter()
                    .map(|(value, count)| format!("{} ({})", value, count))
                    .collect();
                row.push(values.join("; "));
            }
            out.write_record(&row)
                .with_context(|| format!("Failed to write report row for {}", path))?;
        }

        out.flush().context("Failed to flush report")?;
        Ok(())
    }

    /// Render the whole report in memory
    pub fn render(&self, stats: &CorpusStats) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(stats, &mut buffer)?;
        Ok(buffer)
    }
}

/// Write a finished output file, mapping failures to [`ProfileError::Output`]
pub fn write_output(path: &Path, contents: &[u8]) -> Result<(), ProfileError> {
    std::fs::write(path, contents).map_err(|source| ProfileError::Output {
        path: path.to_path_buf(),
        source,
    })
}
