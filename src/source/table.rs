use crate::error::ProfileError;
use crate::profile::types::DocumentId;
use crate::source::SourceItem;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs::File;
use std::path::PathBuf;

/// Configuration for documents embedded as JSON cells in a CSV export
#[derive(Debug, Clone)]
pub struct CsvSourceConfig {
    pub path: PathBuf,

    /// Zero-based column holding the JSON payload
    pub json_column: usize,

    /// Zero-based column holding the source marker
    pub marker_column: usize,

    /// Case-insensitive substring a row's marker must contain
    pub marker: String,
}

impl CsvSourceConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSourceConfig {
            path: path.into(),
            json_column: 7,
            marker_column: 11,
            marker: String::from("spotify"),
        }
    }
}

/// Lazily yields the JSON payloads of rows whose marker matches.
///
/// Rows with a non-matching marker, or whose JSON cell is blank or does not
/// start with `{`, are skipped silently. The document-id is the zero-based
/// data row index (the header row is not counted).
pub struct CsvSource {
    records: csv::StringRecordsIntoIter<File>,
    json_column: usize,
    marker_column: usize,
    marker: String,
    row: usize,
}

impl CsvSource {
    pub fn open(config: &CsvSourceConfig) -> Result<Self> {
        if !config.path.is_file() {
            return Err(ProfileError::InputMissing {
                path: config.path.clone(),
            }
            .into());
        }

        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&config.path)
            .with_context(|| format!("Failed to open CSV: {}", config.path.display()))?;

        Ok(CsvSource {
            records: reader.into_records(),
            json_column: config.json_column,
            marker_column: config.marker_column,
            marker: config.marker.to_lowercase(),
            row: 0,
        })
    }

    fn parse_record(&self, record: &csv::StringRecord) -> Option<Result<Value, ProfileError>> {
        let marker = record.get(self.marker_column).unwrap_or("").to_lowercase();
        if !marker.contains(&self.marker) {
            return None;
        }

        let cell = record.get(self.json_column)?;
        if !cell.trim_start().starts_with('{') {
            return None;
        }

        Some(parse_object(cell))
    }
}

impl Iterator for CsvSource {
    type Item = SourceItem;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = self.records.next()?;
            let id = DocumentId::Row(self.row);
            self.row += 1;

            match record {
                Err(e) => return Some((id, Err(ProfileError::parse(e)))),
                Ok(record) => {
                    if let Some(result) = self.parse_record(&record) {
                        return Some((id, result));
                    }
                }
            }
        }
    }
}

fn parse_object(cell: &str) -> Result<Value, ProfileError> {
    let value: Value = serde_json::from_str(cell).map_err(ProfileError::parse)?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(ProfileError::parse("JSON cell is not an object"))
    }
}
