use crate::error::ProfileError;
use crate::profile::types::DocumentId;
use crate::source::SourceItem;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::vec::IntoIter;

/// Configuration for reading one document per `.json` file
#[derive(Debug, Clone)]
pub struct DirectorySourceConfig {
    pub dir: PathBuf,

    /// Only read the first N files
    pub limit: Option<usize>,
}

impl DirectorySourceConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySourceConfig {
            dir: dir.into(),
            limit: None,
        }
    }
}

/// Lazily reads and parses `.json` files directly inside a directory.
///
/// File names are sorted before the limit is applied so repeated runs see
/// the same documents in the same order. Subdirectories are not searched.
pub struct DirectorySource {
    files: IntoIter<PathBuf>,
}

impl DirectorySource {
    pub fn open(config: &DirectorySourceConfig) -> Result<Self> {
        if !config.dir.is_dir() {
            return Err(ProfileError::InputMissing {
                path: config.dir.clone(),
            }
            .into());
        }

        let mut files = Vec::new();
        let entries = std::fs::read_dir(&config.dir)
            .with_context(|| format!("Failed to list directory: {}", config.dir.display()))?;
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            let is_json = path
                .file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.ends_with(".json"));
            if is_json && entry.file_type().map_or(false, |t| t.is_file()) {
                files.push(path);
            }
        }

        files.sort();
        if let Some(limit) = config.limit {
            files.truncate(limit);
        }

        Ok(DirectorySource {
            files: files.into_iter(),
        })
    }
}

impl Iterator for DirectorySource {
    type Item = SourceItem;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.next()?;
        let id = DocumentId::File(file_name(&path));
        Some((id, read_document(&path)))
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Nesting accepted before deserializing; matches serde_json's recursion limit
const MAX_NESTING: usize = 128;

/// Read a whole file and parse it with simd-json
fn read_document(path: &Path) -> Result<Value, ProfileError> {
    let mut content = std::fs::read(path).map_err(ProfileError::parse)?;
    check_nesting(&content, MAX_NESTING)?;
    simd_json::serde::from_slice::<Value>(&mut content).map_err(ProfileError::parse)
}

/// Reject input whose bracket nesting exceeds `limit`.
///
/// simd-json's serde path recurses without a bound, so this runs on the raw
/// bytes first. Brackets inside string literals are ignored.
fn check_nesting(bytes: &[u8], limit: usize) -> Result<(), ProfileError> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for &b in bytes {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' | b'[' => {
                depth += 1;
                if depth > limit {
                    return Err(ProfileError::DepthExceeded { limit });
                }
            }
            b'}' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}
