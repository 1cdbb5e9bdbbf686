use std::path::PathBuf;
use thiserror::Error;

/// Failure kinds raised while profiling a corpus.
///
/// `Parse`, `Structural` and `DepthExceeded` concern a single document and are
/// recovered by skipping it. The others end the run.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("input path does not exist: {}", path.display())]
    InputMissing { path: PathBuf },

    #[error("failed to parse document: {reason}")]
    Parse { reason: String },

    #[error("document root must be an object, found {found}")]
    Structural { found: &'static str },

    #[error("document nesting exceeds depth limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("failed to write report to {}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no documents were processed ({skipped} skipped)")]
    NoDocuments { skipped: usize },
}

impl ProfileError {
    pub fn parse(reason: impl ToString) -> Self {
        ProfileError::Parse {
            reason: reason.to_string(),
        }
    }

    /// Whether this error only disqualifies one document.
    pub fn is_per_document(&self) -> bool {
        matches!(
            self,
            ProfileError::Parse { .. }
                | ProfileError::Structural { .. }
                | ProfileError::DepthExceeded { .. }
        )
    }
}
