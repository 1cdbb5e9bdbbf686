//! Document sources
//!
//! Each source is a lazy iterator of `(DocumentId, Result<Value, ProfileError>)`.
//! A per-document failure is yielded in place of the document so the driver
//! can log it and carry on.

pub mod directory;
pub mod table;

use crate::error::ProfileError;
use crate::profile::types::DocumentId;
use serde_json::Value;

pub use directory::{DirectorySource, DirectorySourceConfig};
pub use table::{CsvSource, CsvSourceConfig};

/// One item produced by a document source
pub type SourceItem = (DocumentId, Result<Value, ProfileError>);
