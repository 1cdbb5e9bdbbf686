//! Schema profiling - per-path frequency statistics over JSON documents
//!
//! The pipeline runs leaves first: a document is flattened into dotted leaf
//! paths, each leaf is classified as meaningful or a placeholder, the
//! aggregator folds the results into [`CorpusStats`], and the report writer
//! renders them as a delimited table sorted by path.

pub mod types;
pub mod flatten;
pub mod meaningful;
pub mod aggregator;
pub mod report;

pub use types::{
    rank_counts, stringify_value, CorpusStats, DocumentId, PathStats, PrimitiveType, ProfileConfig,
};
pub use flatten::{Flattener, LeafPaths};
pub use meaningful::is_meaningful;
pub use aggregator::Aggregator;
pub use report::{write_output, ReportConfig, ReportWriter};
