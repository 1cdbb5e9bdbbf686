use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifies a document in log lines: a file name or a zero-based CSV data row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum DocumentId {
    File(String),
    Row(usize),
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentId::File(name) => write!(f, "{}", name),
            DocumentId::Row(idx) => write!(f, "row {}", idx),
        }
    }
}

/// Type label recorded for a leaf value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl PrimitiveType {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => PrimitiveType::Null,
            Value::Bool(_) => PrimitiveType::Boolean,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    PrimitiveType::Integer
                } else {
                    PrimitiveType::Number
                }
            }
            Value::String(_) => PrimitiveType::String,
            Value::Array(_) => PrimitiveType::Array,
            Value::Object(_) => PrimitiveType::Object,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Null => "null",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Number => "number",
            PrimitiveType::String => "string",
            PrimitiveType::Array => "array",
            PrimitiveType::Object => "object",
        }
    }
}

impl fmt::Display for PrimitiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-path counters accumulated across the corpus
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathStats {
    /// Documents (with list expansion) in which the path appears
    pub occurrences: usize,

    /// Subset of `occurrences` whose value passed the meaningfulness check
    pub meaningful_occurrences: usize,

    pub types: BTreeSet<PrimitiveType>,

    /// Stringified value -> count, in first-seen order. Only kept when the
    /// histogram is enabled.
    pub value_histogram: Option<IndexMap<String, usize>>,
}

impl PathStats {
    /// Type names sorted lexicographically
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.types.iter().map(|t| t.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Up to `limit` histogram entries by descending count. Ties keep
    /// first-seen order.
    pub fn top_values(&self, limit: usize) -> Vec<(&str, usize)> {
        let Some(histogram) = &self.value_histogram else {
            return Vec::new();
        };
        let mut entries = rank_counts(histogram);
        entries.truncate(limit);
        entries
    }
}

/// Entries of a value counter by descending count, ties in first-seen order
pub fn rank_counts(counts: &IndexMap<String, usize>) -> Vec<(&str, usize)> {
    let mut entries: Vec<(&str, usize)> = counts
        .iter()
        .map(|(value, count)| (value.as_str(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries
}

/// Aggregate table over every document absorbed so far
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusStats {
    pub paths: BTreeMap<String, PathStats>,
    pub documents: usize,

    /// Target field suffix -> stringified value -> count
    pub target_counts: BTreeMap<String, IndexMap<String, usize>>,
}

impl CorpusStats {
    pub fn get(&self, path: &str) -> Option<&PathStats> {
        self.paths.get(path)
    }
}

/// Configuration for flattening and aggregation
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    /// Maximum nesting depth before a document is rejected
    pub max_depth: usize,

    /// Keep a per-path histogram of stringified values
    pub value_histogram: bool,

    /// Path suffixes whose values feed the side counters, e.g. `musicGenre`
    pub target_fields: Vec<String>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        ProfileConfig {
            max_depth: 64,
            value_histogram: false,
            target_fields: vec![],
        }
    }
}

/// Render a leaf value the way it is keyed in histograms.
///
/// Strings are trimmed, `null` is rendered as `null`, numbers and booleans use
/// their JSON text and containers their compact JSON form.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::from("null"),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_type_from_value() {
        assert_eq!(PrimitiveType::from_value(&json!(3)), PrimitiveType::Integer);
        assert_eq!(PrimitiveType::from_value(&json!(u64::MAX)), PrimitiveType::Integer);
        assert_eq!(PrimitiveType::from_value(&json!(2.5)), PrimitiveType::Number);
        assert_eq!(PrimitiveType::from_value(&json!([])), PrimitiveType::Array);
        assert_eq!(PrimitiveType::from_value(&json!({})).as_str(), "object");
    }

    #[test]
    fn test_type_names_are_sorted() {
        let mut stats = PathStats::default();
        stats.types.insert(PrimitiveType::String);
        stats.types.insert(PrimitiveType::Integer);
        stats.types.insert(PrimitiveType::Null);
        assert_eq!(stats.type_names(), vec!["integer", "null", "string"]);
    }

    #[test]
    fn test_top_values_ties_keep_insertion_order() {
        let mut histogram = IndexMap::new();
        histogram.insert("b".to_string(), 1);
        histogram.insert("a".to_string(), 3);
        histogram.insert("c".to_string(), 1);
        let stats = PathStats {
            value_histogram: Some(histogram),
            ..Default::default()
        };

        assert_eq!(stats.top_values(10), vec![("a", 3), ("b", 1), ("c", 1)]);
        assert_eq!(stats.top_values(2), vec![("a", 3), ("b", 1)]);
    }

    #[test]
    fn test_stringify_value() {
        assert_eq!(stringify_value(&json!("  rock ")), "rock");
        assert_eq!(stringify_value(&json!(null)), "null");
        assert_eq!(stringify_value(&json!(10)), "10");
        assert_eq!(stringify_value(&json!(1.5)), "1.5");
        assert_eq!(stringify_value(&json!(false)), "false");
        assert_eq!(stringify_value(&json!([])), "[]");
        assert_eq!(stringify_value(&json!({})), "{}");
    }

    #[test]
    fn test_document_id_display() {
        assert_eq!(DocumentId::File("a.json".into()).to_string(), "a.json");
        assert_eq!(DocumentId::Row(4).to_string(), "row 4");
    }
}
