//! Flatten a nested document into dotted leaf paths
//!
//! Object keys become path segments, and so do the indices of objects inside
//! lists. Scalars, nulls and empty containers are leaves.
//!
//! ## Path ambiguity
//!
//! Segments are joined with `.` and never quoted. A key that contains a dot
//! (`{"a.b": 1}`) produces the same path as a nested object (`{"a": {"b": 1}}`),
//! and a numeric key (`{"xs": {"0": ..}}`) matches a list index. When two
//! branches of one document map to the same path, the branch visited later
//! overwrites the earlier value. Existing report consumers depend on these
//! column names, so the format is kept as it is.
//!
//! ## Scalar list elements
//!
//! Only object elements of a list are traversed. Scalars and nested lists
//! inside a non-empty list produce no paths at all; use the aggregator's
//! target-field counters to observe such values.

use crate::error::ProfileError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Leaf path -> leaf value, borrowing from the source document
pub type LeafPaths<'a> = BTreeMap<String, &'a Value>;

/// Depth-first flattener with a nesting limit
#[derive(Debug, Clone)]
pub struct Flattener {
    max_depth: usize,
}

impl Flattener {
    pub fn new(max_depth: usize) -> Self {
        Flattener { max_depth }
    }

    /// Flatten one document into its leaf paths.
    ///
    /// An object root is never a leaf itself, so `{}` yields no paths.
    pub fn flatten<'a>(&self, document: &'a Value) -> Result<LeafPaths<'a>, ProfileError> {
        let mut leaves = LeafPaths::new();
        match document {
            Value::Object(obj) => self.visit_object(obj, "", 0, &mut leaves)?,
            _ => self.visit(document, String::new(), 0, &mut leaves)?,
        }
        Ok(leaves)
    }

    fn visit<'a>(
        &self,
        value: &'a Value,
        path: String,
        depth: usize,
        leaves: &mut LeafPaths<'a>,
    ) -> Result<(), ProfileError> {
        if depth > self.max_depth {
            return Err(ProfileError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        match value {
            Value::Object(obj) if !obj.is_empty() => {
                self.visit_object(obj, &path, depth, leaves)
            }
            Value::Array(arr) if !arr.is_empty() => {
                self.visit_array(arr, &path, depth, leaves)
            }
            _ => {
                leaves.insert(path, value);
                Ok(())
            }
        }
    }

    fn visit_object<'a>(
        &self,
        obj: &'a Map<String, Value>,
        path: &str,
        depth: usize,
        leaves: &mut LeafPaths<'a>,
    ) -> Result<(), ProfileError> {
        for (key, value) in obj.iter() {
            self.visit(value, join_path(path, key), depth + 1, leaves)?;
        }
        Ok(())
    }

    fn visit_array<'a>(
        &self,
        arr: &'a [Value],
        path: &str,
        depth: usize,
        leaves: &mut LeafPaths<'a>,
    ) -> Result<(), ProfileError> {
        for (idx, item) in arr.iter().enumerate() {
            if item.is_object() {
                self.visit(item, join_path(path, &idx.to_string()), depth + 1, leaves)?;
            }
        }
        Ok(())
    }
}

impl Default for Flattener {
    fn default() -> Self {
        Flattener::new(64)
    }
}

/// Append a segment to a dotted path
pub fn join_path(path: &str, segment: &str) -> String {
    if path.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", path, segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paths(value: &Value) -> Vec<String> {
        Flattener::default()
            .flatten(value)
            .unwrap()
            .into_keys()
            .collect()
    }

    #[test]
    fn test_scalar_only_document() {
        let input = json!({"title": "Row", "views": 10, "live": false, "coach": null});
        assert_eq!(paths(&input), vec!["coach", "live", "title", "views"]);
    }

    #[test]
    fn test_nested_objects() {
        let input = json!({"stats": {"views": 10, "meta": {"likes": 3}}});
        let leaves = Flattener::default().flatten(&input).unwrap();

        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves["stats.views"], &json!(10));
        assert_eq!(leaves["stats.meta.likes"], &json!(3));
    }

    #[test]
    fn test_list_of_objects() {
        let input = json!({"xs": [{"a": 1}, {"a": 2}]});
        let leaves = Flattener::default().flatten(&input).unwrap();

        assert_eq!(leaves.keys().collect::<Vec<_>>(), vec!["xs.0.a", "xs.1.a"]);
        assert_eq!(leaves["xs.1.a"], &json!(2));
    }

    #[test]
    fn test_scalar_list_elements_are_skipped() {
        let input = json!({
            "tags": ["a", "b"],
            "grid": [[1, 2], [3]],
            "mixed": ["x", {"id": 7}]
        });
        assert_eq!(paths(&input), vec!["mixed.1.id"]);
    }

    #[test]
    fn test_empty_containers_are_leaves() {
        let input = json!({"k": [], "o": {}, "nested": {"inner": []}});
        let leaves = Flattener::default().flatten(&input).unwrap();

        assert_eq!(leaves["k"], &json!([]));
        assert_eq!(leaves["o"], &json!({}));
        assert_eq!(leaves["nested.inner"], &json!([]));
    }

    #[test]
    fn test_empty_root_has_no_leaves() {
        let input = json!({});
        assert!(Flattener::default().flatten(&input).unwrap().is_empty());
    }

    #[test]
    fn test_dotted_key_collides_with_nested_path() {
        let input = json!({"a": {"b": 1}, "a.b": 2});
        let leaves = Flattener::default().flatten(&input).unwrap();

        // "a" sorts before "a.b", so the dotted key is visited last and wins
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves["a.b"], &json!(2));
    }

    #[test]
    fn test_depth_limit() {
        let input = json!({"a": {"b": {"c": {"d": 1}}}});

        assert!(Flattener::new(4).flatten(&input).is_ok());
        let err = Flattener::new(3).flatten(&input).unwrap_err();
        assert!(matches!(err, ProfileError::DepthExceeded { limit: 3 }));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "a"), "a");
        assert_eq!(join_path("a", "0"), "a.0");
    }
}
