//! Streaming accumulator for per-path statistics
//!
//! Documents are absorbed one at a time; nothing from a document is retained
//! except its stringified values when the histogram or target counters are on.

use crate::error::ProfileError;
use crate::profile::flatten::{join_path, Flattener};
use crate::profile::meaningful::is_meaningful;
use crate::profile::types::{
    stringify_value, CorpusStats, DocumentId, PrimitiveType, ProfileConfig,
};
use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

/// Accumulates [`CorpusStats`] across a corpus
#[derive(Debug)]
pub struct Aggregator {
    config: ProfileConfig,
    flattener: Flattener,
    stats: CorpusStats,
}

impl Aggregator {
    pub fn new(config: ProfileConfig) -> Self {
        let mut stats = CorpusStats::default();
        for target in &config.target_fields {
            stats.target_counts.insert(target.clone(), IndexMap::new());
        }

        Aggregator {
            flattener: Flattener::new(config.max_depth),
            config,
            stats,
        }
    }

    /// Absorb one document.
    ///
    /// A document that is not an object or that nests too deeply is rejected
    /// without touching any counter.
    pub fn absorb(&mut self, id: &DocumentId, document: &Value) -> Result<(), ProfileError> {
        if !document.is_object() {
            return Err(ProfileError::Structural {
                found: PrimitiveType::from_value(document).as_str(),
            });
        }

        let leaves = self.flattener.flatten(document)?;
        debug!(document = %id, leaves = leaves.len(), "absorbing document");

        for (path, value) in leaves {
            let entry = self.stats.paths.entry(path).or_default();
            entry.occurrences += 1;
            entry.types.insert(PrimitiveType::from_value(value));
            if is_meaningful(value) {
                entry.meaningful_occurrences += 1;
            }
            if self.config.value_histogram {
                *entry
                    .value_histogram
                    .get_or_insert_with(IndexMap::new)
                    .entry(stringify_value(value))
                    .or_insert(0) += 1;
            }
        }

        if !self.config.target_fields.is_empty() {
            self.count_targets(document, "");
        }

        self.stats.documents += 1;
        Ok(())
    }

    /// Walk every node reachable through objects and lists of objects and
    /// feed the side counters for paths ending in a target field.
    ///
    /// The flattener's depth check has already passed, so recursion is bounded.
    fn count_targets(&mut self, value: &Value, path: &str) {
        match value {
            Value::Object(obj) => {
                for (key, child) in obj.iter() {
                    let child_path = join_path(path, key);
                    self.record_target(&child_path, child);
                    self.count_targets(child, &child_path);
                }
            }
            Value::Array(arr) => {
                for (idx, item) in arr.iter().enumerate() {
                    if item.is_object() {
                        self.count_targets(item, &join_path(path, &idx.to_string()));
                    }
                }
            }
            _ => {}
        }
    }

    fn record_target(&mut self, path: &str, value: &Value) {
        for target in &self.config.target_fields {
            if !matches_suffix(path, target) {
                continue;
            }
            let Some(counts) = self.stats.target_counts.get_mut(target) else {
                continue;
            };
            match value {
                Value::Array(items) => {
                    for item in items {
                        *counts.entry(stringify_value(item)).or_insert(0) += 1;
                    }
                }
                _ => *counts.entry(stringify_value(value)).or_insert(0) += 1,
            }
        }
    }

    pub fn stats(&self) -> &CorpusStats {
        &self.stats
    }

    pub fn into_stats(self) -> CorpusStats {
        self.stats
    }
}

/// Whether `path` ends with `target` on a segment boundary
fn matches_suffix(path: &str, target: &str) -> bool {
    match path.strip_suffix(target) {
        Some(rest) => rest.is_empty() || rest.ends_with('.'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn absorb_all(config: ProfileConfig, docs: &[Value]) -> CorpusStats {
        let mut aggregator = Aggregator::new(config);
        for (idx, doc) in docs.iter().enumerate() {
            aggregator.absorb(&DocumentId::Row(idx), doc).unwrap();
        }
        aggregator.into_stats()
    }

    #[test]
    fn test_counts_across_documents() {
        let stats = absorb_all(
            ProfileConfig::default(),
            &[
                json!({"title": "Row", "tags": ["a", "b"], "stats": {"views": 10}}),
                json!({"title": "", "stats": {"views": 0, "likes": 3}}),
            ],
        );

        assert_eq!(stats.documents, 2);
        assert_eq!(stats.paths.len(), 3);

        let views = stats.get("stats.views").unwrap();
        assert_eq!(views.occurrences, 2);
        assert_eq!(views.meaningful_occurrences, 1);
        assert_eq!(views.type_names(), vec!["integer"]);

        let title = stats.get("title").unwrap();
        assert_eq!((title.occurrences, title.meaningful_occurrences), (2, 1));
        assert!(stats.get("tags").is_none());
        assert!(title.value_histogram.is_none());
    }

    #[test]
    fn test_mixed_types_per_path() {
        let stats = absorb_all(
            ProfileConfig::default(),
            &[json!({"v": 1}), json!({"v": "one"}), json!({"v": null}), json!({"v": []})],
        );

        let v = stats.get("v").unwrap();
        assert_eq!(v.type_names(), vec!["array", "integer", "null", "string"]);
        assert_eq!(v.occurrences, 4);
        assert_eq!(v.meaningful_occurrences, 2);
    }

    #[test]
    fn test_count_bounds_hold() {
        let docs = vec![
            json!({"a": {"b": null}, "c": "-"}),
            json!({"a": {"b": 2}, "xs": [{"y": 0}, {"y": 1}]}),
            json!({"c": "x", "xs": []}),
        ];
        let stats = absorb_all(ProfileConfig::default(), &docs);

        for (path, s) in &stats.paths {
            assert!(s.meaningful_occurrences <= s.occurrences, "{}", path);
            assert!(s.occurrences <= stats.documents, "{}", path);
        }
        assert_eq!(stats.get("xs").unwrap().type_names(), vec!["array"]);
        assert_eq!(stats.get("xs.1.y").unwrap().meaningful_occurrences, 1);
    }

    #[test]
    fn test_value_histogram() {
        let config = ProfileConfig {
            value_histogram: true,
            ..Default::default()
        };
        let stats = absorb_all(
            config,
            &[
                json!({"g": " rock "}),
                json!({"g": "pop"}),
                json!({"g": "rock"}),
                json!({"g": null}),
            ],
        );

        let g = stats.get("g").unwrap();
        assert_eq!(g.top_values(100), vec![("rock", 2), ("pop", 1), ("null", 1)]);
    }

    #[test]
    fn test_target_counters() {
        let config = ProfileConfig {
            target_fields: vec!["musicGenre".to_string(), "workoutTypes".to_string()],
            ..Default::default()
        };
        let stats = absorb_all(
            config,
            &[
                json!({"musicGenre": "rock", "workoutTypes": ["run", "row"]}),
                json!({"meta": {"musicGenre": "rock"}, "notmusicGenre": "jazz"}),
                json!({"sessions": [{"workoutTypes": ["run"]}]}),
            ],
        );

        let genres = &stats.target_counts["musicGenre"];
        assert_eq!(genres.get("rock"), Some(&2));
        assert_eq!(genres.get("jazz"), None);

        let types = &stats.target_counts["workoutTypes"];
        assert_eq!(types.get("run"), Some(&2));
        assert_eq!(types.get("row"), Some(&1));

        // Lists of scalars still never reach the main table
        assert!(stats.get("workoutTypes").is_none());
        assert!(stats.get("workoutTypes.0").is_none());
    }

    #[test]
    fn test_rejects_non_object_root() {
        let mut aggregator = Aggregator::new(ProfileConfig::default());
        let err = aggregator
            .absorb(&DocumentId::Row(0), &json!([{"a": 1}]))
            .unwrap_err();

        assert!(matches!(err, ProfileError::Structural { found: "array" }));
        assert_eq!(aggregator.stats().documents, 0);
        assert!(aggregator.stats().paths.is_empty());
    }

    #[test]
    fn test_depth_failure_leaves_stats_untouched() {
        let config = ProfileConfig {
            max_depth: 1,
            ..Default::default()
        };
        let mut aggregator = Aggregator::new(config);
        let err = aggregator
            .absorb(&DocumentId::Row(0), &json!({"a": {"b": {"c": 1}}}))
            .unwrap_err();

        assert!(err.is_per_document());
        assert!(aggregator.stats().paths.is_empty());
        assert_eq!(aggregator.stats().documents, 0);
    }

    #[test]
    fn test_matches_suffix() {
        assert!(matches_suffix("musicGenre", "musicGenre"));
        assert!(matches_suffix("a.0.musicGenre", "musicGenre"));
        assert!(!matches_suffix("xmusicGenre", "musicGenre"));
        assert!(!matches_suffix("musicGenre.name", "musicGenre"));
    }
}
