//! Decide whether a leaf value carries information or is a placeholder

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashSet;

/// Strings treated as empty after trimming and lower-casing
static PLACEHOLDERS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["", "n/a", "null", "none", "undefined", "-"].into_iter().collect());

/// Whether `value` counts as a meaningful occurrence.
///
/// `null`, placeholder strings, empty containers, zero and NaN are empty.
/// Booleans are always meaningful, `false` included.
pub fn is_meaningful(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !PLACEHOLDERS.contains(s.trim().to_lowercase().as_str()),
        Value::Array(arr) => !arr.is_empty(),
        Value::Object(obj) => !obj.is_empty(),
        Value::Number(n) => n.as_f64().map_or(true, is_meaningful_number),
        Value::Bool(_) => true,
    }
}

fn is_meaningful_number(f: f64) -> bool {
    f != 0.0 && !f.is_nan()
}
