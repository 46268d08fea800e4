//! Dot-path access over JSON value trees
//!
//! Every other stage of the pipeline addresses extracted and mapped data
//! through dot-notation paths like `state.org_info.company_name`.

use serde_json::{Map, Value};

/// Split a dot-path into its segments.
///
/// Returns `None` for an empty path or one containing empty segments
/// (`"a..b"`, leading or trailing dots). A valid path is always a
/// sequence of non-empty segment strings.
pub fn segments(path: &str) -> Option<Vec<&str>> {
    if path.is_empty() {
        return None;
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|s| s.is_empty()) {
        return None;
    }
    Some(parts)
}

/// Get a reference to the value at `path`, or `None` if any step of the
/// walk hits a missing key or a non-composite value.
///
/// Objects are walked by key; arrays by numeric segment. Never panics.
pub fn get<'a>(tree: &'a Value, path: &str) -> Option<&'a Value> {
    let parts = segments(path)?;

    let mut current = tree;
    for part in parts {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(arr) => {
                let idx: usize = part.parse().ok()?;
                arr.get(idx)?
            }
            _ => return None,
        };
    }

    Some(current)
}

/// Set `value` at `path`, creating intermediate objects as needed.
///
/// An intermediate node that is absent or not an object is replaced with
/// a fresh empty object, silently discarding whatever was there. The
/// final segment is assigned directly. Returns `false` (leaving the tree
/// untouched) only for an invalid path.
pub fn set(tree: &mut Value, path: &str, value: Value) -> bool {
    let parts = match segments(path) {
        Some(p) => p,
        None => return false,
    };

    let Some((last, intermediates)) = parts.split_last() else {
        return false;
    };

    let mut current = tree;
    for part in intermediates {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return false;
        };
        let entry = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = entry;
    }

    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    let Value::Object(map) = current else {
        return false;
    };
    map.insert(last.to_string(), value);

    true
}
