//! Field mapping with fallback chains
//!
//! Resolves each configured output field from extracted data by trying an
//! ordered list of candidate dot-paths.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::path;

/// Build the mapped tree from extracted data.
///
/// Each mapping entry is `outputField -> "candA || candB || ..."`.
/// Candidates are trimmed and evaluated left to right against
/// `extracted`; the first one that resolves wins and evaluation stops (a
/// fallback chain, not a merge). Fields with no resolving candidate are
/// omitted. The winning value lands at the output field's own dot-path.
pub fn apply_data_mapping(extracted: &Value, data_mapping: &IndexMap<String, String>) -> Value {
    let mut mapped = Value::Object(Map::new());

    for (output_field, expression) in data_mapping {
        let winner = expression
            .split("||")
            .map(str::trim)
            .filter(|candidate| !candidate.is_empty())
            .find_map(|candidate| path::get(extracted, candidate));

        if let Some(value) = winner {
            path::set(&mut mapped, output_field, value.clone());
        }
    }

    mapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_first_candidate_wins() {
        let extracted = json!({
            "title": "From DOM",
            "state": {"title": "From script"}
        });

        let mapped = apply_data_mapping(&extracted, &mapping(&[("name", "title || state.title")]));

        assert_eq!(mapped, json!({"name": "From DOM"}));
    }

    #[test]
    fn test_fallback_to_later_candidate() {
        let extracted = json!({
            "script": {"state": {"title": "Deep Title"}}
        });

        let mapped = apply_data_mapping(
            &extracted,
            &mapping(&[("name", "dom.title || script.state.title")]),
        );

        assert_eq!(mapped, json!({"name": "Deep Title"}));
    }

    #[test]
    fn test_unresolved_field_is_omitted() {
        let extracted = json!({"present": 1});

        let mapped = apply_data_mapping(
            &extracted,
            &mapping(&[("found", "present"), ("missing", "nope || also.nope")]),
        );

        assert_eq!(mapped, json!({"found": 1}));
    }

    #[test]
    fn test_output_field_nests_by_dot_path() {
        let extracted = json!({"state": {"owner": "Ada", "id": 7}});

        let mapped = apply_data_mapping(
            &extracted,
            &mapping(&[("owner.name", "state.owner"), ("owner.id", "state.id")]),
        );

        assert_eq!(mapped, json!({"owner": {"name": "Ada", "id": 7}}));
    }

    #[test]
    fn test_null_value_counts_as_resolved() {
        // A present-but-null key stops the chain; only absence falls through
        let extracted = json!({"a": null, "b": "fallback"});

        let mapped = apply_data_mapping(&extracted, &mapping(&[("out", "a || b")]));

        assert_eq!(mapped, json!({"out": null}));
    }

    #[test]
    fn test_whitespace_around_candidates() {
        let extracted = json!({"deep": {"key": true}});

        let mapped = apply_data_mapping(&extracted, &mapping(&[("out", "  nope  ||  deep.key ")]));

        assert_eq!(mapped, json!({"out": true}));
    }

    #[test]
    fn test_non_string_values_pass_through() {
        let extracted = json!({"state": {"items": [1, 2, 3]}});

        let mapped = apply_data_mapping(&extracted, &mapping(&[("items", "state.items")]));

        assert_eq!(mapped, json!({"items": [1, 2, 3]}));
    }

    #[test]
    fn test_empty_mapping_yields_empty_tree() {
        let extracted = json!({"anything": 1});

        let mapped = apply_data_mapping(&extracted, &mapping(&[]));

        assert_eq!(mapped, json!({}));
    }
}
