//! DOM extraction driven by a selector tree
//!
//! Walks the configured `SelectorTree` against a parsed document and pulls
//! one value per leaf selector, keyed by the leaf's flattened dot-path.

use scraper::{ElementRef, Html, Selector};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::SelectorTree;

/// Extract values for every leaf of the selector tree.
///
/// Each leaf queries the first matching element. A matched element
/// resolves through an ordered fallback chain: trimmed text content, then
/// form-control `value`, then `href`, then `src`, then the empty string.
/// A selector with no match contributes nothing (key omitted). Leaves are
/// visited in declared key order; paths are unique by construction so
/// later keys never overwrite earlier ones.
pub fn extract_dom_data(document: &Html, selectors: &SelectorTree) -> Map<String, Value> {
    let mut result = Map::new();
    walk(document, selectors, "", &mut result);
    result
}

fn walk(document: &Html, tree: &SelectorTree, prefix: &str, result: &mut Map<String, Value>) {
    match tree {
        SelectorTree::Selector(selector_str) => {
            if let Some(content) = select_value(document, selector_str) {
                result.insert(prefix.to_string(), Value::String(content));
            }
        }
        SelectorTree::Group(children) => {
            for (key, child) in children {
                let full_key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                walk(document, child, &full_key, result);
            }
        }
    }
}

/// Resolve the first element matching `selector_str` to a string value.
///
/// Returns `None` when the selector is invalid or matches nothing.
fn select_value(document: &Html, selector_str: &str) -> Option<String> {
    let selector = match Selector::parse(selector_str) {
        Ok(s) => s,
        Err(_) => {
            debug!(selector = %selector_str, "invalid CSS selector, skipping");
            return None;
        }
    };

    let element = document.select(&selector).next()?;
    Some(element_content(element))
}

/// Ordered content fallback for a matched element.
fn element_content(element: ElementRef) -> String {
    let text = element.text().collect::<String>().trim().to_string();
    if !text.is_empty() {
        return text;
    }

    for attr in ["value", "href", "src"] {
        if let Some(v) = element.value().attr(attr) {
            return v.to_string();
        }
    }

    String::new()
}
