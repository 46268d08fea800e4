//! Embedded script state extraction
//!
//! SPA pages frequently serialize their initial state into a global
//! assignment like `window.__INITIAL_STATE__ = {...};`. This module
//! captures such statically embedded literals from the raw HTML text and
//! coerces them to strict JSON, without executing any script.
//!
//! Capture uses a brace-depth scanner (string- and escape-aware) instead
//! of a lazy regex, so nested objects terminate at their balancing brace.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Extract configured script variables from raw HTML.
///
/// `script_selectors` maps extraction keys to `window.VAR` patterns.
/// Patterns not referencing a `window.` global contribute nothing, as do
/// variables absent from the page. A literal that will not coerce to JSON
/// is logged and skipped; it never prevents extraction of other keys.
pub fn extract_script_state(
    html: &str,
    script_selectors: &IndexMap<String, String>,
) -> Map<String, Value> {
    let mut result = Map::new();

    for (key, pattern) in script_selectors {
        let Some(var_name) = pattern.strip_prefix("window.") else {
            debug!(key = %key, pattern = %pattern, "script selector is not a window global, skipping");
            continue;
        };

        let Some(raw) = capture_assignment(html, var_name) else {
            // Variable not present on this page: key stays absent
            continue;
        };

        match coerce_json(raw) {
            Some(value) => {
                result.insert(key.clone(), value);
            }
            None => {
                warn!(key = %key, variable = %var_name, "captured script literal is not valid JSON, skipping key");
            }
        }
    }

    result
}

/// Capture the text assigned to `var_name` in the HTML.
///
/// Finds the first `VAR = ` occurrence anywhere in the document (the
/// assignment may span script-tag content). An object literal is taken up
/// to its balancing close brace; anything else is taken up to the next
/// `;` or closing `</script>` tag.
fn capture_assignment<'a>(html: &'a str, var_name: &str) -> Option<&'a str> {
    let anchor = Regex::new(&format!(r"{}\s*=\s*", regex::escape(var_name))).ok()?;
    let found = anchor.find(html)?;
    let rest = &html[found.end()..];

    if rest.starts_with('{') {
        if let Some(literal) = scan_object_literal(rest) {
            return Some(literal);
        }
        // Unbalanced to end of document; fall through to terminator capture
    }

    let terminator = Regex::new(r";|(?i:</script\s*>)").ok()?;
    let end = terminator.find(rest)?.start();
    Some(&rest[..end])
}

/// Scan a `{`-prefixed literal to its balancing close brace.
///
/// Tracks single-, double-, and backtick-quoted strings with backslash
/// escapes so braces inside string content do not affect the depth count.
/// Returns `None` if the braces never balance.
fn scan_object_literal(text: &str) -> Option<&str> {
    let mut depth: usize = 0;
    let mut in_string: Option<char> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if let Some(quote) = in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                in_string = None;
            }
            continue;
        }

        match c {
            '"' | '\'' | '`' => in_string = Some(c),
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[..i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Coerce captured literal text into a strict JSON value.
///
/// 1. Parse as-is.
/// 2. Retry on the substring between the first `{` and the last `}`.
/// 3. Give up (`None`).
fn coerce_json(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn selectors(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_basic_window_assignment() {
        let html = r#"<html><script>window.STATE = {"a":1};</script></html>"#;
        let result = extract_script_state(html, &selectors(&[("state", "window.STATE")]));

        assert_eq!(result.get("state"), Some(&json!({"a": 1})));
    }

    #[test]
    fn test_nested_braces_terminate_at_balance() {
        // A lazy regex would cut this literal short at the first `}`
        let html = concat!(
            r#"<script>window.__INITIAL_STATE__ = {"user":{"name":"Ada","roles":{"admin":true}},"count":2};"#,
            r#"var other = {"x":1};</script>"#,
        );
        let result =
            extract_script_state(html, &selectors(&[("state", "window.__INITIAL_STATE__")]));

        assert_eq!(
            result.get("state"),
            Some(&json!({"user": {"name": "Ada", "roles": {"admin": true}}, "count": 2}))
        );
    }

    #[test]
    fn test_braces_inside_string_content() {
        let html = r#"<script>window.STATE = {"text":"closing } brace { here","n":1};</script>"#;
        let result = extract_script_state(html, &selectors(&[("state", "window.STATE")]));

        assert_eq!(
            result.get("state"),
            Some(&json!({"text": "closing } brace { here", "n": 1}))
        );
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let html = r#"<script>window.STATE = {"quote":"she said \"}\"","ok":true};</script>"#;
        let result = extract_script_state(html, &selectors(&[("state", "window.STATE")]));

        assert_eq!(
            result.get("state"),
            Some(&json!({"quote": "she said \"}\"", "ok": true}))
        );
    }

    #[test]
    fn test_no_trailing_semicolon() {
        let html = "<script>window.STATE = {\"a\":1}\n</script>";
        let result = extract_script_state(html, &selectors(&[("state", "window.STATE")]));

        assert_eq!(result.get("state"), Some(&json!({"a": 1})));
    }

    #[test]
    fn test_non_object_value_until_semicolon() {
        let html = "<script>window.COUNT = 42;</script>";
        let result = extract_script_state(html, &selectors(&[("count", "window.COUNT")]));

        assert_eq!(result.get("count"), Some(&json!(42)));
    }

    #[test]
    fn test_wrapped_literal_recovered_by_substring() {
        // Direct parse fails, but the first-{-to-last-} substring is JSON
        let html = r#"<script>window.DATA = Object.freeze({"a":1});</script>"#;
        let result = extract_script_state(html, &selectors(&[("data", "window.DATA")]));

        assert_eq!(result.get("data"), Some(&json!({"a": 1})));
    }

    #[test]
    fn test_invalid_literal_does_not_block_other_keys() {
        let html = concat!(
            r#"<script>window.BROKEN = {unquoted: keys, nope};"#,
            r#"window.GOOD = {"fine":true};</script>"#,
        );
        let result = extract_script_state(
            html,
            &selectors(&[("broken", "window.BROKEN"), ("good", "window.GOOD")]),
        );

        assert!(!result.contains_key("broken"));
        assert_eq!(result.get("good"), Some(&json!({"fine": true})));
    }

    #[test]
    fn test_absent_variable_contributes_nothing() {
        let html = "<script>var unrelated = 1;</script>";
        let result = extract_script_state(html, &selectors(&[("state", "window.STATE")]));

        assert!(result.is_empty());
    }

    #[test]
    fn test_non_window_pattern_is_ignored() {
        let html = r#"<script>STATE = {"a":1};</script>"#;
        let result = extract_script_state(html, &selectors(&[("state", "globalThis.STATE")]));

        assert!(result.is_empty());
    }

    #[test]
    fn test_assignment_found_across_whole_document() {
        // Match is not limited to script-tag boundaries
        let html = r#"<body><div>window.STATE = {"a":1};</div></body>"#;
        let result = extract_script_state(html, &selectors(&[("state", "window.STATE")]));

        assert_eq!(result.get("state"), Some(&json!({"a": 1})));
    }

    #[test]
    fn test_unbalanced_literal_is_skipped() {
        let html = r#"<script>window.STATE = {"a": {"b": 1}</script>"#;
        let result = extract_script_state(html, &selectors(&[("state", "window.STATE")]));

        assert!(result.is_empty());
    }

    #[test]
    fn test_scan_object_literal_spans() {
        assert_eq!(scan_object_literal(r#"{"a":1} tail"#), Some(r#"{"a":1}"#));
        assert_eq!(
            scan_object_literal(r#"{"a":{"b":2}};"#),
            Some(r#"{"a":{"b":2}}"#)
        );
        assert_eq!(scan_object_literal(r#"{"open": true"#), None);
    }

    #[test]
    fn test_coerce_json_steps() {
        assert_eq!(coerce_json(r#"{"a":1}"#), Some(json!({"a": 1})));
        assert_eq!(coerce_json(" [1,2] "), Some(json!([1, 2])));
        assert_eq!(coerce_json(r#"wrap({"a":1})"#), Some(json!({"a": 1})));
        assert_eq!(coerce_json("not json at all"), None);
    }
}
