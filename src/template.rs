//! Output schema templating
//!
//! Projects mapped data onto the caller-defined output template by
//! substituting `{{path}}` placeholders inside string leaves.

use regex::Regex;
use serde_json::Value;

use crate::path;

const PLACEHOLDER_PATTERN: &str = r"\{\{([^}]+)\}\}";

/// Produce the final output tree from a template and mapped data.
///
/// The template is never mutated: the result is a structurally fresh copy
/// sharing nothing with it, so one config serves concurrent scrapes.
/// Every `{{path}}` occurrence in a string leaf is resolved independently
/// against `mapped`; unresolved placeholders stay in the output verbatim.
/// Arrays recurse element-wise, objects key-wise, and non-string leaves
/// pass through unchanged, so the template's shape is preserved exactly.
pub fn render_template(template: &Value, mapped: &Value) -> Value {
    let re = match Regex::new(PLACEHOLDER_PATTERN) {
        Ok(re) => re,
        Err(_) => return template.clone(),
    };

    render_value(template, mapped, &re)
}

fn render_value(value: &Value, mapped: &Value, re: &Regex) -> Value {
    match value {
        Value::String(s) => Value::String(render_string(s, mapped, re)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| render_value(item, mapped, re))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .iter()
                .map(|(key, field)| (key.clone(), render_value(field, mapped, re)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn render_string(s: &str, mapped: &Value, re: &Regex) -> String {
    re.replace_all(s, |caps: &regex::Captures| {
        let placeholder_path = &caps[1];
        match path::get(mapped, placeholder_path) {
            Some(Value::String(text)) => text.clone(),
            Some(value) => value.to_string(),
            // Unresolved: keep the literal {{...}} token
            None => caps[0].to_string(),
        }
    })
    .into_owned()
}
