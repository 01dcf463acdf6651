//! Depth-first walk over `serde_json::Value` trees.
//!
//! Filtering, normalization and matching all need the same traversal, so it
//! lives here once and the callers only supply the per-node action.

use serde_json::Value;

/// Visits every node of `value` depth-first, children before their parent.
pub fn visit_mut<F>(value: &mut Value, visit: &mut F)
where
    F: FnMut(&mut Value),
{
    match value {
        Value::Array(items) => {
            for item in items.iter_mut() {
                visit_mut(item, visit);
            }
        }
        Value::Object(map) => {
            for (_, nested) in map.iter_mut() {
                visit_mut(nested, visit);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
    }
    visit(value);
}

/// Rewrites every string leaf for which `replace` returns `Some`.
///
/// Object keys are left alone. Returns `true` if any leaf changed.
pub fn map_strings<F>(value: &mut Value, mut replace: F) -> bool
where
    F: FnMut(&str) -> Option<String>,
{
    let mut changed = false;
    visit_mut(value, &mut |node| {
        if let Value::String(text) = node {
            if let Some(updated) = replace(text) {
                if updated != *text {
                    *text = updated;
                    changed = true;
                }
            }
        }
    });
    changed
}

/// Returns `value` with every object's keys in ascending order.
#[must_use]
pub fn sort_keys(mut value: Value) -> Value {
    visit_mut(&mut value, &mut |node| {
        if let Value::Object(map) = node {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            *map = entries.into_iter().collect();
        }
    });
    value
}

/// Compact serialization with sorted keys.
#[must_use]
pub fn canonical_string(value: &Value) -> String {
    sort_keys(value.clone()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn visits_children_before_parent() {
        let mut value = json!({"a": [1, {"b": 2}]});
        let mut kinds = Vec::new();
        visit_mut(&mut value, &mut |node| {
            kinds.push(match node {
                Value::Object(_) => "object",
                Value::Array(_) => "array",
                Value::Number(_) => "number",
                _ => "other",
            });
        });
        assert_eq!(kinds, vec!["number", "number", "object", "array", "object"]);
    }

    #[test]
    fn map_strings_rewrites_nested_leaves_only() {
        let mut value = json!({"secret": "abc", "list": ["abc", 3, {"abc": "x-abc"}]});
        let changed = map_strings(&mut value, |s| Some(s.replace("abc", "***")));
        assert!(changed);
        assert_eq!(value, json!({"secret": "***", "list": ["***", 3, {"abc": "x-***"}]}));
    }

    #[test]
    fn map_strings_reports_no_change() {
        let mut value = json!({"a": "b"});
        assert!(!map_strings(&mut value, |s| Some(s.to_string())));
        assert!(!map_strings(&mut value, |_| None));
    }

    #[test]
    fn canonical_string_ignores_key_order() {
        let left: Value = serde_json::from_str(r#"{"b":{"y":1,"x":2},"a":[3,1]}"#).unwrap();
        let right: Value = serde_json::from_str(r#"{"a":[3,1],"b":{"x":2,"y":1}}"#).unwrap();
        assert_eq!(canonical_string(&left), canonical_string(&right));
        assert_eq!(canonical_string(&left), r#"{"a":[3,1],"b":{"x":2,"y":1}}"#);
    }
}
