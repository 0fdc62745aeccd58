//! Data record access: dotted-path resolution and JavaScript-style
//! truthiness / stringification over [`serde_json::Value`].
//!
//! A data record is any JSON mapping. Absent data is never an error: a
//! missing segment, an out-of-range index and an explicit `null` all resolve
//! to `None`.

use serde_json::Value;

/// Walk `record` along `path` (`"a.b.0.c"`), one `.`-separated segment at a time.
///
/// Mapping keys are matched exactly; a numeric segment indexes into an array.
/// Returns `None` as soon as a segment is missing or the value is `null`.
pub fn resolve<'a>(record: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    match current {
        Value::Null => None,
        value => Some(value),
    }
}

/// JavaScript truthiness: `null`, `false`, `0`, `NaN` and `""` are falsy.
///
/// Empty arrays and mappings are truthy.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Truthy, and additionally not an empty array nor a whitespace-only string.
pub fn has_content(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::String(s)) => !s.trim().is_empty(),
        other => is_truthy(other),
    }
}

/// Render a value the way JavaScript's `String(value)` would, with `null`
/// and absent values rendering as the empty string.
pub fn stringify(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => format_number(n),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| stringify(Some(item)))
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

/// Integral floats print without a fractional part (`8.0` → `"8"`).
fn format_number(n: &serde_json::Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

/// Numeric view of a value: numbers directly, strings when they parse.
pub fn as_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolves_nested_paths() {
        let record = json!({"contact": {"email": "ann@example.com"}});
        assert_eq!(
            resolve(&record, "contact.email"),
            Some(&json!("ann@example.com"))
        );
    }

    #[test]
    fn missing_segments_short_circuit() {
        let record = json!({"contact": {"email": "ann@example.com"}});
        assert_eq!(resolve(&record, "contact.phone"), None);
        assert_eq!(resolve(&record, "address.city"), None);
        assert_eq!(resolve(&record, "contact.email.domain"), None);
    }

    #[test]
    fn explicit_null_resolves_to_none() {
        let record = json!({"bio": null});
        assert_eq!(resolve(&record, "bio"), None);
    }

    #[test]
    fn numeric_segments_index_arrays() {
        let record = json!({"skills": [{"name": "Go"}, {"name": "Rust"}]});
        assert_eq!(resolve(&record, "skills.1.name"), Some(&json!("Rust")));
        assert_eq!(resolve(&record, "skills.5.name"), None);
        assert_eq!(resolve(&record, "skills.first"), None);
    }

    #[test]
    fn truthiness_follows_javascript() {
        assert!(!is_truthy(None));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(0.0))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(is_truthy(Some(&json!(" "))));
        assert!(is_truthy(Some(&json!([]))));
        assert!(is_truthy(Some(&json!({}))));
        assert!(is_truthy(Some(&json!(-1))));
    }

    #[test]
    fn content_check_rejects_empty_collections_and_blank_strings() {
        assert!(!has_content(Some(&json!([]))));
        assert!(!has_content(Some(&json!("   \n"))));
        assert!(has_content(Some(&json!(["x"]))));
        assert!(has_content(Some(&json!("x"))));
        assert!(!has_content(None));
    }

    #[test]
    fn stringify_matches_javascript_string() {
        assert_eq!(stringify(None), "");
        assert_eq!(stringify(Some(&json!(8))), "8");
        assert_eq!(stringify(Some(&json!(8.0))), "8");
        assert_eq!(stringify(Some(&json!(8.5))), "8.5");
        assert_eq!(stringify(Some(&json!(true))), "true");
        assert_eq!(stringify(Some(&json!(["a", 1, null]))), "a,1,");
        assert_eq!(stringify(Some(&json!({"a": 1}))), "[object Object]");
    }

    #[test]
    fn numeric_strings_are_numbers() {
        assert_eq!(as_number(Some(&json!(" 7 "))), Some(7.0));
        assert_eq!(as_number(Some(&json!("seven"))), None);
        assert_eq!(as_number(None), None);
    }
}
