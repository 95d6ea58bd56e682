//! Lenient readers for loosely-typed JSON fields.
//!
//! Bitquery returns most numeric fields as decimal strings, occasionally as JSON
//! numbers, and sometimes omits them. Every numeric read in this crate goes
//! through [`coerce_f64`] so a bad field costs one zero, never a whole pass.

use serde_json::{Map, Value};

/// Read a number from a JSON number or numeric string.
///
/// Missing, `null`, blank, non-numeric and non-finite values yield `default`.
pub fn coerce_f64_or(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(default)
}

/// [`coerce_f64_or`] with a zero default.
pub fn coerce_f64(value: Option<&Value>) -> f64 {
    coerce_f64_or(value, 0.0)
}

/// Read a non-empty string, rendering JSON numbers in their textual form.
///
/// Anything else (missing, `null`, empty string, objects) yields `default`.
pub fn coerce_str(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

/// Borrow a nested object, treating any other JSON type as absent.
pub fn object<'a>(value: Option<&'a Value>) -> Option<&'a Map<String, Value>> {
    value.and_then(Value::as_object)
}

/// Borrow `parent[key]` as an object. Missing or wrongly-typed parents are absent too.
pub fn child_object<'a>(parent: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Map<String, Value>> {
    object(parent.and_then(|p| p.get(key)))
}

/// Field lookup on an optional object.
pub fn field<'a>(parent: Option<&'a Map<String, Value>>, key: &str) -> Option<&'a Value> {
    parent.and_then(|p| p.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_and_numeric_strings() {
        assert_eq!(coerce_f64(Some(&json!(12.5))), 12.5);
        assert_eq!(coerce_f64(Some(&json!(7))), 7.0);
        assert_eq!(coerce_f64(Some(&json!("3.25"))), 3.25);
        assert_eq!(coerce_f64(Some(&json!("  -4 "))), -4.0);
        assert_eq!(coerce_f64(Some(&json!("1e3"))), 1000.0);
    }

    #[test]
    fn malformed_numbers_default() {
        assert_eq!(coerce_f64(None), 0.0);
        assert_eq!(coerce_f64(Some(&Value::Null)), 0.0);
        assert_eq!(coerce_f64(Some(&json!(""))), 0.0);
        assert_eq!(coerce_f64(Some(&json!("abc"))), 0.0);
        assert_eq!(coerce_f64(Some(&json!("NaN"))), 0.0);
        assert_eq!(coerce_f64(Some(&json!(true))), 0.0);
        assert_eq!(coerce_f64(Some(&json!({"x": 1}))), 0.0);
        assert_eq!(coerce_f64_or(Some(&json!("oops")), 9.0), 9.0);
    }

    #[test]
    fn strings_default_when_blank_or_wrong_type() {
        assert_eq!(coerce_str(Some(&json!("Uniswap")), "Unknown"), "Uniswap");
        assert_eq!(coerce_str(Some(&json!("")), "Unknown"), "Unknown");
        assert_eq!(coerce_str(Some(&Value::Null), "Unknown"), "Unknown");
        assert_eq!(coerce_str(None, ""), "");
        assert_eq!(coerce_str(Some(&json!(21_000_000)), ""), "21000000");
        assert_eq!(coerce_str(Some(&json!(["a"])), "-"), "-");
    }

    #[test]
    fn nested_object_access() {
        let v = json!({"Block": {"Number": "1"}, "Trade": "bad"});
        let root = object(Some(&v));
        assert!(child_object(root, "Block").is_some());
        assert!(child_object(root, "Trade").is_none());
        assert!(child_object(None, "Block").is_none());
        assert_eq!(field(child_object(root, "Block"), "Number"), Some(&json!("1")));
    }
}
