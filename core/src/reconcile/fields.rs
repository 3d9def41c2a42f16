//! Lenient accessors over the model's JSON. Every accessor treats the sentinel as absent.

use crate::model::{is_not_specified, NOT_SPECIFIED};
use serde_json::Value;

pub fn text(obj: &Value, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) if !is_not_specified(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub fn text_or_sentinel(obj: &Value, key: &str) -> String {
    text(obj, key).unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

pub fn number(obj: &Value, key: &str) -> Option<f64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

pub fn boolean(obj: &Value, key: &str) -> Option<bool> {
    match obj.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" => Some(true),
            "false" | "no" | "n" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

pub fn array<'a>(obj: &'a Value, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(|v| v.as_array())
        .map(|v| v.as_slice())
        .unwrap_or(&[])
}

pub fn object<'a>(obj: &'a Value, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| v.is_object())
}

/// "high risk" -> "High Risk"
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sentinel_reads_as_absent() {
        let v = json!({"a": "Not specified", "b": " x ", "c": 3});
        assert_eq!(text(&v, "a"), None);
        assert_eq!(text(&v, "b").as_deref(), Some("x"));
        assert_eq!(text(&v, "c").as_deref(), Some("3"));
        assert_eq!(text_or_sentinel(&v, "missing"), NOT_SPECIFIED);
    }

    #[test]
    fn numbers_from_strings() {
        let v = json!({"a": "15,000", "b": 2.5, "c": "lots"});
        assert_eq!(number(&v, "a"), Some(15_000.0));
        assert_eq!(number(&v, "b"), Some(2.5));
        assert_eq!(number(&v, "c"), None);
    }

    #[test]
    fn title_casing() {
        assert_eq!(title_case("hIGH  risk"), "High Risk");
    }
}
