use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use serde_json::{Number, Value};
use std::collections::BTreeMap;

// Canonical JSON for persisted analysis artifacts:
// - UTF-8, no BOM
// - object keys sorted lexicographically at every depth
// - no insignificant whitespace (compact) or two-space indent (pretty)
// - floats with a zero fractional part are written as integers
// - non-finite numbers are rejected
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> CoreResult<Vec<u8>> {
    let normalized = canonical_value(value)?;
    Ok(serde_json::to_vec(&normalized)?)
}

/// Same ordering rules as [`to_canonical_bytes`], indented for human review.
pub fn to_canonical_pretty<T: Serialize>(value: &T) -> CoreResult<String> {
    let normalized = canonical_value(value)?;
    Ok(serde_json::to_string_pretty(&normalized)?)
}

pub fn canonical_value<T: Serialize>(value: &T) -> CoreResult<Value> {
    normalize_value(serde_json::to_value(value)?)
}

fn normalize_value(v: Value) -> CoreResult<Value> {
    match v {
        Value::Object(map) => {
            let mut sorted: BTreeMap<String, Value> = BTreeMap::new();
            for (k, vv) in map {
                sorted.insert(k, normalize_value(vv)?);
            }
            let mut out = serde_json::Map::new();
            for (k, vv) in sorted {
                out.insert(k, vv);
            }
            Ok(Value::Object(out))
        }
        Value::Array(arr) => arr
            .into_iter()
            .map(normalize_value)
            .collect::<CoreResult<Vec<_>>>()
            .map(Value::Array),
        Value::Number(n) => normalize_number(n),
        other => Ok(other),
    }
}

fn normalize_number(n: Number) -> CoreResult<Value> {
    if n.is_i64() || n.is_u64() {
        return Ok(Value::Number(n));
    }
    let f = n
        .as_f64()
        .ok_or_else(|| CoreError::InvalidInput("unrepresentable JSON number".to_string()))?;
    if !f.is_finite() {
        return Err(CoreError::InvalidInput(
            "canonical JSON forbids non-finite numbers".to_string(),
        ));
    }
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        return Ok(Value::Number(Number::from(f as i64)));
    }
    Ok(Value::Number(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keys_are_sorted_at_every_depth() {
        let v = json!({"b": 1, "a": {"z": true, "m": [ {"y": 1, "x": 2} ]}});
        let s = String::from_utf8(to_canonical_bytes(&v).unwrap()).unwrap();
        assert_eq!(s, r#"{"a":{"m":[{"x":2,"y":1}],"z":true},"b":1}"#);
    }

    #[test]
    fn integral_floats_collapse_to_integers() {
        let v = json!({"quantity": 15000.0, "price": 2.5});
        let s = String::from_utf8(to_canonical_bytes(&v).unwrap()).unwrap();
        assert_eq!(s, r#"{"price":2.5,"quantity":15000}"#);
    }
}
