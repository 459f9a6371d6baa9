//! Content hashing.
//!
//! Hashes are BLAKE3 over a canonical JSON rendering: object keys sorted,
//! no whitespace, integral floats written without a fraction. Two values
//! that serialize to the same JSON always hash the same.

use serde::Serialize;

use crate::error::ModelError;

/// Hex BLAKE3 hash of the canonical JSON form of `value`.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<String, ModelError> {
    let value = serde_json::to_value(value)?;
    Ok(value_hash(&value))
}

/// Short (16 hex chars) form of [`content_hash`], used in document headers.
pub fn short_hash<T: Serialize + ?Sized>(value: &T) -> Result<String, ModelError> {
    let mut hash = content_hash(value)?;
    hash.truncate(16);
    Ok(hash)
}

/// Hex BLAKE3 hash of a JSON value in canonical form.
pub fn value_hash(value: &serde_json::Value) -> String {
    let canonical = canonical_json(value);
    blake3::hash(canonical.as_bytes()).to_hex().to_string()
}

/// Renders a JSON value canonically.
pub fn canonical_json(value: &serde_json::Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &serde_json::Value, out: &mut String) {
    use serde_json::Value;

    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&canonical_number(n)),
        Value::String(s) => out.push_str(&Value::String(s.clone()).to_string()),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(item, out);
            }
            out.push('}');
        }
    }
}

fn canonical_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        Some(f) => format!("{}", f),
        None => "null".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_does_not_matter() {
        let a = json!({"b": 1, "a": [1.0, 2.5]});
        let b = json!({"a": [1, 2.5], "b": 1});
        assert_eq!(value_hash(&a), value_hash(&b));
    }

    #[test]
    fn test_canonical_form() {
        let v = json!({"z": "x", "a": {"d": -0.0, "c": true}});
        assert_eq!(canonical_json(&v), r#"{"a":{"c":true,"d":0},"z":"x"}"#);
    }

    #[test]
    fn test_hash_lengths() {
        assert_eq!(content_hash(&vec![1, 2, 3]).unwrap().len(), 64);
        assert_eq!(short_hash("abc").unwrap().len(), 16);
    }
}
