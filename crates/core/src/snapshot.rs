//! Lenient readers for remote JSON snapshots.
//!
//! Remote records are hand-edited and were written by several generations
//! of clients, so numbers show up as strings and vice versa. These helpers
//! never fail: a missing or mistyped field reads as `None` and the caller
//! substitutes its default.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

/// Reads a field as a string. Numbers and booleans are stringified.
pub fn string_field(node: &Value, key: &str) -> Option<String> {
    match node.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads a non-negative integer field. Numeric strings are parsed.
pub fn u32_field(node: &Value, key: &str) -> Option<u32> {
    match node.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Reads a boolean field. Accepts `"true"`/`"false"` strings and 0/1.
pub fn bool_field(node: &Value, key: &str) -> Option<bool> {
    match node.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        _ => None,
    }
}

/// Reads a timestamp stored as RFC 3339 text or epoch milliseconds.
pub fn datetime_field(node: &Value, key: &str) -> Option<DateTime<Utc>> {
    match node.get(key)? {
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

/// Reads a list of strings stored either as an array or as `{name: true}` flags.
pub fn string_set_field(node: &Value, key: &str) -> Vec<String> {
    match node.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter(|(_, v)| v.as_bool().unwrap_or(false))
            .map(|(k, _)| k.clone())
            .collect(),
        _ => Vec::new(),
    }
}

/// Returns the children of a node with their keys.
///
/// The remote store returns numerically keyed children as arrays (with
/// `null` holes), so arrays are flattened into `(index, value)` pairs.
pub fn children(node: &Value) -> Vec<(String, &Value)> {
    match node {
        Value::Object(map) => map
            .iter()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), v))
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Vec::new(),
    }
}
