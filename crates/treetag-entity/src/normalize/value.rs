//! Lenient accessors over JSON rows.

use chrono::{DateTime, Utc};
use serde_json::Value;

/// Unwrap an embedded to-one relation.
///
/// Accepts an object, a one-element array (first element wins), or a
/// JSON-encoded string of either. Anything else is treated as absent.
pub fn to_one(value: &Value) -> Option<Value> {
    match value {
        Value::Object(_) => Some(value.clone()),
        Value::Array(items) => items.first().and_then(to_one),
        Value::String(s) => serde_json::from_str::<Value>(s).ok().and_then(|v| match v {
            Value::String(_) => None,
            other => to_one(&other),
        }),
        _ => None,
    }
}

/// Nested object at `key`, normalized with [`to_one`].
pub(crate) fn nested(row: &Value, key: &str) -> Option<Value> {
    row.get(key).and_then(to_one)
}

/// Whether `key` holds something other than `null`.
pub(crate) fn present(row: &Value, key: &str) -> bool {
    row.get(key).is_some_and(|v| !v.is_null())
}

/// String at `key`; numbers and booleans are stringified, anything else is empty.
pub(crate) fn text(row: &Value, key: &str) -> String {
    match row.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Non-empty trimmed string at `key`.
pub(crate) fn non_empty(row: &Value, key: &str) -> Option<String> {
    row.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Decimal at `key`; numeric strings are parsed, anything else is `0`.
pub(crate) fn number(row: &Value, key: &str) -> f64 {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Integer at `key`; numeric strings are parsed.
pub(crate) fn integer(row: &Value, key: &str) -> Option<i64> {
    match row.get(key) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// List of strings at `key`. Non-string entries are skipped; a bare
/// comma-separated string is split.
pub(crate) fn string_list(row: &Value, key: &str) -> Vec<String> {
    match row.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(s)) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// RFC 3339 timestamp at `key`.
pub(crate) fn timestamp(row: &Value, key: &str) -> Option<DateTime<Utc>> {
    row.get(key)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
