//! # Value Coercion
//!
//! Query values arrive as strings; stored values keep their JSON type.
//! Comparison casts the wanted value to the stored value's type.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;

/// Resolve a dotted path (`address.city`) inside a document
pub fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(doc, |current, segment| current.as_object()?.get(segment))
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date
pub fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Order a stored scalar against a wanted value.
///
/// `None` means the two cannot be compared (no predicate on them holds).
pub fn coerce_cmp(stored: &Value, wanted: &Value) -> Option<Ordering> {
    match (stored, wanted) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, Value::String(s)) if s == "null" => Some(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::String(s)) => s.trim().parse::<bool>().ok().map(|b| a.cmp(&b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Number(a), Value::String(s)) => {
            let wanted: f64 = s.trim().parse().ok()?;
            a.as_f64()?.partial_cmp(&wanted)
        }
        (Value::String(a), Value::String(b)) => Some(compare_strings(a, b)),
        (Value::String(a), Value::Number(b)) => {
            let stored: f64 = a.trim().parse().ok()?;
            stored.partial_cmp(&b.as_f64()?)
        }
        (Value::String(a), Value::Bool(b)) => a.parse::<bool>().ok().map(|s| s.cmp(b)),
        _ => None,
    }
}

/// Total order used by sorting; missing values are handled by the caller
pub fn sort_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => compare_strings(x, y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Date strings order by instant and before every other string, which
/// order lexically. Keeps the order total over mixed values.
fn compare_strings(a: &str, b: &str) -> Ordering {
    match (parse_instant(a), parse_instant(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}
