//! Transport normalization for raw query results.
//!
//! SQL drivers hand back timestamps in whatever textual shape the column was
//! written with. Everything date-like leaving the API is rendered as
//! ISO-8601 UTC with millisecond precision.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
];

/// Recursively rewrite date-like strings as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Arrays and objects keep their shape; numbers, booleans, null and other
/// strings pass through untouched. Applying it twice equals applying it once.
pub fn normalize(value: Value) -> Value {
    match value {
        Value::String(s) => match parse_date_like(&s) {
            Some(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => Value::String(s),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(normalize).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| (key, normalize(value)))
                .collect(),
        ),
        other => other,
    }
}

pub fn normalize_rows(rows: Vec<Value>) -> Vec<Value> {
    rows.into_iter().map(normalize).collect()
}

fn parse_date_like(s: &str) -> Option<DateTime<Utc>> {
    // Shortest accepted shape is `YYYY-MM-DD HH:MM:SS`
    let bytes = s.as_bytes();
    if bytes.len() < 19 || !bytes[..4].iter().all(u8::is_ascii_digit) || bytes[4] != b'-' {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}
