use chrono::{SecondsFormat, Utc};

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`, the same shape the
/// normalizer emits.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
