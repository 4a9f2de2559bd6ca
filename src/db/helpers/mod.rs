use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};

/// Fixed-width RFC 3339 text, so lexicographic order in SQLite matches
/// chronological order.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Smallest stored-precision instant that is `>= value`.
///
/// Range bounds go through this before formatting; truncating them instead
/// would admit rows up to one microsecond earlier than the bound.
pub fn ceil_to_stored_precision(value: &DateTime<Utc>) -> DateTime<Utc> {
    let sub_micros = i64::from(value.nanosecond() % 1_000);
    if sub_micros == 0 {
        *value
    } else {
        *value - Duration::nanoseconds(sub_micros) + Duration::microseconds(1)
    }
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field} '{value}'"))
}
