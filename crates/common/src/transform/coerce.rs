//! Scalar coercions applied to declared fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde_json::Value;

use super::profile::DateFormat;

/// Format a date field for the wire.
///
/// Accepts ISO-8601 strings, `YYYY-MM-DD` dates, epoch-millisecond numbers
/// or digit strings. Invalid or unparseable input formats to the empty
/// string rather than failing the request.
pub(crate) fn format_date(value: &Value, format: DateFormat) -> Value {
    match parse_datetime(value) {
        Some(instant) => Value::String(match format {
            DateFormat::Iso8601 => instant.to_rfc3339_opts(SecondsFormat::Secs, true),
            DateFormat::EpochMillis => instant.timestamp_millis().to_string(),
            DateFormat::Pattern(pattern) => {
                instant.format(&pattern_to_strftime(pattern)).to_string()
            }
        }),
        None => Value::String(String::new()),
    }
}

/// Parse an incoming date field into the canonical application form.
///
/// Returns `None` when the input is not a recognizable date, in which case
/// the caller leaves the original value untouched.
pub(crate) fn parse_date(value: &Value) -> Option<Value> {
    parse_datetime(value)
        .map(|instant| Value::String(instant.to_rfc3339_opts(SecondsFormat::Secs, true)))
}

fn parse_datetime(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(raw) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return None;
            }
            if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
                return Some(parsed.with_timezone(&Utc));
            }
            if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
                return Some(Utc.from_utc_datetime(&parsed));
            }
            if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                return Some(Utc.from_utc_datetime(&parsed.and_hms_opt(0, 0, 0)?));
            }
            if raw.chars().all(|c| c.is_ascii_digit()) {
                let millis: i64 = raw.parse().ok()?;
                return Utc.timestamp_millis_opt(millis).single();
            }
            None
        }
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}

fn pattern_to_strftime(pattern: &str) -> String {
    pattern
        .replace("YYYY", "%Y")
        .replace("MM", "%m")
        .replace("DD", "%d")
        .replace("HH", "%H")
        .replace("mm", "%M")
        .replace("ss", "%S")
}

/// Coerce a declared boolean field.
///
/// Booleans pass through; numbers map zero/non-zero; strings match
/// `true/1/yes` and `false/0/no` case-insensitively; everything else
/// becomes null.
pub(crate) fn coerce_boolean(value: &Value) -> Value {
    match value {
        Value::Bool(flag) => Value::Bool(*flag),
        Value::Number(number) => Value::Bool(number.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Value::Bool(true),
            "false" | "0" | "no" => Value::Bool(false),
            _ => Value::Null,
        },
        _ => Value::Null,
    }
}

/// Coerce a declared number field via numeric parse.
///
/// Empty, null and unparseable input becomes null.
pub(crate) fn coerce_number(value: &Value) -> Value {
    match value {
        Value::Number(number) => Value::Number(number.clone()),
        Value::Bool(flag) => Value::Number(i64::from(*flag).into()),
        Value::String(raw) => {
            let raw = raw.trim();
            if raw.is_empty() {
                return Value::Null;
            }
            if let Ok(integer) = raw.parse::<i64>() {
                return Value::Number(integer.into());
            }
            match raw.parse::<f64>() {
                Ok(float) => serde_json::Number::from_f64(float).map_or(Value::Null, Value::Number),
                Err(_) => Value::Null,
            }
        }
        _ => Value::Null,
    }
}
