//! Lenient timestamp (de)serialization.
//!
//! The wishlist API emits ISO-8601 timestamps, sometimes with an offset and
//! sometimes as a zone-less local time. Zone-less values are read as UTC.
//! Use with `#[serde(with = "crate::types::timestamp")]`.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer, de};

/// Parse an RFC 3339 or zone-less ISO-8601 timestamp.
///
/// # Errors
///
/// Returns the chrono parse error if neither form matches.
pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(with_offset) => Ok(with_offset.with_timezone(&Utc)),
        Err(_) => raw.parse::<NaiveDateTime>().map(|naive| naive.and_utc()),
    }
}

/// Serialize as RFC 3339 with millisecond precision.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Deserialize from either timestamp form.
///
/// # Errors
///
/// Returns an error if the value is not a string or cannot be parsed.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|e| de::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
}
