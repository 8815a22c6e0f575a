//! Value coercion between backend JSON, typed record fields and form strings.
//!
//! Decoding is lenient: a malformed scalar becomes `None` and is logged rather
//! than failing the whole record. Encoding goes through the `*_value` helpers so
//! every service writes numbers, dates and references the same way.

use super::{Choice, RecordId, Reference};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::str::FromStr;
use tracing::warn;

/// Date format used by date inputs and by the backend's date fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Date-time format used by date-time inputs (minute precision).
pub const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Deserialize)]
#[serde(untagged)]
enum RawReference {
    Id(i64),
    Text(String),
    Lookup {
        #[serde(rename = "Id")]
        id: i64,
        #[serde(rename = "Name", default)]
        name: Option<String>,
    },
}

/// Decodes a reference field given as an id, a numeric string, a lookup object or null.
pub fn reference<'de, D>(deserializer: D) -> Result<Option<Reference>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawReference>::deserialize(deserializer)?;
    Ok(match raw {
        None => None,
        Some(RawReference::Id(id)) => Some(Reference::to(RecordId(id))),
        Some(RawReference::Text(text)) => parse_reference(&text).map(Reference::to),
        Some(RawReference::Lookup { id, name }) => Some(Reference {
            id: RecordId(id),
            name,
        }),
    })
}

/// Decodes a [`Choice`] field, mapping unknown values to `None`.
pub fn choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Choice,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.trim().is_empty()).and_then(|s| match T::parse(&s) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring stored value: {}", e);
            None
        }
    }))
}

/// Decodes a text field that the backend may hand back as a number.
pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// Decodes an integer field given as a number or a numeric string.
pub fn integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().and_then(|f| f.round().to_i64())),
        Some(Value::String(s)) => parse_integer(&s),
        _ => None,
    })
}

/// Decodes a money field given as a number or a numeric string.
pub fn decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(|f| Decimal::try_from(f).ok())),
        Some(Value::String(s)) => parse_decimal(&s),
        _ => None,
    })
}

/// Decodes a date field given as a plain date or a full timestamp.
pub fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_date(&s).or_else(|| parse_timestamp(&s).map(|ts| ts.date_naive()))))
}

/// Decodes a timestamp field.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_timestamp(&s)))
}

/// Parses a reference picker value; empty or non-numeric input means "no reference".
#[must_use]
pub fn parse_reference(input: &str) -> Option<RecordId> {
    parse_integer(input).map(RecordId)
}

/// Parses an integer, tolerating surrounding whitespace and a trailing `.0`.
#[must_use]
pub fn parse_integer(input: &str) -> Option<i64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().filter(|f| f.fract() == 0.0).and_then(|f| f.to_i64()))
}

/// Parses a decimal amount.
#[must_use]
pub fn parse_decimal(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .ok()
        .or_else(|| Decimal::from_scientific(trimmed).ok())
}

/// Parses a `YYYY-MM-DD` date.
#[must_use]
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).ok()
}

/// Parses an RFC 3339 timestamp, a naive date-time (taken as UTC) or a bare date (midnight UTC).
#[must_use]
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", DATETIME_INPUT_FORMAT, "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| parse_date(trimmed).map(|d| d.and_time(NaiveTime::MIN)))
        .map(|naive| naive.and_utc())
}

/// Formats a date for a date input.
#[must_use]
pub fn date_input(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a timestamp for a date-time input.
#[must_use]
pub fn datetime_input(ts: DateTime<Utc>) -> String {
    ts.format(DATETIME_INPUT_FORMAT).to_string()
}

/// JSON value for an optional reference: the id, or `null`.
#[must_use]
pub fn reference_value(id: Option<RecordId>) -> Value {
    id.map_or(Value::Null, |id| Value::from(id.0))
}

/// JSON value for a money amount.
#[must_use]
pub fn decimal_value(amount: Decimal) -> Value {
    amount.to_f64().map_or(Value::Null, Value::from)
}

/// JSON value for a date.
#[must_use]
pub fn date_value(date: Option<NaiveDate>) -> Value {
    date.map_or(Value::Null, |d| Value::from(date_input(d)))
}

/// JSON value for a timestamp.
#[must_use]
pub fn timestamp_value(ts: Option<DateTime<Utc>>) -> Value {
    ts.map_or(Value::Null, |ts| Value::from(ts.to_rfc3339()))
}

/// JSON value for an optional text field.
#[must_use]
pub fn text_value(text: Option<&str>) -> Value {
    text.map_or(Value::Null, Value::from)
}
