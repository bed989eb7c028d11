//! Timestamp parsing and formatting for the service's wire format.
//!
//! The service exchanges ISO-8601 extended timestamps with an explicit
//! offset (`2024-01-01T00:00:00+00:00`). Parsing with the default format
//! accepts any RFC 3339 string, including `Z` and fractional seconds.

use chrono::{DateTime, FixedOffset, Utc};
use serde_json::Value;

use crate::error::{ConsentError, Result};

pub type Timestamp = DateTime<FixedOffset>;

/// Output format for every emitted timestamp, and the default input format.
pub const ATOM: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// A timestamp as handed to a setter: still text, or already parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum TimestampInput {
    Text(String),
    Parsed(Timestamp),
}

impl TimestampInput {
    pub fn resolve(self, format: &str) -> Result<Timestamp> {
        match self {
            TimestampInput::Text(text) => parse(&text, format),
            TimestampInput::Parsed(ts) => Ok(ts),
        }
    }
}

impl From<&str> for TimestampInput {
    fn from(text: &str) -> Self {
        TimestampInput::Text(text.to_string())
    }
}

impl From<String> for TimestampInput {
    fn from(text: String) -> Self {
        TimestampInput::Text(text)
    }
}

impl From<Timestamp> for TimestampInput {
    fn from(ts: Timestamp) -> Self {
        TimestampInput::Parsed(ts)
    }
}

impl From<DateTime<Utc>> for TimestampInput {
    fn from(ts: DateTime<Utc>) -> Self {
        TimestampInput::Parsed(ts.fixed_offset())
    }
}

pub fn parse(text: &str, format: &str) -> Result<Timestamp> {
    let parsed = if format == ATOM {
        DateTime::parse_from_rfc3339(text)
    } else {
        DateTime::parse_from_str(text, format)
    };
    parsed.map_err(|source| ConsentError::InvalidTimestamp {
        value: text.to_string(),
        source,
    })
}

pub fn format(ts: &Timestamp) -> String {
    ts.format(ATOM).to_string()
}

/// Parse a timestamp carried in a JSON field.
pub(crate) fn from_value(field: &str, value: Value) -> Result<Timestamp> {
    match value {
        Value::String(text) => parse(&text, ATOM),
        _ => Err(ConsentError::InvalidField {
            field: field.to_string(),
            expected: "an RFC 3339 timestamp string",
        }),
    }
}
