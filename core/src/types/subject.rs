//! The person a consent belongs to.

use serde_json::Value;

use crate::error::Result;
use crate::record::{
    bool_field, insert_text, object_field, record_impls, string_field, take_present, Fields, Record,
};
use crate::timestamp::{self, Timestamp, TimestampInput, ATOM};

/// The data subject (person) a consent applies to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Subject {
    pub id: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: Option<String>,
    /// `None` means unset; `Some(false)` is still sent on the wire.
    pub verified: Option<bool>,
    pub preferences: Option<Fields>,
    pub timestamp: Option<Timestamp>,
}

impl Subject {
    pub fn set_timestamp(&mut self, value: impl Into<TimestampInput>) -> Result<()> {
        self.set_timestamp_with_format(value, ATOM)
    }

    /// Like `set_timestamp`, parsing text input with a chrono format string.
    pub fn set_timestamp_with_format(
        &mut self,
        value: impl Into<TimestampInput>,
        format: &str,
    ) -> Result<()> {
        self.timestamp = Some(value.into().resolve(format)?);
        Ok(())
    }
}

impl Record for Subject {
    fn configure(&mut self, mut fields: Fields) -> Result<()> {
        if let Some(value) = take_present(&mut fields, "timestamp") {
            self.timestamp = Some(timestamp::from_value("timestamp", value)?);
        }

        for (key, value) in fields {
            match key.as_str() {
                "id" => self.id = string_field(&key, value)?,
                "email" => self.email = string_field(&key, value)?,
                "first_name" => self.first_name = string_field(&key, value)?,
                "last_name" => self.last_name = string_field(&key, value)?,
                "full_name" => self.full_name = string_field(&key, value)?,
                "verified" => self.verified = bool_field(&key, value)?,
                "preferences" => self.preferences = object_field(&key, value)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn to_fields(&self) -> Fields {
        let mut out = Fields::new();
        insert_text(&mut out, "id", self.id.as_deref());
        insert_text(&mut out, "email", self.email.as_deref());
        insert_text(&mut out, "first_name", self.first_name.as_deref());
        insert_text(&mut out, "last_name", self.last_name.as_deref());
        insert_text(&mut out, "full_name", self.full_name.as_deref());
        if let Some(verified) = self.verified {
            out.insert("verified".to_string(), Value::Bool(verified));
        }
        if let Some(preferences) = self.preferences.as_ref().filter(|p| !p.is_empty()) {
            out.insert("preferences".to_string(), Value::Object(preferences.clone()));
        }
        if let Some(ts) = &self.timestamp {
            out.insert("timestamp".to_string(), Value::String(timestamp::format(ts)));
        }
        out
    }
}

record_impls!(Subject);
