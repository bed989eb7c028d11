//! Legal documents a consent was given against.
//!
//! A notice is identified by `identifier` and `version`; empty fields are left
//! out of the emitted map so the service falls back to its latest version.

use serde_json::Value;

use crate::error::Result;
use crate::record::{insert_text, record_impls, string_field, take_present, Fields, Record};
use crate::timestamp::{self, Timestamp};

/// A versioned legal document the subject accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegalNotice {
    /// `privacy_policy`, `cookie_policy`, `terms`, or a custom name.
    pub identifier: String,
    /// Accepted version; the service assumes `latest` when omitted.
    pub version: String,
    pub content: String,
    pub timestamp: Option<Timestamp>,
}

impl LegalNotice {
    pub fn new(identifier: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            version: version.into(),
            ..Self::default()
        }
    }
}

impl Record for LegalNotice {
    fn configure(&mut self, mut fields: Fields) -> Result<()> {
        if let Some(value) = take_present(&mut fields, "timestamp") {
            self.timestamp = Some(timestamp::from_value("timestamp", value)?);
        }

        for (key, value) in fields {
            match key.as_str() {
                "identifier" => self.identifier = string_field(&key, value)?.unwrap_or_default(),
                "version" => self.version = string_field(&key, value)?.unwrap_or_default(),
                "content" => self.content = string_field(&key, value)?.unwrap_or_default(),
                _ => {}
            }
        }
        Ok(())
    }

    fn to_fields(&self) -> Fields {
        let mut out = Fields::new();
        insert_text(&mut out, "identifier", Some(self.identifier.as_str()));
        insert_text(&mut out, "version", Some(self.version.as_str()));
        insert_text(&mut out, "content", Some(self.content.as_str()));
        if let Some(ts) = &self.timestamp {
            out.insert("timestamp".to_string(), Value::String(timestamp::format(ts)));
        }
        out
    }
}

record_impls!(LegalNotice);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omits_empty_fields() {
        let notice = LegalNotice::new("privacy_policy", "");
        assert_eq!(Value::Object(notice.to_fields()), json!({"identifier": "privacy_policy"}));
    }

    #[test]
    fn parses_timestamp_and_keeps_key_order() {
        let input = json!({
            "identifier": "terms",
            "version": "3",
            "content": "...",
            "timestamp": "2024-03-01T10:00:00+01:00",
        });
        let notice: LegalNotice = serde_json::from_value(input.clone()).unwrap();
        assert!(notice.timestamp.is_some());
        let keys: Vec<_> = notice.to_fields().keys().cloned().collect();
        assert_eq!(keys, ["identifier", "version", "content", "timestamp"]);
        assert_eq!(Value::Object(notice.to_fields()), input);
    }
}
