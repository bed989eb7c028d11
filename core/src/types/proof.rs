//! Proof of consent: the submitted content and the form it came from.

use serde_json::Value;

use crate::error::Result;
use crate::record::{record_impls, string_field, Fields, Record};

/// Evidence attached to a consent event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Proof {
    /// What the subject filled in, e.g. the submitted form values.
    pub content: String,
    /// What the subject was prompted with, e.g. the form markup.
    pub form: String,
}

impl Proof {
    pub fn new(content: impl Into<String>, form: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            form: form.into(),
        }
    }
}

impl Record for Proof {
    fn configure(&mut self, fields: Fields) -> Result<()> {
        for (key, value) in fields {
            match key.as_str() {
                "content" => self.content = string_field(&key, value)?.unwrap_or_default(),
                "form" => self.form = string_field(&key, value)?.unwrap_or_default(),
                _ => {}
            }
        }
        Ok(())
    }

    /// Both keys are always present, even when empty.
    fn to_fields(&self) -> Fields {
        let mut out = Fields::new();
        out.insert("content".to_string(), Value::String(self.content.clone()));
        out.insert("form".to_string(), Value::String(self.form.clone()));
        out
    }
}

record_impls!(Proof);
