//! Consent records and their nested children.
//!
//! # Design
//! `subject`, `proofs`, `legal_notices` and `timestamp` accept either typed
//! values or raw field maps and are coerced on the way in. A malformed child
//! fails the whole assignment and leaves the previous value in place. On the
//! way out an unset subject is emitted as `false` while empty lists are
//! omitted.

use serde_json::Value;

use crate::error::Result;
use crate::record::{
    expect_array, insert_text, object_field, record_impls, string_field, take_present, Fields, Input,
    Record,
};
use crate::timestamp::{self, Timestamp, TimestampInput, ATOM};

use super::{LegalNotice, Proof, Subject};

/// A recorded consent event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Consent {
    pub id: Option<String>,
    /// When the consent occurred. The service fills it in when omitted.
    pub timestamp: Option<Timestamp>,
    pub subject: Option<Subject>,
    pub legal_notices: Vec<LegalNotice>,
    pub proofs: Vec<Proof>,
    /// Free-form consent flags, e.g. `newsletter: true`. Also stored on the
    /// subject by the service.
    pub preferences: Fields,
    pub owner: Option<String>,
    /// `private` (server-side HTTP) or `public` (JavaScript widget).
    pub source: Option<String>,
}

impl Consent {
    pub fn set_subject(&mut self, subject: impl Into<Input<Subject>>) -> Result<()> {
        self.subject = Some(subject.into().resolve()?);
        Ok(())
    }

    /// Replace every proof. On error the previous proofs are kept.
    pub fn set_proofs<I>(&mut self, proofs: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Input<Proof>>,
    {
        self.proofs = proofs
            .into_iter()
            .map(|proof| proof.into().resolve())
            .collect::<Result<_>>()?;
        Ok(())
    }

    pub fn add_proof(&mut self, proof: impl Into<Input<Proof>>) -> Result<()> {
        self.proofs.push(proof.into().resolve()?);
        Ok(())
    }

    /// Replace every legal notice. On error the previous notices are kept.
    pub fn set_legal_notices<I>(&mut self, notices: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Input<LegalNotice>>,
    {
        self.legal_notices = notices
            .into_iter()
            .map(|notice| notice.into().resolve())
            .collect::<Result<_>>()?;
        Ok(())
    }

    pub fn add_legal_notice(&mut self, notice: impl Into<Input<LegalNotice>>) -> Result<()> {
        self.legal_notices.push(notice.into().resolve()?);
        Ok(())
    }

    pub fn set_timestamp(&mut self, value: impl Into<TimestampInput>) -> Result<()> {
        self.set_timestamp_with_format(value, ATOM)
    }

    pub fn set_timestamp_with_format(
        &mut self,
        value: impl Into<TimestampInput>,
        format: &str,
    ) -> Result<()> {
        self.timestamp = Some(value.into().resolve(format)?);
        Ok(())
    }
}

/// Convert a JSON array of objects into typed inputs for a list setter.
fn raw_items<T>(field: &str, value: Value) -> Result<Vec<Input<T>>> {
    expect_array(field, value)?
        .into_iter()
        .map(|item| match item {
            Value::Object(fields) => Ok(Input::Raw(fields)),
            _ => Err(crate::ConsentError::InvalidField {
                field: field.to_string(),
                expected: "an array of objects",
            }),
        })
        .collect()
}

impl Record for Consent {
    /// Nested resources and the timestamp are handled first; empty values
    /// for them leave the current state untouched.
    fn configure(&mut self, mut fields: Fields) -> Result<()> {
        if let Some(value) = take_present(&mut fields, "subject") {
            self.set_subject(Subject::from_value("subject", value)?)?;
        }
        if let Some(value) = take_present(&mut fields, "proofs") {
            self.set_proofs(raw_items::<Proof>("proofs", value)?)?;
        }
        if let Some(value) = take_present(&mut fields, "legal_notices") {
            self.set_legal_notices(raw_items::<LegalNotice>("legal_notices", value)?)?;
        }
        if let Some(value) = take_present(&mut fields, "timestamp") {
            self.timestamp = Some(timestamp::from_value("timestamp", value)?);
        }

        for (key, value) in fields {
            match key.as_str() {
                "id" => self.id = string_field(&key, value)?,
                "preferences" => self.preferences = object_field(&key, value)?.unwrap_or_default(),
                "owner" => self.owner = string_field(&key, value)?,
                "source" => self.source = string_field(&key, value)?,
                _ => {}
            }
        }
        Ok(())
    }

    /// `subject` is always present (`false` when unset), while empty
    /// `legal_notices` and `proofs` are left out entirely.
    fn to_fields(&self) -> Fields {
        let mut out = Fields::new();
        insert_text(&mut out, "id", self.id.as_deref());
        if !self.preferences.is_empty() {
            out.insert("preferences".to_string(), Value::Object(self.preferences.clone()));
        }
        if let Some(ts) = &self.timestamp {
            out.insert("timestamp".to_string(), Value::String(timestamp::format(ts)));
        }
        insert_text(&mut out, "owner", self.owner.as_deref());
        insert_text(&mut out, "source", self.source.as_deref());

        let subject = match &self.subject {
            Some(subject) => Value::Object(subject.to_fields()),
            None => Value::Bool(false),
        };
        out.insert("subject".to_string(), subject);

        if !self.legal_notices.is_empty() {
            let notices = self.legal_notices.iter().map(|n| Value::Object(n.to_fields())).collect();
            out.insert("legal_notices".to_string(), Value::Array(notices));
        }
        if !self.proofs.is_empty() {
            let proofs = self.proofs.iter().map(|p| Value::Object(p.to_fields())).collect();
            out.insert("proofs".to_string(), Value::Array(proofs));
        }
        out
    }
}

record_impls!(Consent);
