//! Field-map ingestion shared by every consent service resource.
//!
//! # Design
//! The service speaks loosely-typed JSON objects. Each resource implements
//! `Record`: `configure` walks the incoming map and assigns the keys it
//! declares, silently dropping the rest, and `to_fields` emits only the
//! fields that carry a value, in wire order. Field sets are fixed per type
//! by a `match` on the key, so no reflection is involved.
//!
//! Assignment is not atomic. A malformed field stops `configure` with an
//! error, but fields assigned before it keep their new values.

use serde_json::{Map, Value};

use crate::error::{ConsentError, Result};

/// A JSON object as sent to or received from the service.
pub type Fields = Map<String, Value>;

/// A resource that can be configured from, and serialized to, a `Fields` map.
pub trait Record: Default {
    /// Assign every recognised key in `fields`. Unknown keys are ignored.
    fn configure(&mut self, fields: Fields) -> Result<()>;

    /// The non-empty fields of this record, in wire order.
    fn to_fields(&self) -> Fields;

    fn from_fields(fields: Fields) -> Result<Self> {
        let mut record = Self::default();
        record.configure(fields)?;
        Ok(record)
    }

    /// Build a record from a JSON value that must be an object.
    fn from_value(field: &str, value: Value) -> Result<Self> {
        Self::from_fields(expect_object(field, value)?)
    }
}

/// Either an already-built record or the raw fields to build one from.
///
/// Setters that accept nested resources take `impl Into<Input<T>>`, so a
/// caller can pass a `Subject` or a `Fields` map interchangeably.
#[derive(Debug, Clone, PartialEq)]
pub enum Input<T> {
    Typed(T),
    Raw(Fields),
}

impl<T: Record> Input<T> {
    pub fn resolve(self) -> Result<T> {
        match self {
            Input::Typed(record) => Ok(record),
            Input::Raw(fields) => T::from_fields(fields),
        }
    }
}

/// Implements serde traits and `Input` conversions for a `Record` type.
macro_rules! record_impls {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serde::Serialize::serialize(
                    &<$ty as $crate::record::Record>::to_fields(self),
                    serializer,
                )
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let fields = <$crate::record::Fields as serde::Deserialize>::deserialize(deserializer)?;
                <$ty as $crate::record::Record>::from_fields(fields).map_err(serde::de::Error::custom)
            }
        }

        impl From<$ty> for $crate::record::Input<$ty> {
            fn from(record: $ty) -> Self {
                $crate::record::Input::Typed(record)
            }
        }

        impl From<$crate::record::Fields> for $crate::record::Input<$ty> {
            fn from(fields: $crate::record::Fields) -> Self {
                $crate::record::Input::Raw(fields)
            }
        }
    };
}

pub(crate) use record_impls;

/// Whether a value counts as "not provided" for the keys a resource
/// intercepts before plain assignment.
pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Remove `key` from `fields`, returning its value only when non-empty.
pub(crate) fn take_present(fields: &mut Fields, key: &str) -> Option<Value> {
    fields.remove(key).filter(|value| !is_empty(value))
}

pub(crate) fn expect_object(field: &str, value: Value) -> Result<Fields> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(invalid(field, "an object")),
    }
}

pub(crate) fn expect_array(field: &str, value: Value) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        _ => Err(invalid(field, "an array")),
    }
}

/// Strings pass through, numbers are rendered, `null` clears the field.
pub(crate) fn string_field(field: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        _ => Err(invalid(field, "a string")),
    }
}

pub(crate) fn bool_field(field: &str, value: Value) -> Result<Option<bool>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(flag)),
        _ => Err(invalid(field, "a boolean")),
    }
}

pub(crate) fn object_field(field: &str, value: Value) -> Result<Option<Fields>> {
    match value {
        Value::Null => Ok(None),
        other => expect_object(field, other).map(Some),
    }
}

/// Insert `value` under `key` unless it is empty.
pub(crate) fn insert_text(out: &mut Fields, key: &str, value: Option<&str>) {
    if let Some(text) = value.filter(|text| !text.is_empty()) {
        out.insert(key.to_string(), Value::String(text.to_string()));
    }
}

fn invalid(field: &str, expected: &'static str) -> ConsentError {
    ConsentError::InvalidField {
        field: field.to_string(),
        expected,
    }
}
