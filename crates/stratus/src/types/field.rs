//! Tri-state record field codec.
//!
//! Partial updates send only the fields the caller touched, so every record
//! field must distinguish "not present in the payload at all" from "present
//! and null" from "present with a value". Plain `Option` conflates the first
//! two; [`Field`] keeps them apart.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A record field that is independently present or absent on the wire.
///
/// - `Absent` fields are omitted from outbound payloads entirely (and the
///   server leaves them untouched on a partial update).
/// - `Null` fields are serialized as JSON `null` — used to explicitly clear
///   a server-side value, e.g. detaching a keypair from a hostname.
/// - `Value` fields carry the value itself.
///
/// Record structs annotate each field with
/// `#[serde(default, skip_serializing_if = "Field::is_absent")]` so that a
/// missing key deserializes to `Absent` and an `Absent` field never reaches
/// the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Field<T> {
    /// The field is not part of the payload.
    #[default]
    Absent,
    /// The field is present and explicitly null.
    Null,
    /// The field is present with a value.
    Value(T),
}

impl<T> Field<T> {
    /// True when the field should be omitted from a serialized payload.
    pub fn is_absent(&self) -> bool {
        matches!(self, Field::Absent)
    }

    /// True when the field is an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Field::Null)
    }

    /// Returns the value, if one is present.
    pub fn value(&self) -> Option<&T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Consumes the field, returning the value if one is present.
    pub fn into_value(self) -> Option<T> {
        match self {
            Field::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Replaces the field with `Absent`, returning the previous state.
    pub fn take(&mut self) -> Field<T> {
        std::mem::take(self)
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Value(value)
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Field::Value(v),
            None => Field::Absent,
        }
    }
}

impl<T: Serialize> Serialize for Field<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            // Absent fields are skipped via the field attribute; if one is
            // serialized anyway, null is the only honest representation.
            Field::Absent | Field::Null => serializer.serialize_none(),
            Field::Value(v) => v.serialize(serializer),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Field<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // A missing key never reaches this point (serde `default` yields
        // Absent); a key that is present deserializes to Null or Value.
        Ok(match Option::<T>::deserialize(deserializer)? {
            None => Field::Null,
            Some(v) => Field::Value(v),
        })
    }
}
