//! Custom field records and snapshots.

use crate::normalize::normalize;
use crate::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One selectable option of a field. Opaque: it is carried through unchanged.
pub type FieldOption = Value;

/// A remote custom-field definition with its ordered option list.
///
/// Two wire shapes deserialize into this record: the snapshot shape
/// (`id` / `name` / `picklistOptions`) and the flat shape
/// (`fieldId` / `fieldName` / `options`). It always serializes in the
/// snapshot shape. Absent or `null` members become empty so that incomplete
/// records survive decoding and can be reported instead of rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Remote-assigned stable identifier.
    #[serde(default, alias = "fieldId", deserialize_with = "null_as_default")]
    pub id: String,
    /// Remote display name, possibly carrying a prefix convention.
    #[serde(default, alias = "fieldName", deserialize_with = "null_as_default")]
    pub name: String,
    /// Ordered option records.
    #[serde(
        rename = "picklistOptions",
        alias = "options",
        default,
        deserialize_with = "null_as_default"
    )]
    pub options: Vec<FieldOption>,
    /// Why the record could not be decoded. Such a field is reported by a
    /// restore but never sent.
    #[serde(skip)]
    pub rejection: Option<String>,
}

impl Field {
    /// Creates a field from its parts.
    pub fn new(id: impl Into<String>, name: impl Into<String>, options: Vec<FieldOption>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            options,
            rejection: None,
        }
    }

    /// Decodes one snapshot record without failing.
    ///
    /// A record that does not deserialize keeps whatever textual id and name
    /// it carries and records the decode error in [`Field::rejection`].
    pub fn from_record(record: Value) -> Self {
        let id = member_text(&record, "id", "fieldId");
        let name = member_text(&record, "name", "fieldName");
        serde_json::from_value(record).unwrap_or_else(|e: serde_json::Error| Self {
            id,
            name,
            options: Vec::new(),
            rejection: Some(e.to_string()),
        })
    }

    /// Returns true when the field decoded cleanly and has an id, a name and
    /// at least one option.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.rejection.is_none()
            && !self.id.is_empty()
            && !self.name.is_empty()
            && !self.options.is_empty()
    }

    /// Names the members that keep this field from being complete.
    pub fn missing_parts(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.is_empty() {
            missing.push("id");
        }
        if self.name.is_empty() {
            missing.push("name");
        }
        if self.options.is_empty() {
            missing.push("options");
        }
        missing
    }
}

/// Portable capture of a filtered field set, later fed back into a restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(rename = "Restore", alias = "fields")]
    pub fields: Vec<Field>,
}

impl Snapshot {
    /// Creates a snapshot holding only the complete fields of `fields`.
    pub fn new(fields: Vec<Field>) -> Self {
        let mut snapshot = Self { fields };
        snapshot.retain_complete();
        snapshot
    }

    /// Drops every field missing an id, a name or its options.
    /// Returns how many fields were removed.
    pub fn retain_complete(&mut self) -> usize {
        let before = self.fields.len();
        self.fields.retain(Field::is_complete);
        before - self.fields.len()
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the snapshot holds no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a snapshot from an already decoded value.
    ///
    /// Accepts `{"Restore": [...]}`, `{"fields": [...]}` or a bare array of
    /// fields. Records are decoded one by one: incomplete or undecodable
    /// records are kept so the caller can report them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedInput`] when no field list can be found.
    pub fn from_value(value: Value) -> Result<Self> {
        let records = match value {
            Value::Array(records) => records,
            Value::Object(mut map) => match map.remove("Restore").or_else(|| map.remove("fields")) {
                Some(Value::Array(records)) => records,
                Some(other) => {
                    return Err(Error::MalformedInput(format!(
                        "snapshot field list must be an array, got {}",
                        kind_of(&other)
                    )));
                }
                None => {
                    return Err(Error::MalformedInput(
                        "snapshot object has neither `Restore` nor `fields`".to_string(),
                    ));
                }
            },
            other => {
                return Err(Error::MalformedInput(format!(
                    "snapshot must be an object or array, got {}",
                    kind_of(&other)
                )));
            }
        };

        Ok(Self {
            fields: records.into_iter().map(Field::from_record).collect(),
        })
    }

    /// Decodes a snapshot that may have been JSON-encoded several times.
    pub fn from_encoded(raw: &str) -> Result<Self> {
        Self::from_value(normalize(raw)?)
    }

    /// Serializes the snapshot into its portable string form.
    pub fn to_encoded(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn member_text(record: &Value, key: &str, alias: &str) -> String {
    match record.get(key).or_else(|| record.get(alias)) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
