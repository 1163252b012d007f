//! Records and the field schema that describes them.
//!
//! A [`Record`] is a flat mapping from field id to string value. The
//! [`Schema`] lists the fields a form edits, marks exactly one of them as the
//! key, and decides how values are encoded when a record is stored as JSON.
//!
//! ## Example
//!
//! ```ignore
//! use record_editor::{Record, Schema};
//!
//! let schema = Schema::employee();
//! let record = Record::new()
//!     .with("id", "E1")
//!     .with("name", "Alice")
//!     .with("salary", "50000");
//!
//! let json = schema.encode(&record);
//! assert_eq!(json["salary"], 50000);
//! ```

mod schema;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub use schema::Schema;

/// How a field's value is written into the stored JSON document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    /// Stored as a JSON number when the value parses as one.
    Number,
}

/// One field of a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Identifier, also used as the property name in stored records.
    pub id: String,
    /// Human-readable name used in messages.
    pub label: String,
    /// Whether this field is the record key.
    #[serde(default)]
    pub key: bool,
    #[serde(default)]
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn text(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            key: false,
            kind: FieldKind::Text,
        }
    }

    pub fn number(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            kind: FieldKind::Number,
            ..Self::text(id, label)
        }
    }

    pub fn key(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: true,
            ..Self::text(id, label)
        }
    }
}

/// The full set of field values for one entity instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    values: BTreeMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.values.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Error raised when a schema definition is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The entity name is blank.
    MissingEntity,
    /// No field is marked as the key.
    MissingKey,
    /// More than one field is marked as the key.
    MultipleKeys(Vec<String>),
    /// Two fields share an id.
    DuplicateField(String),
    /// The schema has no field besides the key.
    NoEditableFields,
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::MissingEntity => write!(f, "schema entity name is empty"),
            SchemaError::MissingKey => write!(f, "schema has no key field"),
            SchemaError::MultipleKeys(ids) => {
                write!(f, "schema has more than one key field: {}", ids.join(", "))
            }
            SchemaError::DuplicateField(id) => write!(f, "duplicate field id: {}", id),
            SchemaError::NoEditableFields => write!(f, "schema has no fields besides the key"),
        }
    }
}

impl std::error::Error for SchemaError {}
