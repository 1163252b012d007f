use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::{FieldKind, FieldSpec, Record, SchemaError};

/// Ordered field list for one entity type, with exactly one key field.
///
/// Construct through [`Schema::new`] or a preset; deserialized schemas must be
/// passed through [`Schema::validate`] before use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Entity name, e.g. `"employee"`. Prefixes local storage keys.
    pub entity: String,
    /// Display name used in messages. Defaults to the capitalized entity.
    #[serde(default)]
    pub title: Option<String>,
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(entity: impl Into<String>, fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        let schema = Self {
            entity: entity.into(),
            title: None,
            fields,
        };
        schema.validate()?;
        Ok(schema)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The employee form backed by local storage.
    pub fn employee() -> Self {
        Self {
            entity: "employee".into(),
            title: Some("Employee".into()),
            fields: vec![
                FieldSpec::key("id", "Employee ID"),
                FieldSpec::text("name", "Employee Name"),
                FieldSpec::number("salary", "Salary"),
                FieldSpec::number("hra", "HRA"),
                FieldSpec::number("da", "DA"),
                FieldSpec::number("deduction", "Deduction"),
            ],
        }
    }

    /// The student form backed by the remote JSON database.
    pub fn student() -> Self {
        Self {
            entity: "student".into(),
            title: Some("Student".into()),
            fields: vec![
                FieldSpec::key("Roll-No", "Roll No"),
                FieldSpec::text("Full-Name", "Full Name"),
                FieldSpec::text("Class", "Class"),
                FieldSpec::text("Birth-Date", "Birth Date"),
                FieldSpec::text("Address", "Address"),
                FieldSpec::text("Enrollment-Date", "Enrollment Date"),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.entity.trim().is_empty() {
            return Err(SchemaError::MissingEntity);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.id.as_str()) {
                return Err(SchemaError::DuplicateField(field.id.clone()));
            }
        }

        let keys: Vec<String> = self
            .fields
            .iter()
            .filter(|f| f.key)
            .map(|f| f.id.clone())
            .collect();
        match keys.len() {
            0 => return Err(SchemaError::MissingKey),
            1 => {}
            _ => return Err(SchemaError::MultipleKeys(keys)),
        }

        if self.fields.len() < 2 {
            return Err(SchemaError::NoEditableFields);
        }
        Ok(())
    }

    pub fn title(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => {
                let mut chars = self.entity.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        }
    }

    /// Index of the key field. Falls back to the first field on an
    /// unvalidated schema.
    pub fn key_index(&self) -> usize {
        self.fields.iter().position(|f| f.key).unwrap_or(0)
    }

    pub fn key_field(&self) -> &FieldSpec {
        &self.fields[self.key_index()]
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    /// Local storage key for a record key: `"<entity>_<key>"`.
    pub fn storage_key(&self, key: &str) -> String {
        format!("{}_{}", self.entity, key)
    }

    /// Encode a record as a JSON object. Values of
    /// [`FieldKind::Number`] fields become JSON numbers when they parse.
    /// Properties the schema does not name are dropped.
    pub fn encode(&self, record: &Record) -> Value {
        let mut object = Map::new();
        for field in &self.fields {
            if let Some(value) = record.get(&field.id) {
                object.insert(field.id.clone(), encode_value(field.kind, value));
            }
        }
        Value::Object(object)
    }

    /// Decode a stored JSON object into a record. Unknown properties are
    /// ignored and missing ones are left out.
    pub fn decode(&self, value: &Value) -> Result<Record, serde_json::Error> {
        let object = match value {
            Value::Object(object) => object,
            other => {
                return Err(serde::de::Error::custom(format!(
                    "expected a JSON object for {} record, got {}",
                    self.entity, other
                )))
            }
        };

        let mut record = Record::new();
        for field in &self.fields {
            if let Some(value) = object.get(&field.id) {
                record.set(field.id.clone(), decode_value(value));
            }
        }
        Ok(record)
    }

    /// Encode a record as a JSON string.
    pub fn encode_str(&self, record: &Record) -> String {
        self.encode(record).to_string()
    }

    /// Decode a record from a JSON string.
    pub fn decode_str(&self, json: &str) -> Result<Record, serde_json::Error> {
        let value: Value = serde_json::from_str(json)?;
        self.decode(&value)
    }
}

fn encode_value(kind: FieldKind, value: &str) -> Value {
    if kind == FieldKind::Number {
        let trimmed = value.trim();
        if let Ok(int) = trimmed.parse::<i64>() {
            return Value::Number(int.into());
        }
        if let Ok(float) = trimmed.parse::<f64>() {
            if let Some(int) = exact_int(float) {
                return Value::Number(int.into());
            }
            if let Some(number) = Number::from_f64(float) {
                return Value::Number(number);
            }
        }
    }
    Value::String(value.to_string())
}

/// Largest magnitude below which every integral f64 is exact.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

fn exact_int(float: f64) -> Option<i64> {
    (float.fract() == 0.0 && float.abs() <= MAX_EXACT_INT).then(|| float as i64)
}

fn decode_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) if n.is_f64() => match n.as_f64().and_then(exact_int) {
            Some(int) => int.to_string(),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}
