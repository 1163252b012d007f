use std::fmt;

use super::FormState;

/// Required fields were left empty. Recovered locally by flagging the fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "required fields are empty: {}", self.fields.join(", "))
    }
}

impl std::error::Error for ValidationError {}

impl FormState {
    /// Check that every enabled field is non-blank, flagging each one that is
    /// not. Disabled fields (the key while editing an existing record) are
    /// skipped and unflagged.
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        for index in 0..self.values.len() {
            self.invalid[index] = self.enabled_at(index) && self.values[index].trim().is_empty();
        }

        let fields: Vec<String> = self
            .invalid_fields()
            .into_iter()
            .map(str::to_string)
            .collect();
        if fields.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { fields })
        }
    }
}
