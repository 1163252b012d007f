//! Form state and its transition function.
//!
//! [`FormState`] holds every field value, the validation flags and the
//! [`Mode`]. It never performs I/O: [`FormState::apply`] consumes an
//! [`Event`] and returns the [`Effect`]s a driver must carry out, such as a
//! store lookup or a message to show. Store results come back in as
//! completion events tagged with the [`Ticket`] of the call that produced
//! them.
//!
//! Enabled flags and buttons are derived from the mode on every read, so the
//! key field is editable exactly when the mode is [`Mode::Empty`] or
//! [`Mode::New`].
//!
//! ## Example
//!
//! ```ignore
//! use record_editor::form::{Command, Effect, FormState, Mode};
//! use record_editor::Schema;
//!
//! let mut form = FormState::new(Schema::employee());
//! form.apply(Command::input("id", "E1").into());
//! let effects = form.apply(Command::OnKeyBlur.into());
//! assert!(matches!(effects[0], Effect::Lookup { .. }));
//! assert_eq!(form.mode(), Mode::Checking);
//! ```

mod event;
mod transition;
mod validate;

use std::fmt;
use std::sync::Arc;

use crate::record::{FieldSpec, Record, Schema};

pub use event::{Command, Effect, Event, Ticket};
pub use validate::ValidationError;

/// Which part of the lookup/edit cycle the form is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// No record selected. Only the key field is editable.
    Empty,
    /// A key lookup is in flight. Nothing is editable.
    Checking,
    /// The key was not found; a new record is being entered.
    New,
    /// The key was found; the stored record is being edited.
    Existing,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Empty => "empty",
            Mode::Checking => "checking",
            Mode::New => "new",
            Mode::Existing => "existing",
        };
        f.write_str(name)
    }
}

/// Enabled state of the three form buttons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Buttons {
    pub save: bool,
    pub update: bool,
    pub reset: bool,
}

impl Buttons {
    pub const NONE: Buttons = Buttons {
        save: false,
        update: false,
        reset: false,
    };
}

/// Read-only view of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldView<'a> {
    pub spec: &'a FieldSpec,
    pub value: &'a str,
    pub enabled: bool,
    pub invalid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOp {
    Create,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    Lookup {
        ticket: Ticket,
        key: String,
        prior: Mode,
    },
    Write {
        ticket: Ticket,
        op: WriteOp,
        key: String,
    },
}

impl Pending {
    fn ticket(&self) -> Ticket {
        match self {
            Pending::Lookup { ticket, .. } | Pending::Write { ticket, .. } => *ticket,
        }
    }
}

/// The complete state of one record editor form.
#[derive(Debug, Clone)]
pub struct FormState {
    schema: Arc<Schema>,
    values: Vec<String>,
    invalid: Vec<bool>,
    mode: Mode,
    pending: Option<Pending>,
    next_ticket: Ticket,
    /// Key confirmed by the last completed lookup.
    checked_key: Option<String>,
}

impl FormState {
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        let schema = schema.into();
        let len = schema.fields.len();
        Self {
            schema,
            values: vec![String::new(); len],
            invalid: vec![false; len],
            mode: Mode::Empty,
            pending: None,
            next_ticket: 1,
            checked_key: None,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True while a store call is in flight.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Ticket of the store call in flight, if any.
    pub fn pending_ticket(&self) -> Option<Ticket> {
        self.pending.as_ref().map(Pending::ticket)
    }

    pub fn buttons(&self) -> Buttons {
        if self.is_busy() {
            return Buttons::NONE;
        }
        match self.mode {
            Mode::Empty | Mode::Checking => Buttons::NONE,
            Mode::New => Buttons {
                save: true,
                update: false,
                reset: true,
            },
            Mode::Existing => Buttons {
                save: false,
                update: true,
                reset: true,
            },
        }
    }

    /// Current (untrimmed) value of the key field.
    pub fn key(&self) -> &str {
        &self.values[self.schema.key_index()]
    }

    pub fn value(&self, field: &str) -> Option<&str> {
        self.schema
            .position(field)
            .map(|index| self.values[index].as_str())
    }

    pub fn is_enabled(&self, field: &str) -> bool {
        self.schema
            .position(field)
            .map(|index| self.enabled_at(index))
            .unwrap_or(false)
    }

    pub fn is_invalid(&self, field: &str) -> bool {
        self.schema
            .position(field)
            .map(|index| self.invalid[index])
            .unwrap_or(false)
    }

    /// Ids of the fields flagged by the last validation, in schema order.
    pub fn invalid_fields(&self) -> Vec<&str> {
        self.schema
            .fields
            .iter()
            .zip(&self.invalid)
            .filter(|(_, invalid)| **invalid)
            .map(|(spec, _)| spec.id.as_str())
            .collect()
    }

    pub fn fields(&self) -> Vec<FieldView<'_>> {
        self.schema
            .fields
            .iter()
            .enumerate()
            .map(|(index, spec)| FieldView {
                spec,
                value: &self.values[index],
                enabled: self.enabled_at(index),
                invalid: self.invalid[index],
            })
            .collect()
    }

    /// The field that should hold the cursor.
    pub fn focus(&self) -> Option<&str> {
        match self.mode {
            Mode::Empty => Some(self.schema.key_field().id.as_str()),
            Mode::Checking => None,
            Mode::New | Mode::Existing => self
                .schema
                .fields
                .iter()
                .find(|f| !f.key)
                .map(|f| f.id.as_str()),
        }
    }

    /// The form's values as a record, trimmed.
    pub fn record(&self) -> Record {
        self.schema
            .fields
            .iter()
            .zip(&self.values)
            .map(|(spec, value)| (spec.id.clone(), value.trim().to_string()))
            .collect()
    }

    fn enabled_at(&self, index: usize) -> bool {
        if index == self.schema.key_index() {
            matches!(self.mode, Mode::Empty | Mode::New)
        } else {
            matches!(self.mode, Mode::New | Mode::Existing)
        }
    }

    fn take_ticket(&mut self) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        ticket
    }

    /// Back to [`Mode::Empty`] with every value and flag cleared.
    fn clear(&mut self) {
        for value in &mut self.values {
            value.clear();
        }
        for flag in &mut self.invalid {
            *flag = false;
        }
        self.mode = Mode::Empty;
        self.checked_key = None;
    }
}
