use crate::error::StoreError;
use crate::message::Message;
use crate::record::Record;

/// Pairs a store call with its completion. Increases monotonically per form.
pub type Ticket = u64;

/// User actions on the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// A field's value changed.
    Input { field: String, value: String },
    /// The key field lost focus or Enter was pressed in it.
    OnKeyBlur,
    OnSave,
    OnUpdate,
    OnReset,
}

impl Command {
    pub fn input(field: impl Into<String>, value: impl Into<String>) -> Self {
        Command::Input {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Input { .. } => "input",
            Command::OnKeyBlur => "key_blur",
            Command::OnSave => "save",
            Command::OnUpdate => "update",
            Command::OnReset => "reset",
        }
    }
}

/// Everything the state machine reacts to: user commands and store results.
#[derive(Debug, Clone)]
pub enum Event {
    Command(Command),
    LookupCompleted {
        ticket: Ticket,
        result: Result<Option<Record>, StoreError>,
    },
    WriteCompleted {
        ticket: Ticket,
        result: Result<(), StoreError>,
    },
}

impl Event {
    /// Ticket of a completion event; `None` for commands.
    pub fn ticket(&self) -> Option<Ticket> {
        match self {
            Event::Command(_) => None,
            Event::LookupCompleted { ticket, .. } | Event::WriteCompleted { ticket, .. } => {
                Some(*ticket)
            }
        }
    }
}

impl From<Command> for Event {
    fn from(command: Command) -> Self {
        Event::Command(command)
    }
}

/// Side effects requested by a transition. Store effects must be answered
/// with the matching completion event carrying the same ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Lookup {
        ticket: Ticket,
        key: String,
    },
    Create {
        ticket: Ticket,
        key: String,
        record: Record,
    },
    Update {
        ticket: Ticket,
        key: String,
        record: Record,
    },
    Notify(Message),
}

impl Effect {
    pub fn is_store_call(&self) -> bool {
        !matches!(self, Effect::Notify(_))
    }
}
