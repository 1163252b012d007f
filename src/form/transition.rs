use crate::error::StoreError;
use crate::message::Message;
use crate::record::Record;

use super::{Command, Effect, Event, FormState, Mode, Pending, Ticket, WriteOp};

const BUSY: &str = "Another operation is still in progress.";
const REQUIRED: &str = "Please fill in all required fields.";
const RESET: &str = "Form has been reset.";

impl FormState {
    /// Apply one event and return the effects it requires.
    pub fn apply(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Command(command) => self.on_command(command),
            Event::LookupCompleted { ticket, result } => self.on_lookup_completed(ticket, result),
            Event::WriteCompleted { ticket, result } => self.on_write_completed(ticket, result),
        }
    }

    fn on_command(&mut self, command: Command) -> Vec<Effect> {
        if self.is_busy() {
            return match command {
                Command::Input { .. } | Command::OnKeyBlur => {
                    tracing::debug!(command = command.name(), "form busy, ignoring");
                    Vec::new()
                }
                _ => {
                    tracing::warn!(command = command.name(), "form busy, rejecting");
                    vec![Effect::Notify(Message::warning(BUSY))]
                }
            };
        }

        match command {
            Command::Input { field, value } => self.on_input(&field, value),
            Command::OnKeyBlur => self.on_key_blur(),
            Command::OnSave => self.on_write(WriteOp::Create),
            Command::OnUpdate => self.on_write(WriteOp::Update),
            Command::OnReset => {
                self.clear();
                vec![Effect::Notify(Message::success(RESET))]
            }
        }
    }

    fn on_input(&mut self, field: &str, value: String) -> Vec<Effect> {
        let Some(index) = self.schema.position(field) else {
            tracing::warn!(field, "input for unknown field");
            return Vec::new();
        };
        if !self.enabled_at(index) {
            tracing::debug!(field, mode = %self.mode, "input on disabled field ignored");
            return Vec::new();
        }

        let blank = value.trim().is_empty();
        if index == self.schema.key_index() && blank {
            self.clear();
            return Vec::new();
        }

        self.values[index] = value;
        if !blank {
            self.invalid[index] = false;
        }
        Vec::new()
    }

    fn on_key_blur(&mut self) -> Vec<Effect> {
        if !matches!(self.mode, Mode::Empty | Mode::New) {
            return Vec::new();
        }

        let key = self.key().trim().to_string();
        if key.is_empty() {
            self.clear();
            return Vec::new();
        }
        let ticket = self.take_ticket();
        let key_index = self.schema.key_index();
        self.invalid[key_index] = false;
        self.pending = Some(Pending::Lookup {
            ticket,
            key: key.clone(),
            prior: self.mode,
        });
        self.mode = Mode::Checking;
        tracing::debug!(ticket, %key, "lookup requested");

        vec![Effect::Lookup { ticket, key }]
    }

    fn on_lookup_completed(
        &mut self,
        ticket: Ticket,
        result: Result<Option<Record>, StoreError>,
    ) -> Vec<Effect> {
        let (key, prior) = match &self.pending {
            Some(Pending::Lookup {
                ticket: pending,
                key,
                prior,
            }) if *pending == ticket => (key.clone(), *prior),
            _ => {
                tracing::warn!(ticket, "discarding stale lookup result");
                return Vec::new();
            }
        };
        self.pending = None;

        let key_label = self.schema.key_field().label.clone();
        let key_index = self.schema.key_index();

        match result {
            Ok(found) => {
                let exists = found.is_some();
                // A repeat miss on the key already being entered keeps the typed values.
                let keep_entered = !exists
                    && prior == Mode::New
                    && self.checked_key.as_deref() == Some(key.as_str());
                if !keep_entered {
                    let record = found.unwrap_or_default();
                    for (index, spec) in self.schema.fields.iter().enumerate() {
                        self.invalid[index] = false;
                        if index == key_index {
                            self.values[index] = key.clone();
                        } else {
                            self.values[index] =
                                record.get(&spec.id).unwrap_or_default().to_string();
                        }
                    }
                }
                self.checked_key = Some(key.clone());

                let text = if exists {
                    self.mode = Mode::Existing;
                    format!("{} {} found. You can update the data.", key_label, key)
                } else {
                    self.mode = Mode::New;
                    format!("{} {} not found. Please enter new data.", key_label, key)
                };
                tracing::debug!(ticket, %key, mode = %self.mode, "lookup completed");
                vec![Effect::Notify(Message::success(text))]
            }
            Err(e) => {
                tracing::error!(ticket, %key, error = %e, "lookup failed");
                self.mode = prior;
                vec![Effect::Notify(Message::danger(format!("Error: {}", e)))]
            }
        }
    }

    fn on_write(&mut self, op: WriteOp) -> Vec<Effect> {
        let (required, label) = match op {
            WriteOp::Create => (Mode::New, "Save"),
            WriteOp::Update => (Mode::Existing, "Update"),
        };
        if self.mode != required {
            tracing::warn!(mode = %self.mode, "{} rejected", label);
            return vec![Effect::Notify(Message::warning(format!(
                "{} is not available right now.",
                label
            )))];
        }

        if let Err(e) = self.validate() {
            tracing::debug!(error = %e, "validation failed");
            return vec![Effect::Notify(Message::danger(REQUIRED))];
        }

        let ticket = self.take_ticket();
        let key = self.key().trim().to_string();
        let record = self.record();
        self.pending = Some(Pending::Write {
            ticket,
            op,
            key: key.clone(),
        });
        tracing::debug!(ticket, %key, ?op, "write requested");

        match op {
            WriteOp::Create => vec![Effect::Create { ticket, key, record }],
            WriteOp::Update => vec![Effect::Update { ticket, key, record }],
        }
    }

    fn on_write_completed(&mut self, ticket: Ticket, result: Result<(), StoreError>) -> Vec<Effect> {
        let (op, key) = match &self.pending {
            Some(Pending::Write {
                ticket: pending,
                op,
                key,
            }) if *pending == ticket => (*op, key.clone()),
            _ => {
                tracing::warn!(ticket, "discarding stale write result");
                return Vec::new();
            }
        };
        self.pending = None;

        let title = self.schema.title();
        let key_label = self.schema.key_field().label.clone();
        let (verb, action) = match op {
            WriteOp::Create => ("saved", "save"),
            WriteOp::Update => ("updated", "update"),
        };

        let message = match result {
            Ok(()) => {
                let name = self.display_name();
                tracing::debug!(ticket, %key, ?op, "write completed");
                self.clear();
                Message::success(format!(
                    "{} {}({}: {}) {} successfully!",
                    title,
                    name.map(|n| format!("{} ", n)).unwrap_or_default(),
                    key_label,
                    key,
                    verb
                ))
            }
            Err(StoreError::Conflict { .. }) => Message::danger(format!(
                "{} with {} {} already exists. Use Update to change it.",
                title, key_label, key
            )),
            Err(StoreError::NotFound { .. }) => Message::danger(format!(
                "{} with {} {} does not exist. Use Save to add it.",
                title, key_label, key
            )),
            Err(e) => {
                tracing::error!(ticket, %key, ?op, error = %e, "write failed");
                Message::danger(format!(
                    "Failed to {} {} data. Error: {}",
                    action, self.schema.entity, e
                ))
            }
        };
        vec![Effect::Notify(message)]
    }

    /// Value of the first non-key field, used to name the record in messages.
    fn display_name(&self) -> Option<String> {
        let key_index = self.schema.key_index();
        self.values
            .iter()
            .enumerate()
            .find(|(index, _)| *index != key_index)
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}
