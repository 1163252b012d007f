//! RecordEditorController - runs a [`FormState`] against a store and a sink.
//!
//! The controller is the only place where form effects meet I/O. `Notify`
//! effects go to the [`MessageSink`]; store effects are executed and their
//! results fed back into the form as completion events.
//!
//! Two drivers are provided:
//!
//! - [`RecordEditorController::dispatch`] awaits every store call inline, so a
//!   command has fully settled when it returns.
//! - [`EditorHandle`] moves the controller into a tokio task and accepts
//!   commands over a channel while store calls run concurrently.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use record_editor::{BufferSink, Command, LocalStore, Mode, RecordEditorController, Schema};
//!
//! let schema = Arc::new(Schema::employee());
//! let store = Arc::new(LocalStore::new(schema.clone()));
//! let sink = Arc::new(BufferSink::new());
//! let mut editor = RecordEditorController::new(schema, store, sink.clone());
//!
//! editor.dispatch(Command::input("id", "E1")).await;
//! editor.dispatch(Command::OnKeyBlur).await;
//! assert_eq!(editor.state().mode(), Mode::New);
//! ```

mod handle;

use std::collections::VecDeque;
use std::sync::Arc;

use crate::form::{Command, Effect, Event, FormState};
use crate::message::MessageSink;
use crate::record::Schema;
use crate::store::Store;

pub use handle::{EditorHandle, EditorStats};

/// Binds a form to its store and message sink.
pub struct RecordEditorController<S: Store + ?Sized> {
    state: FormState,
    store: Arc<S>,
    sink: Arc<dyn MessageSink>,
}

impl<S: Store + ?Sized> RecordEditorController<S> {
    pub fn new(schema: impl Into<Arc<Schema>>, store: Arc<S>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            state: FormState::new(schema),
            store,
            sink,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Apply a command and run every resulting store call to completion.
    pub async fn dispatch(&mut self, command: Command) {
        tracing::debug!(command = command.name(), mode = %self.state.mode(), "dispatch");

        let mut queue = VecDeque::from([Event::from(command)]);
        while let Some(event) = queue.pop_front() {
            for call in self.step(event) {
                if let Some(completion) = perform(self.store.as_ref(), call).await {
                    queue.push_back(completion);
                }
            }
        }
    }

    /// Apply one event, show its messages and return the store calls it
    /// requested.
    pub(crate) fn step(&mut self, event: Event) -> Vec<Effect> {
        let mut calls = Vec::new();
        for effect in self.state.apply(event) {
            match effect {
                Effect::Notify(message) => self.sink.show(&message),
                call => calls.push(call),
            }
        }
        calls
    }
}

/// Execute a store effect and wrap its result as the matching completion.
pub(crate) async fn perform<S: Store + ?Sized>(store: &S, effect: Effect) -> Option<Event> {
    match effect {
        Effect::Lookup { ticket, key } => {
            tracing::debug!(backend = store.backend(), ticket, %key, "lookup");
            let result = store.lookup(&key).await;
            Some(Event::LookupCompleted { ticket, result })
        }
        Effect::Create {
            ticket,
            key,
            record,
        } => {
            tracing::debug!(backend = store.backend(), ticket, %key, "create");
            let result = store.create(&key, &record).await;
            Some(Event::WriteCompleted { ticket, result })
        }
        Effect::Update {
            ticket,
            key,
            record,
        } => {
            tracing::debug!(backend = store.backend(), ticket, %key, "update");
            let result = store.update(&key, &record).await;
            Some(Event::WriteCompleted { ticket, result })
        }
        Effect::Notify(_) => None,
    }
}
