//! User-facing messages and the sinks that display them.
//!
//! The controller never renders anything itself; every notice it produces
//! (lookup results, validation failures, store errors) is handed to a
//! [`MessageSink`].

mod message_box;

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

pub use message_box::MessageBox;

/// Severity of a message, mirroring the alert styles of a form UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Danger,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Danger => "danger",
        }
    }
}

/// A message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

impl Message {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            text: text.into(),
        }
    }

    pub fn danger(text: impl Into<String>) -> Self {
        Self {
            level: Level::Danger,
            text: text.into(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.as_str(), self.text)
    }
}

/// Destination for user-facing messages.
pub trait MessageSink: Send + Sync {
    fn show(&self, message: &Message);
}

/// Writes messages to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl MessageSink for TracingSink {
    fn show(&self, message: &Message) {
        match message.level {
            Level::Success => tracing::info!(target: "record_editor::message", "{}", message.text),
            Level::Warning => tracing::warn!(target: "record_editor::message", "{}", message.text),
            Level::Danger => tracing::error!(target: "record_editor::message", "{}", message.text),
        }
    }
}

/// Collects messages into a shared buffer.
#[derive(Debug, Default, Clone)]
pub struct BufferSink {
    buffer: Arc<Mutex<Vec<Message>>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything shown so far.
    pub fn messages(&self) -> Vec<Message> {
        match self.buffer.lock() {
            Ok(buffer) => buffer.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<Message> {
        self.messages().pop()
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

impl MessageSink for BufferSink {
    fn show(&self, message: &Message) {
        match self.buffer.lock() {
            Ok(mut buffer) => buffer.push(message.clone()),
            Err(_) => tracing::warn!("message buffer poisoned, dropping: {}", message),
        }
    }
}

/// Re-emits every message through an [`EventEmitter`](event_emitter_rs::EventEmitter),
/// using the level name (`"success"`, `"warning"`, `"danger"`) as the event
/// and the message text as the payload.
#[cfg(feature = "emitter")]
pub struct EmitterSink {
    emitter: Mutex<event_emitter_rs::EventEmitter>,
}

#[cfg(feature = "emitter")]
impl EmitterSink {
    pub fn new(emitter: event_emitter_rs::EventEmitter) -> Self {
        Self {
            emitter: Mutex::new(emitter),
        }
    }

    /// Register a listener for one message level.
    pub fn on<F>(&self, level: Level, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        if let Ok(mut emitter) = self.emitter.lock() {
            emitter.on(level.as_str(), listener);
        }
    }
}

#[cfg(feature = "emitter")]
impl MessageSink for EmitterSink {
    fn show(&self, message: &Message) {
        match self.emitter.lock() {
            Ok(mut emitter) => {
                let _ = emitter.emit(message.level.as_str(), message.text.clone());
            }
            Err(_) => tracing::warn!("message emitter poisoned, dropping: {}", message),
        }
    }
}

/// Fans one message out to several sinks.
#[derive(Default, Clone)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn MessageSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn MessageSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl MessageSink for FanoutSink {
    fn show(&self, message: &Message) {
        for sink in &self.sinks {
            sink.show(message);
        }
    }
}
