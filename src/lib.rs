pub mod config;
pub mod controller;
mod error;
pub mod form;
pub mod message;
pub mod record;
pub mod store;

pub use config::{ConfigError, EditorConfig, SchemaSource, StoreConfig};
pub use controller::{EditorHandle, EditorStats, RecordEditorController};
pub use error::{EditorError, StoreError};
pub use form::{Buttons, Command, Effect, Event, FieldView, FormState, Mode, Ticket, ValidationError};
pub use message::{BufferSink, FanoutSink, Level, Message, MessageBox, MessageSink, TracingSink};
pub use record::{FieldKind, FieldSpec, Record, Schema, SchemaError};
pub use store::{LocalStore, Store};

#[cfg(feature = "remote")]
pub use config::RemoteConfig;
#[cfg(feature = "emitter")]
pub use message::EmitterSink;
#[cfg(feature = "remote")]
pub use store::{RemoteSettings, RemoteStore};

// Re-export the EventEmitter used by EmitterSink
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
