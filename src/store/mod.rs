//! Store - the persistence capability behind a record editor.
//!
//! A store is an opaque key-value service with three operations. Two
//! backends ship with the crate:
//!
//! - [`LocalStore`]: in-process map keyed by `"<entity>_<key>"`, optionally
//!   persisted to a JSON file.
//! - [`RemoteStore`]: a JSON database reached over HTTP (requires the
//!   `remote` feature).
//!
//! ## Example
//!
//! ```ignore
//! use record_editor::{LocalStore, Record, Schema, Store};
//!
//! let store = LocalStore::new(Schema::employee());
//! store.create("E1", &Record::new().with("id", "E1")).await?;
//! assert!(store.lookup("E1").await?.is_some());
//! ```

mod local;
#[cfg(feature = "remote")]
mod remote;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::Record;

pub use local::LocalStore;
#[cfg(feature = "remote")]
pub use remote::{RemoteSettings, RemoteStore};

/// Abstract lookup/create/update storage for records.
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name used in logs.
    fn backend(&self) -> &'static str;

    /// Fetch the record stored under `key`. Returns `None` if absent.
    async fn lookup(&self, key: &str) -> Result<Option<Record>, StoreError>;

    /// Store a new record. Fails with [`StoreError::Conflict`] if `key` exists.
    async fn create(&self, key: &str, record: &Record) -> Result<(), StoreError>;

    /// Replace an existing record. Fails with [`StoreError::NotFound`] if
    /// `key` is absent.
    async fn update(&self, key: &str, record: &Record) -> Result<(), StoreError>;
}
