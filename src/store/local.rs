//! LocalStore - HashMap-backed store, optionally persisted to a JSON file.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::Store;
use crate::error::StoreError;
use crate::record::{Record, Schema};

/// In-process key-value store.
///
/// Storage key is `"<entity>_<key>"`, value is the record encoded as a JSON
/// string. Clone-friendly via Arc; clones share the same map.
#[derive(Clone)]
pub struct LocalStore {
    schema: Arc<Schema>,
    storage: Arc<RwLock<HashMap<String, String>>>,
    path: Option<PathBuf>,
    writer: Arc<Mutex<()>>,
}

impl LocalStore {
    /// Create an empty, memory-only store.
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            schema: schema.into(),
            storage: Arc::new(RwLock::new(HashMap::new())),
            path: None,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Open a store persisted at `path`. A missing file starts empty; the
    /// file is rewritten after every successful write.
    pub fn open(schema: impl Into<Arc<Schema>>, path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => HashMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StoreError::Storage(format!("{}: {}", path.display(), e))),
        };
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened local store");

        Ok(Self {
            schema: schema.into(),
            storage: Arc::new(RwLock::new(entries)),
            path: Some(path),
            writer: Arc::new(Mutex::new(())),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The raw JSON string stored under a record key, as the browser's
    /// storage would return it.
    pub fn raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
        Ok(storage.get(&self.schema.storage_key(key)).cloned())
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.storage.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    async fn write(&self, key: &str, record: &Record, must_exist: bool) -> Result<(), StoreError> {
        let storage_key = self.schema.storage_key(key);
        let encoded = self.schema.encode_str(record);

        // Writers queue here so a rollback never undoes a later write.
        let _writer = self.writer.lock().await;

        let (previous, contents) = {
            let mut storage = self
                .storage
                .write()
                .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

            match (storage.contains_key(&storage_key), must_exist) {
                (true, false) => return Err(StoreError::Conflict { key: key.to_string() }),
                (false, true) => return Err(StoreError::NotFound { key: key.to_string() }),
                _ => {}
            }

            let previous = storage.insert(storage_key.clone(), encoded);
            let contents = match self.path {
                Some(_) => serde_json::to_string_pretty(&*storage).map(Some),
                None => Ok(None),
            };
            (previous, contents)
        };

        let persisted = match contents {
            Ok(Some(contents)) => self.persist(contents).await,
            Ok(None) => Ok(()),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = persisted {
            // Keep memory and file in agreement.
            let mut storage = self
                .storage
                .write()
                .map_err(|_| StoreError::Storage("lock poisoned".into()))?;
            match previous {
                Some(previous) => storage.insert(storage_key, previous),
                None => storage.remove(&storage_key),
            };
            return Err(e);
        }
        Ok(())
    }

    /// Write the file off the async worker threads.
    async fn persist(&self, contents: String) -> Result<(), StoreError> {
        let Some(path) = self.path.clone() else {
            return Ok(());
        };

        tokio::task::spawn_blocking(move || {
            let tmp = path.with_extension("tmp");
            fs::write(&tmp, contents)
                .and_then(|_| fs::rename(&tmp, &path))
                .map_err(|e| StoreError::Storage(format!("{}: {}", path.display(), e)))
        })
        .await
        .map_err(|e| StoreError::Storage(format!("persist task failed: {}", e)))?
    }
}

#[async_trait]
impl Store for LocalStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    async fn lookup(&self, key: &str) -> Result<Option<Record>, StoreError> {
        match self.raw(key)? {
            Some(json) => Ok(Some(self.schema.decode_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, key: &str, record: &Record) -> Result<(), StoreError> {
        self.write(key, record, false).await
    }

    async fn update(&self, key: &str, record: &Record) -> Result<(), StoreError> {
        self.write(key, record, true).await
    }
}
