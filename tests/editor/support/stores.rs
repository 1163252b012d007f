//! Store wrappers that count, fail or hold calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use record_editor::{Record, Store, StoreError};
use tokio::sync::Semaphore;

/// Counts calls before forwarding them to the inner store.
pub struct CountingStore<S> {
    inner: S,
    pub lookups: AtomicUsize,
    pub creates: AtomicUsize,
    pub updates: AtomicUsize,
}

impl<S: Store> CountingStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            lookups: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn writes(&self) -> usize {
        self.creates.load(Ordering::SeqCst) + self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: Store> Store for CountingStore<S> {
    fn backend(&self) -> &'static str {
        self.inner.backend()
    }

    async fn lookup(&self, key: &str) -> Result<Option<Record>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(key).await
    }

    async fn create(&self, key: &str, record: &Record) -> Result<(), StoreError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(key, record).await
    }

    async fn update(&self, key: &str, record: &Record) -> Result<(), StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update(key, record).await
    }
}

/// Answers lookups with "absent" and fails every write with a transport error.
pub struct FailingStore {
    pub error: StoreError,
}

impl FailingStore {
    pub fn network_down() -> Self {
        Self {
            error: StoreError::Transport("network unreachable".into()),
        }
    }
}

#[async_trait]
impl Store for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn lookup(&self, _key: &str) -> Result<Option<Record>, StoreError> {
        Ok(None)
    }

    async fn create(&self, _key: &str, _record: &Record) -> Result<(), StoreError> {
        Err(self.error.clone())
    }

    async fn update(&self, _key: &str, _record: &Record) -> Result<(), StoreError> {
        Err(self.error.clone())
    }
}

/// Holds every call until a permit is released with [`GatedStore::release`].
pub struct GatedStore<S> {
    inner: S,
    gate: Arc<Semaphore>,
}

impl<S: Store> GatedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    /// Let `calls` held or future calls proceed.
    pub fn release(&self, calls: usize) {
        self.gate.add_permits(calls);
    }

    async fn pass(&self) -> Result<(), StoreError> {
        self.gate
            .acquire()
            .await
            .map(|permit| permit.forget())
            .map_err(|_| StoreError::Transport("gate closed".into()))
    }
}

#[async_trait]
impl<S: Store> Store for GatedStore<S> {
    fn backend(&self) -> &'static str {
        "gated"
    }

    async fn lookup(&self, key: &str) -> Result<Option<Record>, StoreError> {
        self.pass().await?;
        self.inner.lookup(key).await
    }

    async fn create(&self, key: &str, record: &Record) -> Result<(), StoreError> {
        self.pass().await?;
        self.inner.create(key, record).await
    }

    async fn update(&self, key: &str, record: &Record) -> Result<(), StoreError> {
        self.pass().await?;
        self.inner.update(key, record).await
    }
}

/// Panics inside every call, as a buggy backend would.
pub struct PanickingStore;

#[async_trait]
impl Store for PanickingStore {
    fn backend(&self) -> &'static str {
        "panicking"
    }

    async fn lookup(&self, key: &str) -> Result<Option<Record>, StoreError> {
        panic!("lookup of {} exploded", key)
    }

    async fn create(&self, key: &str, _record: &Record) -> Result<(), StoreError> {
        panic!("create of {} exploded", key)
    }

    async fn update(&self, key: &str, _record: &Record) -> Result<(), StoreError> {
        panic!("update of {} exploded", key)
    }
}
