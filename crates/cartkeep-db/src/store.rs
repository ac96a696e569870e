//! # Store Adapter Contract
//!
//! The two operations the cart engine needs from durable storage, and the
//! stores that provide them.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         KeyValueStore                                   │
//! │                                                                         │
//! │   get(key) ──► Option<blob>          set(key, blob) ──► ()              │
//! │                                                                         │
//! │        ┌───────────────────┐              ┌───────────────────┐         │
//! │        │     Database      │              │    MemoryStore    │         │
//! │        │  SQLite kv_store  │              │  HashMap in RAM   │         │
//! │        │  (survives exit)  │              │  (tests, guests)  │         │
//! │        └───────────────────┘              └───────────────────┘         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DbResult;
use crate::pool::Database;

/// Asynchronous key-value storage of opaque string blobs.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Reads the blob under `key`, `None` if absent.
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Stores `blob` under `key`, replacing any previous value.
    async fn set(&self, key: &str, blob: &str) -> DbResult<()>;
}

#[async_trait]
impl KeyValueStore for Database {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        self.kv().get(key).await
    }

    async fn set(&self, key: &str, blob: &str) -> DbResult<()> {
        self.kv().set(key, blob).await
    }
}

#[async_trait]
impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, blob: &str) -> DbResult<()> {
        (**self).set(key, blob).await
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// Process-local store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with one entry.
    pub fn with_entry(key: impl Into<String>, blob: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), blob.into());
        MemoryStore {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Returns the number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Checks whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, blob: &str) -> DbResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), blob.to_string());
        Ok(())
    }
}
