mod task_config;
pub use task_config::TaskConfigStore;

use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::StoreError;

/// Process-wide key/value persistence boundary.
///
/// The platform adapter decides where records actually live (preferences
/// file, database, ...); the core only relies on overwrite-by-key semantics
/// and idempotent writes.
pub trait ConfigStore: Send + Sync {
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory reference store.
///
/// Backs tests and hosts that opt out of persistence; a process restart
/// starts from an empty store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigStore for MemoryStore {
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        inner.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        inner.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut inner = self.inner.write().unwrap();
        inner.clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().unwrap();
        Ok(inner.keys().cloned().collect())
    }
}
