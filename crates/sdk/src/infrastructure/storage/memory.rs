//! Process-local storage

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::ports::outbound::StorageProvider;

/// Key-value storage kept in memory for the lifetime of the process.
///
/// Clones share the same map.
#[derive(Clone, Default)]
pub struct InMemoryStorageProvider {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl InMemoryStorageProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every stored entry.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        match self.entries.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl StorageProvider for InMemoryStorageProvider {
    fn save(&self, key: &str, value: &str) {
        match self.entries.write() {
            Ok(mut guard) => {
                guard.insert(key.to_string(), value.to_string());
            }
            Err(e) => tracing::error!("Failed to acquire write lock for storage: {}", e),
        }
    }

    fn load(&self, key: &str) -> Option<String> {
        match self.entries.read() {
            Ok(guard) => guard.get(key).cloned(),
            Err(e) => {
                tracing::error!("Failed to acquire read lock for storage: {}", e);
                None
            }
        }
    }

    fn remove(&self, key: &str) {
        match self.entries.write() {
            Ok(mut guard) => {
                guard.remove(key);
            }
            Err(e) => tracing::error!("Failed to acquire write lock for storage: {}", e),
        }
    }
}
