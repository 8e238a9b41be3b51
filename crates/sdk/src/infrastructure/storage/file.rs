//! File-backed storage
//!
//! Key-value pairs are kept in a JSON file. By default the file lives in the
//! platform config directory:
//! - Linux: ~/.config/ccpa-consent/storage.json
//! - macOS: ~/Library/Application Support/io.wrldbld.ccpa-consent/storage.json
//! - Windows: C:\Users\<User>\AppData\Roaming\wrldbld\ccpa-consent\config\storage.json

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use directories::ProjectDirs;
use tempfile::NamedTempFile;

use crate::ports::outbound::StorageProvider;

const STORAGE_FILE: &str = "storage.json";

/// Storage provider persisting every write to a JSON file.
///
/// Reads are served from an in-memory cache loaded at construction.
#[derive(Clone)]
pub struct FileStorageProvider {
    storage_path: PathBuf,
    cache: Arc<RwLock<HashMap<String, String>>>,
    write_lock: Arc<Mutex<()>>,
}

impl Default for FileStorageProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStorageProvider {
    /// Storage in the platform config directory.
    pub fn new() -> Self {
        let storage_path = match ProjectDirs::from("io", "wrldbld", "ccpa-consent") {
            Some(dirs) => dirs.config_dir().join(STORAGE_FILE),
            None => PathBuf::from("ccpa_consent_storage.json"),
        };
        Self::at(storage_path)
    }

    /// Storage in an explicit file; loads existing entries if it exists.
    pub fn at(storage_path: impl Into<PathBuf>) -> Self {
        let storage_path = storage_path.into();
        let cache = if storage_path.exists() {
            match fs::read_to_string(&storage_path) {
                Ok(data) => match serde_json::from_str::<HashMap<String, String>>(&data) {
                    Ok(map) => map,
                    Err(e) => {
                        tracing::warn!("Failed to parse storage file: {}", e);
                        HashMap::new()
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read storage file: {}", e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        tracing::debug!("Consent storage initialized at: {:?}", storage_path);

        Self {
            storage_path,
            cache: Arc::new(RwLock::new(cache)),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Write the cache to disk.
    ///
    /// Writers are serialized and each snapshot is taken after acquiring the
    /// writer lock, so the last write always holds the newest entries. The
    /// file is replaced by renaming a fully written sibling temp file.
    fn persist(&self) {
        let _writer = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let dir = match self.storage_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        if let Err(e) = fs::create_dir_all(&dir) {
            tracing::error!("Failed to create storage directory: {}", e);
            return;
        }

        let data = match self.cache.read() {
            Ok(guard) => serde_json::to_string_pretty(&*guard),
            Err(e) => {
                tracing::error!("Failed to acquire read lock for storage: {}", e);
                return;
            }
        };
        let data = match data {
            Ok(data) => data,
            Err(e) => {
                tracing::error!("Failed to serialize storage data: {}", e);
                return;
            }
        };

        let mut file = match NamedTempFile::new_in(&dir) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("Failed to create temporary storage file: {}", e);
                return;
            }
        };
        if let Err(e) = file.write_all(data.as_bytes()).and_then(|_| file.as_file().sync_all()) {
            tracing::error!("Failed to write storage file: {}", e);
            return;
        }
        if let Err(e) = file.persist(&self.storage_path) {
            tracing::error!("Failed to replace storage file: {}", e);
        }
    }
}

impl StorageProvider for FileStorageProvider {
    fn save(&self, key: &str, value: &str) {
        match self.cache.write() {
            Ok(mut guard) => {
                guard.insert(key.to_string(), value.to_string());
            }
            Err(e) => {
                tracing::error!("Failed to acquire write lock for storage: {}", e);
                return;
            }
        }
        self.persist();
    }

    fn load(&self, key: &str) -> Option<String> {
        match self.cache.read() {
            Ok(guard) => guard.get(key).cloned(),
            Err(e) => {
                tracing::error!("Failed to acquire read lock for storage: {}", e);
                None
            }
        }
    }

    fn remove(&self, key: &str) {
        let removed = match self.cache.write() {
            Ok(mut guard) => guard.remove(key).is_some(),
            Err(e) => {
                tracing::error!("Failed to acquire write lock for storage: {}", e);
                return;
            }
        };
        if removed {
            self.persist();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ConsentStore;
    use ccpa_domain::{ConsentUuid, UserConsent};
    use tempfile::tempdir;

    #[test]
    fn test_entries_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(STORAGE_FILE);

        let storage = FileStorageProvider::at(&path);
        storage.save("sp_ccpa_consentUUID", "abc");
        storage.save("other", "x");
        storage.remove("other");

        let reopened = FileStorageProvider::at(&path);
        assert_eq!(reopened.load("sp_ccpa_consentUUID"), Some("abc".to_string()));
        assert_eq!(reopened.load("other"), None);
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorageProvider::at(&path);
        assert_eq!(storage.load("anything"), None);

        storage.save("k", "v");
        assert_eq!(FileStorageProvider::at(&path).load("k"), Some("v".to_string()));
    }

    #[test]
    fn test_concurrent_saves_all_reach_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        let storage = FileStorageProvider::at(&path);

        std::thread::scope(|scope| {
            for worker in 0..8 {
                let storage = storage.clone();
                scope.spawn(move || {
                    for n in 0..10 {
                        storage.save(&format!("key-{worker}-{n}"), &n.to_string());
                    }
                });
            }
        });

        let reopened = FileStorageProvider::at(&path);
        for worker in 0..8 {
            for n in 0..10 {
                assert_eq!(
                    reopened.load(&format!("key-{worker}-{n}")),
                    Some(n.to_string())
                );
            }
        }

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from(STORAGE_FILE)]);
    }

    #[test]
    fn test_consent_store_round_trip_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        let store = ConsentStore::new(Arc::new(FileStorageProvider::at(&path)));

        store.save_consent_uuid(&ConsentUuid::new("abc"));
        store.save_user_consent(&UserConsent::consented_all());

        let reopened = ConsentStore::new(Arc::new(FileStorageProvider::at(&path)));
        assert_eq!(reopened.load_consent_uuid(), Some(ConsentUuid::new("abc")));
        assert_eq!(reopened.load_user_consent(), UserConsent::consented_all());

        reopened.clear_all();
        assert!(ConsentStore::new(Arc::new(FileStorageProvider::at(&path))).is_empty());
    }
}
