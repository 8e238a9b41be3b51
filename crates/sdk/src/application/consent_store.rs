//! Typed access to persisted consent state
//!
//! Wraps a plain [`StorageProvider`] and owns the key namespace for the
//! three consent entries: snapshot, identifier and meta blob.

use std::sync::Arc;

use ccpa_domain::{ConsentUuid, UserConsent};
use ccpa_shared::Meta;

use crate::ports::outbound::{storage_keys, StorageProvider};

/// The three storage keys one consent record occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub user_consent: String,
    pub consent_uuid: String,
    pub meta: String,
}

impl StorageKeys {
    /// Keys prefixed with `namespace.` so several records can share a store.
    pub fn namespaced(namespace: &str) -> Self {
        Self {
            user_consent: format!("{}.{}", namespace, storage_keys::USER_CONSENT),
            consent_uuid: format!("{}.{}", namespace, storage_keys::CONSENT_UUID),
            meta: format!("{}.{}", namespace, storage_keys::META),
        }
    }

    fn all(&self) -> [&str; 3] {
        [&self.user_consent, &self.consent_uuid, &self.meta]
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            user_consent: storage_keys::USER_CONSENT.to_string(),
            consent_uuid: storage_keys::CONSENT_UUID.to_string(),
            meta: storage_keys::META.to_string(),
        }
    }
}

/// Persisted consent state.
///
/// Cheap to clone; clones share the underlying storage. Two controllers
/// must not run against the same keys at the same time; give each its own
/// namespace with [`ConsentStore::namespaced`].
#[derive(Clone)]
pub struct ConsentStore {
    storage: Arc<dyn StorageProvider>,
    keys: StorageKeys,
}

impl ConsentStore {
    pub fn new(storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            storage,
            keys: StorageKeys::default(),
        }
    }

    pub fn namespaced(storage: Arc<dyn StorageProvider>, namespace: &str) -> Self {
        Self {
            storage,
            keys: StorageKeys::namespaced(namespace),
        }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Last persisted snapshot, or "all rejected" when none is readable.
    pub fn load_user_consent(&self) -> UserConsent {
        let Some(raw) = self.storage.load(&self.keys.user_consent) else {
            return UserConsent::default();
        };
        match serde_json::from_str(&raw) {
            Ok(consent) => consent,
            Err(e) => {
                tracing::warn!(error = %e, "Stored user consent is unreadable, using default");
                UserConsent::default()
            }
        }
    }

    pub fn save_user_consent(&self, consent: &UserConsent) {
        match serde_json::to_string(consent) {
            Ok(raw) => self.storage.save(&self.keys.user_consent, &raw),
            Err(e) => tracing::error!(error = %e, "Failed to serialize user consent"),
        }
    }

    pub fn load_consent_uuid(&self) -> Option<ConsentUuid> {
        self.storage
            .load(&self.keys.consent_uuid)
            .filter(|uuid| !uuid.is_empty())
            .map(ConsentUuid::from)
    }

    pub fn save_consent_uuid(&self, uuid: &ConsentUuid) {
        self.storage.save(&self.keys.consent_uuid, uuid.as_str());
    }

    pub fn load_meta(&self) -> Option<Meta> {
        self.storage.load(&self.keys.meta).map(Meta::new)
    }

    pub fn save_meta(&self, meta: &Meta) {
        self.storage.save(&self.keys.meta, meta.as_str());
    }

    /// Remove snapshot, identifier and meta. Safe to call when nothing is stored.
    pub fn clear_all(&self) {
        for key in self.keys.all() {
            self.storage.remove(key);
        }
        tracing::debug!("Cleared all consent data");
    }

    /// True when none of the consent keys hold a value.
    pub fn is_empty(&self) -> bool {
        self.keys.all().iter().all(|key| self.storage.load(key).is_none())
    }
}
