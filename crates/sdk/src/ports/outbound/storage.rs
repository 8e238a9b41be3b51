//! Persistent storage port
//!
//! A plain string key/value store. Typed access to the consent keys lives
//! in the application layer (`ConsentStore`).

/// Persistent storage abstraction (file-based, in-memory, host-provided)
pub trait StorageProvider: Send + Sync {
    /// Save a string value with the given key
    fn save(&self, key: &str, value: &str);

    /// Load a string value by key, returns None if not found
    fn load(&self, key: &str) -> Option<String>;

    /// Remove a value by key. Removing a missing key is a no-op.
    fn remove(&self, key: &str);
}

/// Storage key constants
///
/// These define the default key namespace shared by every component that
/// reads or writes consent state.
pub mod storage_keys {
    /// Last-known `UserConsent` snapshot (JSON)
    pub const USER_CONSENT: &str = "sp_ccpa_user_consents";
    /// Last-known consent identifier
    pub const CONSENT_UUID: &str = "sp_ccpa_consentUUID";
    /// Last-known opaque meta blob
    pub const META: &str = "sp_ccpa_meta";
}
