//! Consent snapshot value objects
//!
//! `UserConsent` is the aggregate outcome of a user's choices as last
//! reported by the consent service. It is replaced wholesale on every
//! successful fetch or action, never merged.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Aggregate outcome of a user's CCPA choices.
///
/// Serialized in the service's camelCase spelling; the PascalCase spelling
/// is accepted on input so snapshots written by older clients still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsentStatus {
    #[serde(alias = "RejectedNone")]
    RejectedNone,
    #[serde(alias = "RejectedSome")]
    RejectedSome,
    #[serde(alias = "RejectedAll")]
    RejectedAll,
    #[serde(alias = "ConsentedAll")]
    ConsentedAll,
}

impl ConsentStatus {
    pub const ALL: [ConsentStatus; 4] = [
        ConsentStatus::RejectedNone,
        ConsentStatus::RejectedSome,
        ConsentStatus::RejectedAll,
        ConsentStatus::ConsentedAll,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentStatus::RejectedNone => "rejectedNone",
            ConsentStatus::RejectedSome => "rejectedSome",
            ConsentStatus::RejectedAll => "rejectedAll",
            ConsentStatus::ConsentedAll => "consentedAll",
        }
    }

    /// Whether the per-vendor/per-category rejection sets carry meaning.
    pub fn is_partial(&self) -> bool {
        matches!(self, ConsentStatus::RejectedSome)
    }
}

impl fmt::Display for ConsentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last-known consent snapshot for a user.
///
/// The rejection sets are only meaningful when `status` is
/// [`ConsentStatus::RejectedSome`]. An empty set is a valid, known value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserConsent {
    pub status: ConsentStatus,
    #[serde(default)]
    pub rejected_vendors: BTreeSet<String>,
    #[serde(default)]
    pub rejected_categories: BTreeSet<String>,
}

impl UserConsent {
    pub fn new(
        status: ConsentStatus,
        rejected_vendors: impl IntoIterator<Item = String>,
        rejected_categories: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            status,
            rejected_vendors: rejected_vendors.into_iter().collect(),
            rejected_categories: rejected_categories.into_iter().collect(),
        }
    }

    /// Snapshot with the given status and no per-item rejections.
    pub fn with_status(status: ConsentStatus) -> Self {
        Self {
            status,
            rejected_vendors: BTreeSet::new(),
            rejected_categories: BTreeSet::new(),
        }
    }

    /// Snapshot used when nothing (or nothing readable) has been persisted.
    pub fn rejected_all() -> Self {
        Self::with_status(ConsentStatus::RejectedAll)
    }

    pub fn rejected_none() -> Self {
        Self::with_status(ConsentStatus::RejectedNone)
    }

    pub fn consented_all() -> Self {
        Self::with_status(ConsentStatus::ConsentedAll)
    }
}

impl Default for UserConsent {
    fn default() -> Self {
        Self::rejected_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_camel_case_on_the_wire() {
        let json = serde_json::to_string(&ConsentStatus::ConsentedAll).unwrap();
        assert_eq!(json, "\"consentedAll\"");
    }

    #[test]
    fn status_accepts_pascal_case_input() {
        let status: ConsentStatus = serde_json::from_str("\"RejectedSome\"").unwrap();
        assert_eq!(status, ConsentStatus::RejectedSome);
    }

    #[test]
    fn snapshot_decodes_service_payload() {
        let json = r#"{
            "status": "rejectedSome",
            "rejectedVendors": ["v2", "v1"],
            "rejectedCategories": ["c1"]
        }"#;
        let consent: UserConsent = serde_json::from_str(json).unwrap();

        assert_eq!(consent.status, ConsentStatus::RejectedSome);
        assert!(consent.status.is_partial());
        assert_eq!(
            consent.rejected_vendors.iter().collect::<Vec<_>>(),
            vec!["v1", "v2"]
        );
        assert!(consent.rejected_categories.contains("c1"));
    }

    #[test]
    fn missing_sets_default_to_empty() {
        let consent: UserConsent = serde_json::from_str(r#"{"status":"consentedAll"}"#).unwrap();
        assert_eq!(consent, UserConsent::consented_all());
    }

    #[test]
    fn default_snapshot_is_all_rejected() {
        let consent = UserConsent::default();
        assert_eq!(consent.status, ConsentStatus::RejectedAll);
        assert!(consent.rejected_vendors.is_empty());
        assert!(consent.rejected_categories.is_empty());
    }
}
