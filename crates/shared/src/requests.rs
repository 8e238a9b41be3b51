//! Request payloads sent to the consent service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ccpa_domain::{Action, ConsentUuid, PmConsents};

use crate::meta::Meta;

/// Rejection lists in the shape the action endpoint expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CcpaConsents {
    pub rejected_vendors: Vec<String>,
    pub rejected_categories: Vec<String>,
}

impl CcpaConsents {
    /// Derive the rejection payload for an action.
    ///
    /// `AcceptAll` never carries rejections, whatever the UI reported. For
    /// the other actions the privacy manager's rejected ids are used, or
    /// empty lists when no choices were reported.
    pub fn for_action(action: Action, consents: Option<&PmConsents>) -> Self {
        match (action, consents) {
            (Action::AcceptAll, _) | (_, None) => Self::default(),
            (_, Some(consents)) => Self {
                rejected_vendors: consents.vendors.rejected.clone(),
                rejected_categories: consents.categories.rejected.clone(),
            },
        }
    }
}

/// Body of `POST /ccpa/consent/{actionCode}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub property_id: i64,
    pub account_id: i64,
    pub privacy_manager_id: String,
    pub uuid: Option<ConsentUuid>,
    #[serde(rename = "requestUUID")]
    pub request_uuid: Uuid,
    pub consents: CcpaConsents,
    pub meta: Meta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccpa_domain::PmConsentGroup;

    fn choices() -> PmConsents {
        PmConsents::new(
            PmConsentGroup {
                accepted: vec!["v-ok".into()],
                rejected: vec!["v1".into(), "v2".into()],
            },
            PmConsentGroup {
                accepted: vec![],
                rejected: vec!["c1".into()],
            },
        )
    }

    #[test]
    fn accept_all_carries_no_rejections() {
        let consents = CcpaConsents::for_action(Action::AcceptAll, Some(&choices()));
        assert!(consents.rejected_vendors.is_empty());
        assert!(consents.rejected_categories.is_empty());
    }

    #[test]
    fn save_and_exit_uses_reported_rejections() {
        let consents = CcpaConsents::for_action(Action::SaveAndExit, Some(&choices()));
        assert_eq!(consents.rejected_vendors, vec!["v1", "v2"]);
        assert_eq!(consents.rejected_categories, vec!["c1"]);
    }

    #[test]
    fn missing_choices_yield_empty_lists() {
        let consents = CcpaConsents::for_action(Action::RejectAll, None);
        assert_eq!(consents, CcpaConsents::default());
    }

    #[test]
    fn action_request_uses_service_field_names() {
        let request = ActionRequest {
            property_id: 7480,
            account_id: 22,
            privacy_manager_id: "pm-1".into(),
            uuid: Some(ConsentUuid::new("abc")),
            request_uuid: Uuid::nil(),
            consents: CcpaConsents::default(),
            meta: Meta::empty(),
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["propertyId"], 7480);
        assert_eq!(value["accountId"], 22);
        assert_eq!(value["privacyManagerId"], "pm-1");
        assert_eq!(value["uuid"], "abc");
        assert_eq!(value["requestUUID"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(value["consents"]["rejectedVendors"], serde_json::json!([]));
        assert_eq!(value["meta"], "{}");
    }
}
