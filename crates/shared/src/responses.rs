//! Response payloads returned by the consent service.

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use ccpa_domain::{ConsentUuid, UserConsent};

use crate::meta::Meta;

/// Response of `GET /ccpa/message-url`.
///
/// A present `url` means a choice UI must be shown; an absent one means the
/// service already resolved the user's consent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    #[serde(default, deserialize_with = "deserialize_optional_url")]
    pub url: Option<Url>,
    pub uuid: ConsentUuid,
    pub user_consent: UserConsent,
    pub meta: Meta,
}

impl MessageResponse {
    pub fn requires_ui(&self) -> bool {
        self.url.is_some()
    }
}

/// Response of `POST /ccpa/consent/{actionCode}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub uuid: ConsentUuid,
    pub user_consent: UserConsent,
    pub meta: Meta,
}

/// Treat `null` and `""` as "no message".
fn deserialize_optional_url<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Url::parse(s).map(Some).map_err(serde::de::Error::custom),
    }
}
