//! Consent service client
//!
//! Builds the message and action endpoints, sends them through an injected
//! [`HttpTransport`], and classifies every failure as a [`ConsentError`].
//! The server's meta blob is persisted after each successful response and
//! replayed on the next request.

use std::sync::Arc;

use async_trait::async_trait;
use url::Url;
use uuid::Uuid;

use ccpa_domain::{Action, CampaignEnv, ConsentUuid, PmConsents, PropertyName, TargetingParams};
use ccpa_shared::{
    decode, encode, encode_targeting_params, ActionRequest, ActionResponse, CcpaConsents, Meta,
    MessageResponse,
};

use crate::application::ConsentStore;
use crate::config::SdkConfig;
use crate::ports::outbound::{
    ConnectivityProvider, ConsentApiPort, ConsentError, HttpTransport, TransportError,
};

const MESSAGE_PATH: &str = "ccpa/message-url";
const CONSENT_PATH: &str = "ccpa/consent";

/// Origin the hosted privacy manager posts its results to.
pub const PM_ORIGIN: &str = "https://ccpa-service.sp-prod.net";

pub struct ConsentClient {
    transport: Arc<dyn HttpTransport>,
    connectivity: Arc<dyn ConnectivityProvider>,
    store: ConsentStore,
    /// Generated once per client and sent with every request
    request_uuid: Uuid,
    account_id: i64,
    property_id: i64,
    property_name: PropertyName,
    pm_id: String,
    campaign_env: CampaignEnv,
    targeting_params: TargetingParams,
    wrapper_api_url: Url,
    pm_base_url: Url,
}

impl ConsentClient {
    pub fn new(
        config: &SdkConfig,
        transport: Arc<dyn HttpTransport>,
        connectivity: Arc<dyn ConnectivityProvider>,
        store: ConsentStore,
    ) -> Self {
        Self {
            transport,
            connectivity,
            store,
            request_uuid: Uuid::new_v4(),
            account_id: config.account_id,
            property_id: config.property_id,
            property_name: config.property_name.clone(),
            pm_id: config.pm_id.clone(),
            campaign_env: config.campaign_env,
            targeting_params: config.targeting_params.clone(),
            wrapper_api_url: config.wrapper_api_url.clone(),
            pm_base_url: config.pm_base_url.clone(),
        }
    }

    pub fn request_uuid(&self) -> Uuid {
        self.request_uuid
    }

    /// `GET` URL resolving which message to show.
    pub fn message_url(
        &self,
        consent_uuid: Option<&ConsentUuid>,
        auth_id: Option<&str>,
    ) -> Result<Url, ConsentError> {
        let mut url = self.endpoint(MESSAGE_PATH)?;
        let meta = self.store.load_meta();
        {
            let mut query = url.query_pairs_mut();
            if let Some(uuid) = consent_uuid {
                query.append_pair("uuid", uuid.as_str());
            }
            if let Some(auth_id) = auth_id {
                query.append_pair("authId", auth_id);
            }
            query
                .append_pair("propertyId", &self.property_id.to_string())
                .append_pair("accountId", &self.account_id.to_string())
                .append_pair("requestUUID", &self.request_uuid.to_string())
                .append_pair("propertyHref", &self.property_name.href())
                .append_pair("campaignEnv", self.campaign_env.as_str())
                .append_pair(
                    "targetingParams",
                    &encode_targeting_params(&self.targeting_params),
                )
                .append_pair("alwaysDisplayDNS", "false");
            if let Some(meta) = &meta {
                query.append_pair("meta", meta.as_str());
            }
        }
        Ok(url)
    }

    /// `POST` URL recording `action`.
    pub fn action_url(&self, action: Action) -> Result<Url, ConsentError> {
        self.endpoint(&format!("{}/{}", CONSENT_PATH, action.code()))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ConsentError> {
        let mut base = self.wrapper_api_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path).map_err(|e| {
            tracing::error!(error = %e, base = %self.wrapper_api_url, path, "Invalid endpoint url");
            ConsentError::InvalidUrl {
                target: path.to_string(),
            }
        })
    }

    fn ensure_connected(&self) -> Result<(), ConsentError> {
        if self.connectivity.is_connected_to_network() {
            Ok(())
        } else {
            Err(ConsentError::NoInternetConnection)
        }
    }

    fn non_empty(url: &Url, body: Vec<u8>) -> Result<Vec<u8>, ConsentError> {
        if body.is_empty() {
            Err(ConsentError::request(url, Some(TransportError::EmptyBody)))
        } else {
            Ok(body)
        }
    }
}

#[async_trait]
impl ConsentApiPort for ConsentClient {
    async fn fetch_message(
        &self,
        consent_uuid: Option<ConsentUuid>,
        auth_id: Option<String>,
    ) -> Result<MessageResponse, ConsentError> {
        self.ensure_connected()?;
        let url = self.message_url(consent_uuid.as_ref(), auth_id.as_deref())?;
        tracing::debug!(url = %url, "Fetching consent message");

        let body = self
            .transport
            .get(&url)
            .await
            .map_err(|e| ConsentError::request(&url, Some(e)))?;
        let body = Self::non_empty(&url, body)?;

        let response: MessageResponse =
            decode(&body).map_err(|e| ConsentError::parsing(&url, e))?;
        self.store.save_meta(&response.meta);

        tracing::debug!(
            uuid = %response.uuid,
            requires_ui = response.requires_ui(),
            "Consent message resolved"
        );
        Ok(response)
    }

    async fn submit_action(
        &self,
        action: Action,
        consent_uuid: Option<ConsentUuid>,
        consents: Option<PmConsents>,
    ) -> Result<ActionResponse, ConsentError> {
        self.ensure_connected()?;
        let url = self.action_url(action)?;

        let request = ActionRequest {
            property_id: self.property_id,
            account_id: self.account_id,
            privacy_manager_id: self.pm_id.clone(),
            uuid: consent_uuid,
            request_uuid: self.request_uuid,
            consents: CcpaConsents::for_action(action, consents.as_ref()),
            meta: self.store.load_meta().unwrap_or_else(Meta::empty),
        };
        let body = encode(&request).map_err(|e| ConsentError::encoding(&url, e))?;
        tracing::debug!(url = %url, action = %action, "Submitting consent action");

        let body = self
            .transport
            .post(&url, body)
            .await
            .map_err(|e| ConsentError::request(&url, Some(e)))?;
        let body = Self::non_empty(&url, body)?;

        let response: ActionResponse =
            decode(&body).map_err(|e| ConsentError::parsing(&url, e))?;
        self.store.save_meta(&response.meta);

        tracing::debug!(uuid = %response.uuid, status = %response.user_consent.status, "Consent action recorded");
        Ok(response)
    }

    fn privacy_manager_url(&self, consent_uuid: Option<ConsentUuid>) -> Url {
        let mut url = self.pm_base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .clear()
                .append_pair("privacy_manager_id", &self.pm_id)
                .append_pair("site_id", &self.property_id.to_string())
                .append_pair("ccpa_origin", PM_ORIGIN);
            if let Some(uuid) = &consent_uuid {
                query.append_pair("ccpaUUID", uuid.as_str());
            }
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::connectivity::AlwaysReachable;
    use crate::infrastructure::storage::InMemoryStorageProvider;
    use crate::infrastructure::testing::{Method, Offline, ScriptedTransport};
    use ccpa_domain::{ConsentStatus, PmConsentGroup};
    use serde_json::json;

    fn config() -> SdkConfig {
        SdkConfig::new(
            22,
            7480,
            PropertyName::new("twosdks.demo").unwrap(),
            "5c0e81b7d74b3c30c6852301",
            CampaignEnv::Stage,
        )
        .unwrap()
        .with_targeting_params(TargetingParams::new().with("SDK_TYPE", "CCPA"))
    }

    fn client_with(
        config: &SdkConfig,
        transport: ScriptedTransport,
    ) -> (ConsentClient, Arc<ScriptedTransport>, ConsentStore) {
        let transport = Arc::new(transport);
        let store = ConsentStore::new(Arc::new(InMemoryStorageProvider::new()));
        let client = ConsentClient::new(
            config,
            transport.clone(),
            Arc::new(AlwaysReachable),
            store.clone(),
        );
        (client, transport, store)
    }

    fn message_body(url: Option<&str>, meta: serde_json::Value) -> serde_json::Value {
        json!({
            "url": url,
            "uuid": "abc",
            "userConsent": {
                "status": "consentedAll",
                "rejectedVendors": [],
                "rejectedCategories": []
            },
            "meta": meta
        })
    }

    fn action_body() -> serde_json::Value {
        json!({
            "uuid": "abc",
            "userConsent": {
                "status": "rejectedSome",
                "rejectedVendors": ["v1"],
                "rejectedCategories": []
            },
            "meta": "{\"step\":2}"
        })
    }

    #[tokio::test]
    async fn test_fetch_message_sends_every_query_param() {
        let (client, transport, _) = client_with(
            &config(),
            ScriptedTransport::new().respond_json(message_body(None, json!("{}"))),
        );

        client
            .fetch_message(Some(ConsentUuid::new("abc")), Some("user@host".into()))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.url.path(), "/ccpa/message-url");
        assert_eq!(request.query("uuid").as_deref(), Some("abc"));
        assert_eq!(request.query("authId").as_deref(), Some("user@host"));
        assert_eq!(request.query("propertyId").as_deref(), Some("7480"));
        assert_eq!(request.query("accountId").as_deref(), Some("22"));
        assert_eq!(
            request.query("requestUUID"),
            Some(client.request_uuid().to_string())
        );
        assert_eq!(
            request.query("propertyHref").as_deref(),
            Some("https://twosdks.demo")
        );
        assert_eq!(request.query("campaignEnv").as_deref(), Some("stage"));
        assert_eq!(
            request.query("targetingParams").as_deref(),
            Some("{\"SDK_TYPE\":\"CCPA\"}")
        );
        assert_eq!(request.query("alwaysDisplayDNS").as_deref(), Some("false"));
        assert_eq!(request.query("meta"), None);
    }

    #[tokio::test]
    async fn test_first_fetch_omits_identity_params() {
        let (client, transport, _) = client_with(
            &config(),
            ScriptedTransport::new().respond_json(message_body(None, json!("{}"))),
        );

        client.fetch_message(None, None).await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.query("uuid"), None);
        assert_eq!(request.query("authId"), None);
    }

    #[tokio::test]
    async fn test_request_uuid_is_reused_across_requests() {
        let (client, transport, _) = client_with(
            &config(),
            ScriptedTransport::new()
                .respond_json(message_body(Some("https://notice.example/m"), json!("{}")))
                .respond_json(action_body()),
        );

        client.fetch_message(None, None).await.unwrap();
        client
            .submit_action(Action::RejectAll, Some(ConsentUuid::new("abc")), None)
            .await
            .unwrap();

        let requests = transport.requests();
        let from_get = requests[0].query("requestUUID");
        let from_post = requests[1].json_body().unwrap()["requestUUID"]
            .as_str()
            .map(str::to_string);
        assert_eq!(from_get, from_post);
    }

    #[tokio::test]
    async fn test_meta_is_persisted_and_replayed() {
        let (client, transport, store) = client_with(
            &config(),
            ScriptedTransport::new()
                .respond_json(message_body(None, json!({"session": 1})))
                .respond_json(action_body())
                .respond_json(message_body(None, json!("{}"))),
        );

        client.fetch_message(None, None).await.unwrap();
        assert_eq!(store.load_meta(), Some(Meta::new("{\"session\":1}")));

        client
            .submit_action(Action::AcceptAll, Some(ConsentUuid::new("abc")), None)
            .await
            .unwrap();
        client.fetch_message(None, None).await.unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[1].json_body().unwrap()["meta"],
            json!("{\"session\":1}")
        );
        assert_eq!(requests[2].query("meta").as_deref(), Some("{\"step\":2}"));
    }

    #[tokio::test]
    async fn test_submit_action_posts_payload_to_code_path() {
        let (client, transport, store) = client_with(
            &config(),
            ScriptedTransport::new().respond_json(action_body()),
        );
        let consents = PmConsents::new(
            PmConsentGroup {
                accepted: vec![],
                rejected: vec!["v1".into()],
            },
            PmConsentGroup {
                accepted: vec!["c2".into()],
                rejected: vec!["c1".into()],
            },
        );

        let response = client
            .submit_action(Action::SaveAndExit, Some(ConsentUuid::new("abc")), Some(consents))
            .await
            .unwrap();

        assert_eq!(response.uuid, ConsentUuid::new("abc"));
        assert_eq!(response.user_consent.status, ConsentStatus::RejectedSome);
        assert_eq!(store.load_meta(), Some(Meta::new("{\"step\":2}")));

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url.path(), "/ccpa/consent/1");
        let body = request.json_body().unwrap();
        assert_eq!(body["propertyId"], 7480);
        assert_eq!(body["accountId"], 22);
        assert_eq!(body["privacyManagerId"], "5c0e81b7d74b3c30c6852301");
        assert_eq!(body["uuid"], "abc");
        assert_eq!(body["consents"]["rejectedVendors"], json!(["v1"]));
        assert_eq!(body["consents"]["rejectedCategories"], json!(["c1"]));
        assert_eq!(body["meta"], "{}");
    }

    #[tokio::test]
    async fn test_offline_fails_without_network_call() {
        let transport = Arc::new(ScriptedTransport::new());
        let client = ConsentClient::new(
            &config(),
            transport.clone(),
            Arc::new(Offline),
            ConsentStore::new(Arc::new(InMemoryStorageProvider::new())),
        );

        let err = client.fetch_message(None, None).await.unwrap_err();
        assert!(matches!(err, ConsentError::NoInternetConnection));

        let err = client
            .submit_action(Action::AcceptAll, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ConsentError::NoInternetConnection));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_carries_url() {
        let (client, _, store) = client_with(
            &config(),
            ScriptedTransport::new().respond(Err(TransportError::Status {
                status: 500,
                body: "boom".into(),
            })),
        );

        let err = client.fetch_message(None, None).await.unwrap_err();

        match &err {
            ConsentError::Request { url, source } => {
                assert!(url.starts_with("https://wrapper-api.sp-prod.net/ccpa/message-url?"));
                assert!(matches!(
                    source,
                    Some(TransportError::Status { status: 500, .. })
                ));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.load_meta(), None);
    }

    #[tokio::test]
    async fn test_empty_body_is_request_failure() {
        let (client, _, _) = client_with(&config(), ScriptedTransport::new().respond(Ok(vec![])));

        let err = client
            .submit_action(Action::RejectAll, None, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConsentError::Request {
                source: Some(TransportError::EmptyBody),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_parsing_failure() {
        let (client, _, store) = client_with(
            &config(),
            ScriptedTransport::new().respond_json(json!({"url": null, "uuid": "abc"})),
        );

        let err = client.fetch_message(None, None).await.unwrap_err();

        assert!(matches!(err, ConsentError::Parsing { .. }));
        assert!(err
            .target()
            .is_some_and(|target| target.contains("/ccpa/message-url")));
        assert_eq!(store.load_meta(), None);
    }

    #[tokio::test]
    async fn test_unusable_base_url_is_invalid_url() {
        let config = config().with_wrapper_api_url(Url::parse("mailto:ops@example.com").unwrap());
        let (client, transport, _) = client_with(&config, ScriptedTransport::new());

        let err = client.fetch_message(None, None).await.unwrap_err();

        assert!(matches!(err, ConsentError::InvalidUrl { .. }));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_endpoints_keep_base_path() {
        let config =
            config().with_wrapper_api_url(Url::parse("http://localhost:9000/proxy").unwrap());
        let (client, _, _) = client_with(&config, ScriptedTransport::new());

        let url = client.action_url(Action::RejectAll).unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/proxy/ccpa/consent/13");
    }

    #[test]
    fn test_privacy_manager_url() {
        let (client, _, _) = client_with(&config(), ScriptedTransport::new());

        let url = client.privacy_manager_url(Some(ConsentUuid::new("abc")));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.host_str(), Some("ccpa-inapp-pm.sp-prod.net"));
        assert_eq!(
            pairs,
            vec![
                ("privacy_manager_id".into(), "5c0e81b7d74b3c30c6852301".into()),
                ("site_id".into(), "7480".into()),
                ("ccpa_origin".into(), PM_ORIGIN.into()),
                ("ccpaUUID".into(), "abc".into()),
            ]
        );

        let anonymous = client.privacy_manager_url(None);
        assert!(anonymous.query_pairs().all(|(k, _)| k != "ccpaUUID"));
    }
}
