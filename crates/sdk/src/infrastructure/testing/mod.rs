//! Recording test doubles for the outbound ports.
//!
//! Hand-written rather than mocked where tests need to script a sequence
//! of responses or inspect what was sent.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use url::Url;

use ccpa_domain::{Action, ConsentUuid, UserConsent};

use crate::ports::outbound::{
    ConnectivityProvider, ConsentError, ConsentErrorDelegate, ConsentPresenter,
    ConsentReadyDelegate, ConsentUiDelegate, HttpTransport, PresentationRequest, TransportError,
};

/// HTTP method of a recorded request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Vec<u8>>,
}

impl RecordedRequest {
    pub fn query(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_slice(body).ok())
    }
}

/// Transport replaying scripted responses in order and recording requests.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<Vec<u8>, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(self, body: serde_json::Value) -> Self {
        self.respond(Ok(body.to_string().into_bytes()))
    }

    pub fn respond(self, response: Result<Vec<u8>, TransportError>) -> Self {
        lock(&self.responses).push_back(response);
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.requests).clone()
    }

    fn next(&self, request: RecordedRequest) -> Result<Vec<u8>, TransportError> {
        lock(&self.requests).push(request);
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::request("no scripted response")))
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        self.next(RecordedRequest {
            method: Method::Get,
            url: url.clone(),
            body: None,
        })
    }

    async fn post(&self, url: &Url, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        self.next(RecordedRequest {
            method: Method::Post,
            url: url.clone(),
            body: Some(body),
        })
    }
}

/// Connectivity oracle that is never reachable
pub struct Offline;

impl ConnectivityProvider for Offline {
    fn is_connected_to_network(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCall {
    Message(PresentationRequest),
    PrivacyManager(PresentationRequest),
    Release,
}

#[derive(Default)]
pub struct RecordingPresenter {
    calls: Mutex<Vec<PresenterCall>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PresenterCall> {
        lock(&self.calls).clone()
    }

    pub fn release_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| matches!(call, PresenterCall::Release))
            .count()
    }
}

impl ConsentPresenter for RecordingPresenter {
    fn load_message(&self, request: PresentationRequest) {
        lock(&self.calls).push(PresenterCall::Message(request));
    }

    fn load_privacy_manager(&self, request: PresentationRequest) {
        lock(&self.calls).push(PresenterCall::PrivacyManager(request));
    }

    fn release(&self) {
        lock(&self.calls).push(PresenterCall::Release);
    }
}

/// Notification received by a [`RecordingDelegate`]
#[derive(Debug, Clone)]
pub enum DelegateEvent {
    ConsentUiWillShow,
    ConsentUiDidDisappear,
    MessageWillShow,
    MessageDidDisappear,
    PmWillShow,
    PmDidDisappear,
    Action(Action),
    ConsentReady(ConsentUuid, UserConsent),
    Error(ConsentError),
}

/// Implements every delegate channel and records what it was told.
#[derive(Default)]
pub struct RecordingDelegate {
    events: Mutex<Vec<DelegateEvent>>,
}

impl RecordingDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DelegateEvent> {
        lock(&self.events).clone()
    }

    pub fn ready_calls(&self) -> Vec<(ConsentUuid, UserConsent)> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                DelegateEvent::ConsentReady(uuid, consent) => Some((uuid.clone(), consent.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<ConsentError> {
        lock(&self.events)
            .iter()
            .filter_map(|event| match event {
                DelegateEvent::Error(error) => Some(error.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: DelegateEvent) {
        lock(&self.events).push(event);
    }
}

impl ConsentUiDelegate for RecordingDelegate {
    fn consent_ui_will_show(&self) {
        self.push(DelegateEvent::ConsentUiWillShow);
    }

    fn consent_ui_did_disappear(&self) {
        self.push(DelegateEvent::ConsentUiDidDisappear);
    }

    fn message_will_show(&self) {
        self.push(DelegateEvent::MessageWillShow);
    }

    fn message_did_disappear(&self) {
        self.push(DelegateEvent::MessageDidDisappear);
    }

    fn pm_will_show(&self) {
        self.push(DelegateEvent::PmWillShow);
    }

    fn pm_did_disappear(&self) {
        self.push(DelegateEvent::PmDidDisappear);
    }

    fn on_action(&self, action: Action) {
        self.push(DelegateEvent::Action(action));
    }
}

impl ConsentReadyDelegate for RecordingDelegate {
    fn on_consent_ready(&self, consent_uuid: &ConsentUuid, user_consent: &UserConsent) {
        self.push(DelegateEvent::ConsentReady(
            consent_uuid.clone(),
            user_consent.clone(),
        ));
    }
}

impl ConsentErrorDelegate for RecordingDelegate {
    fn on_error(&self, error: &ConsentError) {
        self.push(DelegateEvent::Error(error.clone()));
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}
